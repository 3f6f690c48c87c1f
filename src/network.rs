pub mod bootstrap;
pub mod correlation;
pub mod distance;
pub mod features;
pub mod filter;
pub mod mst;
pub mod output;
pub mod pipeline;
pub mod stats;
pub mod union_find;
