//! Tolerance filtering of consensus graphs

use crate::network::bootstrap::{aggregate, BootstrapConfig};
use crate::structs::{BootstrapOutcome, FeatureMatrix, Network, Result, WeightedGraph};
use std::sync::atomic::AtomicBool;
use tracing::info;

/// Copy of `graph` without the edges whose weight is below `tolerance`
///
/// The vertex set is kept, so vertices may end up isolated. A tolerance of
/// zero or less keeps every edge.
#[must_use]
pub fn filter_by_tolerance(graph: &WeightedGraph, tolerance: i64) -> WeightedGraph {
    let mut filtered = graph.clone();
    filtered.retain_edges(|weight| i64::try_from(weight).map_or(true, |w| w >= tolerance));
    filtered
}

/// Aggregate bootstrap trees, then drop edges seen fewer than `tolerance` times
///
/// # Errors
/// Returns the same errors as [`aggregate`]
pub fn aggregate_filtered(
    observations: &FeatureMatrix,
    config: &BootstrapConfig,
    tolerance: i64,
    cancel: Option<&AtomicBool>,
) -> Result<BootstrapOutcome> {
    let BootstrapOutcome { graph, report } = aggregate(observations, config, cancel)?;
    let filtered = filter_by_tolerance(&graph, tolerance);
    info!(
        tolerance,
        kept = filtered.edge_count(),
        removed = graph.edge_count() - filtered.edge_count(),
        "filtered consensus graph"
    );
    Ok(BootstrapOutcome {
        graph: filtered,
        report,
    })
}
