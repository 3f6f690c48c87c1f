//! Network pipeline that orchestrates correlation, tree and consensus steps

use crate::network::bootstrap::BootstrapConfig;
use crate::network::correlation::correlation_matrix;
use crate::network::distance::distance_matrix;
use crate::network::filter::aggregate_filtered;
use crate::network::mst::build_mst;
use crate::structs::{BootstrapOutcome, CorrelationMatrix, FeatureMatrix, Result, SpanningTree};
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

/// Configuration for the network pipeline
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    /// Bootstrap settings; `None` builds the single full-data tree only
    pub bootstrap: Option<BootstrapConfig>,
    /// Minimum occurrence count of a consensus edge
    pub tolerance: i64,
}

/// Everything the pipeline produced
#[derive(Debug, Clone)]
pub struct NetworkResult {
    pub correlation: CorrelationMatrix,
    pub tree: Option<SpanningTree>,
    pub consensus: Option<BootstrapOutcome>,
}

/// Build the full-data spanning tree, labelled with the variable names
///
/// # Errors
/// Returns error if the correlation matrix is invalid or the tree is incomplete
pub fn full_tree(correlation: &CorrelationMatrix) -> Result<SpanningTree> {
    let distance = distance_matrix(correlation)?;
    build_mst(&distance, Some(&correlation.names))
}

/// Run the full pipeline
///
/// # Errors
/// Returns error if the correlation matrix cannot be computed or bootstrap
/// aggregation fails. Without bootstrap the full-data tree is required;
/// with bootstrap its failure is non-fatal (logged and set to `None`).
pub fn run_pipeline(
    features: &FeatureMatrix,
    config: &NetworkConfig,
    cancel: Option<&AtomicBool>,
) -> Result<NetworkResult> {
    let correlation = correlation_matrix(features)?;
    info!(
        variables = correlation.size(),
        rows = features.n_samples(),
        "computed correlation matrix"
    );

    let Some(bootstrap) = &config.bootstrap else {
        let tree = full_tree(&correlation)?;
        info!(edges = tree.edges().len(), "built full-data tree");
        return Ok(NetworkResult {
            correlation,
            tree: Some(tree),
            consensus: None,
        });
    };

    let tree = match full_tree(&correlation) {
        Ok(tree) => Some(tree),
        Err(e) => {
            warn!(error = %e, "full-data tree failed");
            None
        }
    };

    let consensus = aggregate_filtered(features, bootstrap, config.tolerance, cancel)?;

    Ok(NetworkResult {
        correlation,
        tree,
        consensus: Some(consensus),
    })
}
