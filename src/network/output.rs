//! Output file writers for network results

use crate::network::pipeline::NetworkResult;
use crate::structs::{BootstrapReport, CorrelationMatrix, Network, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Write `correlation.csv` - the correlation matrix with names on both axes
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_correlation(output_dir: &Path, corr: &CorrelationMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_dir.join("correlation.csv"))?;

    let mut header = vec![String::new()];
    header.extend(corr.names.iter().cloned());
    writer.write_record(&header)?;

    for (name, row) in corr.names.iter().zip(corr.matrix.rows()) {
        let mut record = vec![name.clone()];
        record.extend(row.iter().map(|r| format!("{r:.6}")));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write an edge list - one row per edge with labels and weight
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_edges<N: Network>(output_dir: &Path, file_name: &str, network: &N) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_dir.join(file_name))?;

    for (source, target, weight) in network.weighted_edges() {
        writer.serialize(EdgeRow {
            source,
            target,
            source_label: network.label(source).unwrap_or_default(),
            target_label: network.label(target).unwrap_or_default(),
            weight,
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write `summary.json` - machine-readable overview of the run
///
/// # Errors
/// Returns error if file cannot be written
pub fn write_summary_json(
    output_dir: &Path,
    rows: usize,
    result: &NetworkResult,
    tolerance: i64,
) -> Result<()> {
    let output = SummaryOutput {
        rows,
        variables: result.correlation.names.clone(),
        tree: result.tree.as_ref().map(|t| TreeSummary {
            vertex_count: t.vertex_count(),
            edge_count: t.edge_count(),
            total_distance: t.total_distance(),
        }),
        consensus: result.consensus.as_ref().map(|c| ConsensusSummary {
            vertex_count: c.graph.vertex_count(),
            edge_count: c.graph.edge_count(),
            tolerance,
            bootstrap: &c.report,
        }),
    };

    let json = serde_json::to_string_pretty(&output)?;
    fs::write(output_dir.join("summary.json"), json)?;
    Ok(())
}

// Output structures

#[derive(Serialize)]
struct EdgeRow<'a> {
    source: usize,
    target: usize,
    source_label: &'a str,
    target_label: &'a str,
    weight: usize,
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    rows: usize,
    variables: Vec<String>,
    tree: Option<TreeSummary>,
    consensus: Option<ConsensusSummary<'a>>,
}

#[derive(Serialize)]
struct TreeSummary {
    vertex_count: usize,
    edge_count: usize,
    total_distance: f64,
}

#[derive(Serialize)]
struct ConsensusSummary<'a> {
    vertex_count: usize,
    edge_count: usize,
    tolerance: i64,
    bootstrap: &'a BootstrapReport,
}
