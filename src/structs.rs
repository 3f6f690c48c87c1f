//! Consolidated public types for the corrnet crate
//!
//! This module contains all public structs, enums, and traits used across the crate.

use ndarray::Array2;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum NetError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Correlation {value} at ({row}, {col}) is outside [-1, 1]")]
    InvalidCorrelation { row: usize, col: usize, value: f64 },

    #[error("Input is disconnected: accepted {accepted} of {required} tree edges")]
    DisconnectedInput { accepted: usize, required: usize },

    #[error("{failed} of {attempted} bootstrap iterations were degenerate")]
    TooManyDegenerateResamples { failed: usize, attempted: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NetError>;

// ============================================================================
// CSV Types
// ============================================================================

/// Represents a parsed CSV/TSV file with headers and rows
#[derive(Debug, Clone)]
pub struct CsvData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvData {
    /// Get number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.headers.len()
    }

    /// Get a column as a vector of strings
    #[must_use]
    pub fn column(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.headers.len() {
            return None;
        }
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(index).map(String::as_str))
                .collect(),
        )
    }

    /// Find columns that contain numeric data
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn numeric_column_indices(&self) -> Vec<usize> {
        (0..self.col_count())
            .filter(|&i| {
                self.column(i).is_some_and(|col| {
                    // Consider numeric if at least 50% of non-empty values parse as numbers
                    let non_empty: Vec<_> = col.iter().filter(|s| !s.is_empty()).collect();
                    if non_empty.is_empty() {
                        return false;
                    }
                    let numeric_count = non_empty
                        .iter()
                        .filter(|s| s.trim().parse::<f64>().is_ok())
                        .count();
                    numeric_count as f64 / non_empty.len() as f64 >= 0.5
                })
            })
            .collect()
    }
}

// ============================================================================
// Observation Types
// ============================================================================

/// Observation table: one row per sample, one column per variable
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Variable names (column headers)
    pub names: Vec<String>,
    /// Row data as feature vectors; `NaN` marks a missing cell
    pub data: Vec<Vec<f64>>,
    /// Original row indices (for mapping back)
    pub row_indices: Vec<usize>,
}

impl FeatureMatrix {
    /// Get number of samples (rows)
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.data.len()
    }

    /// Get number of variables (columns)
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Get a variable column by index
    #[must_use]
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.n_features() {
            return None;
        }
        Some(self.data.iter().map(|row| row[index]).collect())
    }
}

// ============================================================================
// Matrix Types
// ============================================================================

/// Symmetric `NxN` Pearson correlation matrix with its variable names
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub matrix: Array2<f64>,
}

impl CorrelationMatrix {
    /// Wrap a square matrix, checking that names and shape agree
    ///
    /// # Errors
    /// Returns error if the matrix is not square or names do not match its size
    pub fn new(names: Vec<String>, matrix: Array2<f64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(NetError::Data(format!(
                "Correlation matrix must be square, got {rows}x{cols}"
            )));
        }
        if names.len() != rows {
            return Err(NetError::Data(format!(
                "{} names given for a {rows}x{rows} correlation matrix",
                names.len()
            )));
        }
        Ok(Self { names, matrix })
    }

    /// Number of variables
    #[must_use]
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }
}

/// Symmetric `NxN` distance matrix derived from a correlation matrix
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    pub matrix: Array2<f64>,
}

impl DistanceMatrix {
    /// Wrap a square matrix of pairwise distances
    ///
    /// # Errors
    /// Returns error if the matrix is not square
    pub fn new(matrix: Array2<f64>) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(NetError::Data(format!(
                "Distance matrix must be square, got {rows}x{cols}"
            )));
        }
        Ok(Self { matrix })
    }

    /// Number of vertices
    #[must_use]
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }
}

// ============================================================================
// Graph Types
// ============================================================================

/// Read access shared by spanning trees and consensus graphs
pub trait Network {
    /// Number of vertices
    fn vertex_count(&self) -> usize;

    /// Edges as `(source, target, weight)` with `source < target`
    fn weighted_edges(&self) -> Vec<(usize, usize, usize)>;

    /// Optional display label of a vertex
    fn label(&self, vertex: usize) -> Option<&str>;

    /// Number of edges
    fn edge_count(&self) -> usize {
        self.weighted_edges().len()
    }

    /// Edges as vertex index pairs
    fn edge_list(&self) -> Vec<(usize, usize)> {
        self.weighted_edges()
            .into_iter()
            .map(|(s, t, _)| (s, t))
            .collect()
    }
}

/// An edge accepted into a spanning tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TreeEdge {
    pub source: usize,
    pub target: usize,
    pub distance: f64,
}

/// Minimum spanning tree over `vertex_count` vertices
#[derive(Debug, Clone)]
pub struct SpanningTree {
    vertex_count: usize,
    edges: Vec<TreeEdge>,
    labels: Option<Vec<String>>,
}

impl SpanningTree {
    pub(crate) fn new(
        vertex_count: usize,
        edges: Vec<TreeEdge>,
        labels: Option<Vec<String>>,
    ) -> Self {
        Self {
            vertex_count,
            edges,
            labels,
        }
    }

    /// Edges in the order they were accepted
    #[must_use]
    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    /// Sum of edge distances
    #[must_use]
    pub fn total_distance(&self) -> f64 {
        self.edges.iter().map(|e| e.distance).sum()
    }
}

impl Network for SpanningTree {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn weighted_edges(&self) -> Vec<(usize, usize, usize)> {
        self.edges.iter().map(|e| (e.source, e.target, 1)).collect()
    }

    fn label(&self, vertex: usize) -> Option<&str> {
        self.labels.as_ref()?.get(vertex).map(String::as_str)
    }
}

/// Simple undirected graph whose edges carry occurrence counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedGraph {
    vertex_count: usize,
    edges: BTreeMap<(usize, usize), usize>,
    labels: Option<Vec<String>>,
}

impl WeightedGraph {
    /// Build from accumulated counts; the vertex set is every endpoint seen
    #[must_use]
    pub fn from_counts(counts: BTreeMap<(usize, usize), usize>, labels: Option<Vec<String>>) -> Self {
        let vertices: BTreeSet<usize> = counts.keys().flat_map(|&(s, t)| [s, t]).collect();
        let edges = counts.into_iter().filter(|&(_, w)| w > 0).collect();
        Self {
            vertex_count: vertices.len(),
            edges,
            labels,
        }
    }

    /// Occurrence count of the edge between `a` and `b`, in either order
    #[allow(dead_code)]
    #[must_use]
    pub fn weight(&self, a: usize, b: usize) -> Option<usize> {
        self.edges.get(&(a.min(b), a.max(b))).copied()
    }

    /// Drop every edge whose weight fails the predicate
    pub(crate) fn retain_edges(&mut self, mut keep: impl FnMut(usize) -> bool) {
        self.edges.retain(|_, w| keep(*w));
    }
}

impl Network for WeightedGraph {
    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn weighted_edges(&self) -> Vec<(usize, usize, usize)> {
        self.edges.iter().map(|(&(s, t), &w)| (s, t, w)).collect()
    }

    fn label(&self, vertex: usize) -> Option<&str> {
        self.labels.as_ref()?.get(vertex).map(String::as_str)
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// ============================================================================
// Bootstrap Types
// ============================================================================

/// A bootstrap iteration that was skipped
#[derive(Debug, Clone, Serialize)]
pub struct IterationFailure {
    pub iteration: usize,
    pub reason: String,
}

/// Bookkeeping for one aggregation run
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub seed: u64,
    pub requested: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failures: Vec<IterationFailure>,
}

impl BootstrapReport {
    /// Number of skipped (degenerate) iterations
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// Consensus graph together with how it was obtained
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub graph: WeightedGraph,
    pub report: BootstrapReport,
}
