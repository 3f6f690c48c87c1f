//! Correlation matrix computation

use crate::network::stats::correlation;
use crate::structs::{CorrelationMatrix, FeatureMatrix, Result};
use ndarray::Array2;

/// Compute the `NxN` Pearson correlation matrix between all variables
///
/// Each pair uses the rows where both variables are present. Pairs involving
/// a zero-variance column, or with fewer than two shared rows, are `NaN`.
///
/// # Errors
/// Returns error if there are fewer than 2 rows
pub fn correlation_matrix(features: &FeatureMatrix) -> Result<CorrelationMatrix> {
    let n = features.n_features();
    let mut matrix = Array2::<f64>::zeros((n, n));

    let columns: Vec<Vec<f64>> = (0..n).filter_map(|i| features.column(i)).collect();

    for i in 0..n {
        matrix[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let r = correlation(&columns[i], &columns[j])?;
            matrix[[i, j]] = r;
            matrix[[j, i]] = r;
        }
    }

    CorrelationMatrix::new(features.names.clone(), matrix)
}
