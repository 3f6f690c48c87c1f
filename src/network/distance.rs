//! Correlation to distance transform, `d = sqrt(2 * (1 - r))`

use crate::structs::{CorrelationMatrix, DistanceMatrix, NetError, Result};

/// How far outside [-1, 1] a coefficient may drift before it is rejected
pub const CORRELATION_TOLERANCE: f64 = 1e-9;

/// Transform a correlation matrix into a distance matrix
///
/// Values slightly outside [-1, 1] (within [`CORRELATION_TOLERANCE`]) are
/// clamped. `NaN` coefficients stay `NaN`; the tree builder treats such
/// pairs as missing.
///
/// # Errors
/// Returns `InvalidCorrelation` for the first value too far outside [-1, 1]
pub fn distance_matrix(corr: &CorrelationMatrix) -> Result<DistanceMatrix> {
    if let Some(((row, col), &value)) = corr.matrix.indexed_iter().find(|(_, &r)| {
        !r.is_nan() && (r > 1.0 + CORRELATION_TOLERANCE || r < -1.0 - CORRELATION_TOLERANCE)
    }) {
        return Err(NetError::InvalidCorrelation { row, col, value });
    }

    let mut matrix = corr
        .matrix
        .mapv(|r| (2.0 * (1.0 - r.clamp(-1.0, 1.0))).sqrt());
    matrix.diag_mut().fill(0.0);

    DistanceMatrix::new(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn corr(matrix: ndarray::Array2<f64>) -> CorrelationMatrix {
        let names = (0..matrix.nrows()).map(|i| format!("v{i}")).collect();
        CorrelationMatrix::new(names, matrix).expect("square")
    }

    #[test]
    fn test_known_values() {
        let d = distance_matrix(&corr(array![[1.0, 0.5, -1.0], [0.5, 1.0, 0.0], [-1.0, 0.0, 1.0]]))
            .expect("transform");

        assert!((d.matrix[[0, 1]] - 1.0).abs() < 1e-12);
        assert!((d.matrix[[0, 2]] - 2.0).abs() < 1e-12);
        assert!((d.matrix[[1, 2]] - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric_zero_diagonal_non_negative() {
        let d = distance_matrix(&corr(array![
            [1.0, 0.9, 0.1, -0.3],
            [0.9, 1.0, 0.2, 0.4],
            [0.1, 0.2, 1.0, -0.8],
            [-0.3, 0.4, -0.8, 1.0]
        ]))
        .expect("transform");

        let n = d.size();
        for i in 0..n {
            assert_eq!(d.matrix[[i, i]], 0.0);
            for j in 0..n {
                assert_eq!(d.matrix[[i, j]], d.matrix[[j, i]]);
                assert!(d.matrix[[i, j]] >= 0.0);
            }
        }
    }

    #[test]
    fn test_rounding_noise_is_clamped() {
        let d = distance_matrix(&corr(array![[1.0, 1.0 + 1e-12], [1.0 + 1e-12, 1.0]]))
            .expect("transform");
        assert_eq!(d.matrix[[0, 1]], 0.0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = distance_matrix(&corr(array![[1.0, 1.5], [1.5, 1.0]])).unwrap_err();
        assert!(matches!(
            err,
            NetError::InvalidCorrelation { row: 0, col: 1, .. }
        ));

        let err = distance_matrix(&corr(array![[1.0, -1.1], [-1.1, 1.0]])).unwrap_err();
        assert!(matches!(err, NetError::InvalidCorrelation { .. }));
    }

    #[test]
    fn test_nan_passes_through() {
        let d = distance_matrix(&corr(array![[1.0, f64::NAN], [f64::NAN, 1.0]]))
            .expect("transform");
        assert!(d.matrix[[0, 1]].is_nan());
        assert_eq!(d.matrix[[1, 1]], 0.0);
    }
}
