use crate::structs::{NetError, Result};

/// Pearson correlation coefficient between two variables
///
/// Only positions where both values are finite take part (pairwise-complete
/// observations); a `NaN` cell marks a missing value. Returns `NaN` when
/// fewer than two such pairs remain or either variable has zero variance
/// over them, since the coefficient is undefined there.
///
/// # Errors
/// Returns error if vectors have different lengths or fewer than 2 values
#[allow(clippy::cast_precision_loss)]
pub fn correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(NetError::Data("Vectors must have same length".into()));
    }
    if x.len() < 2 {
        return Err(NetError::Data("Need at least 2 values for correlation".into()));
    }

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(&xi, &yi)| (xi, yi))
        .collect();
    if pairs.len() < 2 {
        return Ok(f64::NAN);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in &pairs {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Ok(f64::NAN);
    }

    // Rounding can push |r| a hair past 1
    Ok((cov / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = correlation(&x, &y).expect("calculate correlation");

        assert!((corr - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_correlation() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![3.0, 2.0, 1.0];
        let corr = correlation(&x, &y).expect("calculate correlation");

        assert!((corr + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_undefined() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![5.0, 5.0, 5.0];
        assert!(correlation(&x, &y).expect("calculate").is_nan());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(correlation(&[1.0, 2.0], &[1.0]).is_err());
        assert!(correlation(&[1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_missing_values_skipped_pairwise() {
        let x = vec![1.0, 2.0, 3.0, 4.0, f64::NAN];
        let y = vec![2.0, f64::NAN, 5.0, 7.0, 9.0];
        let corr = correlation(&x, &y).expect("calculate correlation");

        let expected = correlation(&[1.0, 3.0, 4.0], &[2.0, 5.0, 7.0]).expect("complete pairs");
        assert!(corr.is_finite());
        assert!((corr - expected).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_complete_pairs_is_undefined() {
        let x = vec![1.0, f64::NAN, 3.0];
        let y = vec![f64::NAN, 2.0, 5.0];
        assert!(correlation(&x, &y).expect("calculate").is_nan());
    }
}
