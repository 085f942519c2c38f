use tracing::{info, warn};

use crate::Matrix;

/// Applies `max(0, log10(v))` to every value.
///
/// Values without a logarithm (zero, negative, or nonfinite) are flagged as missing (`None`).
pub fn log10_clamped(matrix: &Matrix<f64>) -> Matrix<Option<f64>> {
    let transformed = matrix.map(|&n| transform(n));

    let flagged_count = count_missing(&transformed);

    if flagged_count > 0 {
        warn!(flagged_count, "flagged values without a logarithm as missing");
    }

    info!("applied log10 transform");

    transformed
}

pub fn count_missing(matrix: &Matrix<Option<f64>>) -> usize {
    matrix.data().iter().filter(|value| value.is_none()).count()
}

fn transform(n: f64) -> Option<f64> {
    if n > 0.0 && n.is_finite() {
        Some(n.log10().max(0.0))
    } else {
        None
    }
}
