//! Small statistical helpers used by the measure suites.

/// Statistical utilities
pub struct Stats;

impl Stats {
    /// Mean of a slice, `None` when empty
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Population variance, `None` when empty
    pub fn variance(values: &[f64]) -> Option<f64> {
        let mean = Self::mean(values)?;
        Some(values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64)
    }

    /// Pearson correlation coefficient.
    ///
    /// Returns `None` for empty or mismatched input and when either series
    /// has zero variance.
    pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
        if x.len() != y.len() || x.is_empty() {
            return None;
        }

        let mean_x = Self::mean(x)?;
        let mean_y = Self::mean(y)?;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;

        for (a, b) in x.iter().zip(y) {
            let dx = a - mean_x;
            let dy = b - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }

        Some(cov / (var_x * var_y).sqrt())
    }
}
