use error_stack::{Report, bail};

use crate::error::IndicatorError;

/// Trailing-window arithmetic mean.
///
/// Output is aligned 1:1 with the input: index `i` is `None` until the
/// window is filled (`i < window - 1`), never a sentinel value.
pub struct RollingMean {
    window: usize,
}

impl RollingMean {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }

    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if i + 1 < self.window {
                    None
                } else {
                    let w = &values[i + 1 - self.window..=i];
                    Some(w.iter().sum::<f64>() / self.window as f64)
                }
            })
            .collect()
    }
}

/// Trailing-window sample standard deviation (divisor `n - 1`).
///
/// Same alignment and undefined-window rule as [`RollingMean`].
pub struct RollingStdDev {
    window: usize,
}

impl RollingStdDev {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window < 2 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be >= 2 for sample standard deviation".into(),
            });
        }
        Ok(Self { window })
    }

    pub fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if i + 1 < self.window {
                    None
                } else {
                    let w = &values[i + 1 - self.window..=i];
                    let mean = w.iter().sum::<f64>() / self.window as f64;
                    let variance = w.iter().map(|&v| (v - mean).powi(2)).sum::<f64>()
                        / (self.window - 1) as f64;
                    Some(variance.sqrt())
                }
            })
            .collect()
    }
}
