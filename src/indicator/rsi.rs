use error_stack::{Report, bail};

use crate::error::IndicatorError;

/// RSI (Relative Strength Index) over trailing simple moving averages of
/// gains and losses.
///
/// When the trailing average loss is zero and the average gain is positive,
/// RSI saturates at 100. When both averages are zero (a flat window) the
/// ratio is 0/0 and the value stays undefined rather than being coerced to
/// a neutral reading.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        if period == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "period must be > 0".into(),
            });
        }
        Ok(Self { period })
    }

    #[allow(dead_code)]
    pub fn period(&self) -> usize {
        self.period
    }

    /// Compute RSI aligned 1:1 with `closes`.
    ///
    /// Index `i` is defined once `period` deltas precede it, i.e. for
    /// `i >= period`.
    pub fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

        closes
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if i < self.period {
                    return None;
                }
                // Trailing `period` deltas ending at close index `i`.
                let window = &deltas[i - self.period..i];
                let avg_gain =
                    window.iter().map(|&d| d.max(0.0)).sum::<f64>() / self.period as f64;
                let avg_loss =
                    window.iter().map(|&d| (-d).max(0.0)).sum::<f64>() / self.period as f64;
                rsi_value(avg_gain, avg_loss)
            })
            .collect()
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            return Some(100.0);
        }
        // 0/0: no movement in the window, the ratio is undefined
        return None;
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_zero_invalid() {
        assert!(Rsi::new(0).is_err());
    }

    #[test]
    fn undefined_until_period_deltas_available() {
        let rsi = Rsi::new(14).unwrap();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rsi.compute(&closes);
        assert_eq!(out.len(), 30);
        for v in &out[..14] {
            assert!(v.is_none());
        }
        for v in &out[14..] {
            assert!(v.is_some());
        }
    }

    #[test]
    fn monotonic_rise_saturates_at_100() {
        let rsi = Rsi::new(14).unwrap();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rsi.compute(&closes);
        for v in out.iter().flatten() {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn monotonic_fall_is_zero() {
        let rsi = Rsi::new(14).unwrap();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = rsi.compute(&closes);
        for v in out.iter().flatten() {
            assert!(v.abs() < 1e-9);
        }
    }

    #[test]
    fn flat_series_stays_undefined() {
        // All deltas zero: 0/0 ratio, never coerced to 50
        let rsi = Rsi::new(14).unwrap();
        let out = rsi.compute(&[10.0; 30]);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn known_value_half_gains() {
        // Alternating +1/-1 deltas: avg_gain == avg_loss -> rs = 1 -> RSI 50
        let rsi = Rsi::new(4).unwrap();
        let closes = [10.0, 11.0, 10.0, 11.0, 10.0, 11.0];
        let out = rsi.compute(&closes);
        for v in out.iter().flatten() {
            assert!((v - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn short_series_all_undefined() {
        let rsi = Rsi::new(14).unwrap();
        let out = rsi.compute(&[1.0; 10]);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn empty_series() {
        let rsi = Rsi::new(14).unwrap();
        assert!(rsi.compute(&[]).is_empty());
    }
}
