use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::ma::{RollingMean, RollingStdDev};

/// One fully-defined Bollinger point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub sma: f64,
    pub std_dev: f64,
    pub upper: f64,
    pub lower: f64,
}

pub struct BollingerBands {
    period: usize,
    multiplier: f64,
    mean: RollingMean,
    std_dev: RollingStdDev,
}

impl BollingerBands {
    pub fn new(period: usize, multiplier: f64) -> Result<Self, Report<IndicatorError>> {
        if multiplier <= 0.0 {
            bail!(IndicatorError::InvalidParameter {
                name: "multiplier must be > 0".into(),
            });
        }
        Ok(Self {
            period,
            multiplier,
            mean: RollingMean::new(period)?,
            std_dev: RollingStdDev::new(period)?,
        })
    }

    #[allow(dead_code)]
    pub fn period(&self) -> usize {
        self.period
    }

    /// Compute bands aligned 1:1 with `closes`; `None` while the trailing
    /// window is unfilled. A series shorter than the window yields all `None`.
    pub fn compute(&self, closes: &[f64]) -> Vec<Option<Band>> {
        let sma = self.mean.compute(closes);
        let sd = self.std_dev.compute(closes);

        sma.into_iter()
            .zip(sd)
            .map(|(sma, sd)| {
                let (sma, sd) = (sma?, sd?);
                Some(Band {
                    sma,
                    std_dev: sd,
                    upper: sma + self.multiplier * sd,
                    lower: sma - self.multiplier * sd,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_zero_invalid() {
        assert!(BollingerBands::new(0, 2.0).is_err());
    }

    #[test]
    fn negative_multiplier_invalid() {
        assert!(BollingerBands::new(20, -1.0).is_err());
    }

    #[test]
    fn short_series_all_undefined() {
        let bb = BollingerBands::new(5, 2.0).unwrap();
        let out = bb.compute(&[1.0; 4]);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn constant_series_bands_collapse_to_sma() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let out = bb.compute(&[10.0; 5]);
        for band in out.iter().skip(2).map(|b| b.unwrap()) {
            assert!((band.sma - 10.0).abs() < 1e-9);
            assert!(band.std_dev.abs() < 1e-9);
            assert!((band.upper - 10.0).abs() < 1e-9);
            assert!((band.lower - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bands_symmetric_around_sma() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let out = bb.compute(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        for band in out.iter().flatten() {
            assert!((band.upper - band.sma - (band.sma - band.lower)).abs() < 1e-9);
        }
    }

    #[test]
    fn known_band_values() {
        let bb = BollingerBands::new(3, 2.0).unwrap();
        let out = bb.compute(&[1.0, 2.0, 3.0]);
        // mean 2, sample std dev 1 -> upper 4, lower 0
        let band = out[2].unwrap();
        assert!((band.sma - 2.0).abs() < 1e-9);
        assert!((band.std_dev - 1.0).abs() < 1e-9);
        assert!((band.upper - 4.0).abs() < 1e-9);
        assert!((band.lower - 0.0).abs() < 1e-9);
    }
}
