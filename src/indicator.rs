pub mod bollinger;
pub mod ma;
pub mod rsi;

use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::bollinger::BollingerBands;
use crate::indicator::rsi::Rsi;

/// Trailing window for the SMA and standard deviation behind the bands.
pub const BAND_WINDOW: usize = 20;
/// Standard deviations between the SMA and each band.
pub const BAND_MULTIPLIER: f64 = 2.0;
/// Trailing delta window for RSI.
pub const RSI_PERIOD: usize = 14;

/// Derived indicator values for one close-only series.
///
/// Every field is aligned 1:1 with the source series; a value is `None`
/// until its trailing window has filled. The same engine runs for a single
/// ticker's closes and for a sector aggregate's closes.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub sma: Vec<Option<f64>>,
    pub std_dev: Vec<Option<f64>>,
    pub upper_band: Vec<Option<f64>>,
    pub lower_band: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

/// The most recent sample with every indicator field defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestPoint {
    pub close: f64,
    pub sma: f64,
    pub std_dev: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub rsi: f64,
}

impl IndicatorSeries {
    /// Compute Bollinger Bands (20-sample, 2 standard deviations) and
    /// RSI (14) over a close-only series.
    pub fn compute(closes: &[f64]) -> Result<Self, Report<IndicatorError>> {
        let bands = BollingerBands::new(BAND_WINDOW, BAND_MULTIPLIER)?.compute(closes);
        let rsi = Rsi::new(RSI_PERIOD)?.compute(closes);

        let mut series = Self {
            sma: Vec::with_capacity(closes.len()),
            std_dev: Vec::with_capacity(closes.len()),
            upper_band: Vec::with_capacity(closes.len()),
            lower_band: Vec::with_capacity(closes.len()),
            rsi,
        };
        for band in bands {
            series.sma.push(band.map(|b| b.sma));
            series.std_dev.push(band.map(|b| b.std_dev));
            series.upper_band.push(band.map(|b| b.upper));
            series.lower_band.push(band.map(|b| b.lower));
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.sma.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.sma.is_empty()
    }

    /// Return the final sample only when every indicator field is defined
    /// there. `None` means the series is too short (or too flat, for RSI)
    /// to support a verdict.
    pub fn latest_defined(&self, closes: &[f64]) -> Option<LatestPoint> {
        let i = closes.len().checked_sub(1)?;
        Some(LatestPoint {
            close: closes[i],
            sma: self.sma[i]?,
            std_dev: self.std_dev[i]?,
            upper_band: self.upper_band[i]?,
            lower_band: self.lower_band[i]?,
            rsi: self.rsi[i]?,
        })
    }
}
