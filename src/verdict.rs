use crate::indicator::LatestPoint;
use crate::model::Signal;

/// Structured verdict for one analysis target, carrying the readings that
/// produced it so callers can report them without re-deriving anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub rsi: f64,
    pub rsi_signal: Signal,
    pub close: f64,
    pub upper_band: f64,
    pub lower_band: f64,
    pub band_signal: Signal,
    pub combined: Signal,
}

impl Verdict {
    /// Derive the verdict from the latest fully-defined indicator point.
    pub fn from_latest(latest: &LatestPoint) -> Self {
        let rsi_signal = rsi_signal(latest.rsi);
        let band_signal = band_signal(latest.close, latest.upper_band, latest.lower_band);
        Self {
            rsi: latest.rsi,
            rsi_signal,
            close: latest.close,
            upper_band: latest.upper_band,
            lower_band: latest.lower_band,
            band_signal,
            combined: combine(rsi_signal, band_signal),
        }
    }
}

/// RSI thresholds: above 70 is overbought, below 30 is oversold.
pub fn rsi_signal(rsi: f64) -> Signal {
    if rsi > 70.0 {
        Signal::NotInvestable
    } else if rsi < 30.0 {
        Signal::Investable
    } else {
        Signal::Neutral
    }
}

/// Band thresholds: a close outside the envelope is a signal, inside is not.
pub fn band_signal(close: f64, upper: f64, lower: f64) -> Signal {
    if close > upper {
        Signal::NotInvestable
    } else if close < lower {
        Signal::Investable
    } else {
        Signal::Neutral
    }
}

/// Conservative consensus: conviction requires both signals to agree; any
/// disagreement, including one side being Neutral, resolves to Neutral.
pub fn combine(a: Signal, b: Signal) -> Signal {
    if a == b { a } else { Signal::Neutral }
}
