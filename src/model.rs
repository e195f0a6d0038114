use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use error_stack::{Report, bail};
use serde::{Deserialize, Serialize};

use crate::error::TimeframeError;

/// One daily OHLC sample for a single symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Ordered price history for one symbol: strictly increasing timestamps,
/// no duplicates. Providers are responsible for upholding the ordering.
pub type PriceSeries = Vec<PriceBar>;

/// Extract close prices from a price series.
pub fn close_values(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Named relative lookback period.
///
/// String representations match the CLI/provider format (e.g. `"1mo"`, `"1y"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day1,
    Day5,
    Month1,
    Month3,
    Month6,
    YearToDate,
    Year1,
    Year2,
    Year5,
}

impl Period {
    /// Parse a CLI-format string into a `Period`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1d" => Some(Self::Day1),
            "5d" => Some(Self::Day5),
            "1mo" => Some(Self::Month1),
            "3mo" => Some(Self::Month3),
            "6mo" => Some(Self::Month6),
            "ytd" => Some(Self::YearToDate),
            "1y" => Some(Self::Year1),
            "2y" => Some(Self::Year2),
            "5y" => Some(Self::Year5),
            _ => None,
        }
    }

    /// Return the CLI-format string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day1 => "1d",
            Self::Day5 => "5d",
            Self::Month1 => "1mo",
            Self::Month3 => "3mo",
            Self::Month6 => "6mo",
            Self::YearToDate => "ytd",
            Self::Year1 => "1y",
            Self::Year2 => "2y",
            Self::Year5 => "5y",
        }
    }

    /// Return the Yahoo chart API `range` parameter for this period.
    /// Yahoo accepts the same tokens the CLI uses.
    pub fn yahoo_range(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookback window for one analysis run: either a named relative period or
/// an explicit date range. Validated at construction; everything downstream
/// assumes it is well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Period(Period),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Timeframe {
    /// Build an explicit date-range timeframe, rejecting inverted ranges.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, Report<TimeframeError>> {
        if start > end {
            bail!(TimeframeError::InvertedRange { start, end });
        }
        Ok(Self::Range { start, end })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Period(p) => write!(f, "{p}"),
            Self::Range { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

/// Categorical investability signal derived from one indicator reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Investable,
    NotInvestable,
    Neutral,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Investable => write!(f, "Investable (Oversold)"),
            Self::NotInvestable => write!(f, "Not Investable (Overbought)"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_round_trip() {
        let periods = [
            ("1d", Period::Day1),
            ("5d", Period::Day5),
            ("1mo", Period::Month1),
            ("3mo", Period::Month3),
            ("6mo", Period::Month6),
            ("ytd", Period::YearToDate),
            ("1y", Period::Year1),
            ("2y", Period::Year2),
            ("5y", Period::Year5),
        ];
        for (s, p) in periods {
            assert_eq!(Period::from_str(s), Some(p));
            assert_eq!(p.as_str(), s);
        }
    }

    #[test]
    fn period_invalid_string_returns_none() {
        assert_eq!(Period::from_str("2mo"), None);
        assert_eq!(Period::from_str(""), None);
    }

    #[test]
    fn timeframe_inverted_range_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(Timeframe::range(start, end).is_err());
    }

    #[test]
    fn timeframe_valid_range_accepted() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let tf = Timeframe::range(start, end).unwrap();
        assert_eq!(tf, Timeframe::Range { start, end });
    }

    #[test]
    fn timeframe_single_day_range_accepted() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert!(Timeframe::range(d, d).is_ok());
    }

    #[test]
    fn signal_display() {
        assert_eq!(Signal::Neutral.to_string(), "Neutral");
        assert_eq!(Signal::Investable.to_string(), "Investable (Oversold)");
        assert_eq!(
            Signal::NotInvestable.to_string(),
            "Not Investable (Overbought)"
        );
    }

    #[test]
    fn close_values_extracts_in_order() {
        let bars: Vec<PriceBar> = [10.0, 11.0, 12.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                timestamp: Utc::now() + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
            })
            .collect();
        assert_eq!(close_values(&bars), vec![10.0, 11.0, 12.0]);
    }
}
