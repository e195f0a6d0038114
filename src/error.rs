use chrono::NaiveDate;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display("request for {symbol} failed")]
    Request { symbol: String },
    #[display("failed to parse response for {symbol}")]
    ResponseParse { symbol: String },
    #[display("no price data available for {symbol}")]
    NoData { symbol: String },
}

#[derive(Debug, Display, Error)]
pub enum TimeframeError {
    #[display("unknown period token: {token}")]
    UnknownPeriod { token: String },
    #[display("invalid date: {input} (expected YYYY-MM-DD)")]
    InvalidDate { input: String },
    #[display("inverted date range: {start} > {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum AnalysisError {
    #[display("failed to fetch price history for {symbol}")]
    Fetch { symbol: String },
    #[display("indicator computation failed")]
    Indicator,
    #[display("no constituent of sector {sector} returned any data")]
    EmptySector { sector: String },
    #[display("insufficient history: latest point has undefined indicator fields (need {required} samples, got {available})")]
    InsufficientHistory { required: usize, available: usize },
}
