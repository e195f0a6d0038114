use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::model::{PriceBar, PriceSeries, Timeframe};
use crate::provider::MarketData;

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Unauthenticated chart requests are throttled hard; stay well under.
pub const YAHOO_REQUESTS_PER_SECOND: u32 = 4;

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_BASE_URL, YAHOO_REQUESTS_PER_SECOND)
    }

    /// Custom base URL and request rate, mainly for config overrides and
    /// pointing tests at a stub server.
    pub fn with_base_url(base_url: &str, requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(nonzero!(1u32));
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketData for YahooProvider {
    fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<ProviderError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            // Wait for rate limiter before making the request
            self.rate_limiter.until_ready().await;

            let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
            let params = timeframe_params(timeframe);

            debug!(symbol = %symbol, timeframe = %timeframe, "fetching price history");

            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .change_context(ProviderError::Request {
                    symbol: symbol.clone(),
                })?;

            if !response.status().is_success() {
                return Err(Report::new(ProviderError::Request {
                    symbol: symbol.clone(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let chart: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(ProviderError::ResponseParse {
                        symbol: symbol.clone(),
                    })?;

            parse_chart(&symbol, chart)
        })
    }
}

/// Map a timeframe onto chart API query parameters. Named periods use
/// `range`; explicit ranges use unix-second `period1`/`period2`, with the
/// end pushed one day forward so the end date itself is included.
fn timeframe_params(timeframe: Timeframe) -> Vec<(String, String)> {
    let mut params = vec![("interval".to_owned(), "1d".to_owned())];
    match timeframe {
        Timeframe::Period(p) => {
            params.push(("range".to_owned(), p.yahoo_range().to_owned()));
        }
        Timeframe::Range { start, end } => {
            params.push(("period1".to_owned(), midnight_utc(start).to_string()));
            params.push((
                "period2".to_owned(),
                (midnight_utc(end) + 86_400).to_string(),
            ));
        }
    }
    params
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn parse_chart(
    symbol: &str,
    chart: ChartResponse,
) -> Result<PriceSeries, Report<ProviderError>> {
    let result = chart
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| {
            Report::new(ProviderError::NoData {
                symbol: symbol.to_owned(),
            })
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| {
            Report::new(ProviderError::NoData {
                symbol: symbol.to_owned(),
            })
        })?;

    let mut bars: PriceSeries = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // Rows with any null field (halted days, partial sessions) are skipped
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open, i),
            field(&quote.high, i),
            field(&quote.low, i),
            field(&quote.close, i),
        ) else {
            continue;
        };
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            continue;
        };
        bars.push(PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
        });
    }

    if bars.is_empty() {
        return Err(Report::new(ProviderError::NoData {
            symbol: symbol.to_owned(),
        }));
    }

    // Uphold the series invariant regardless of upstream ordering
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);

    Ok(bars)
}

fn field(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

// ── Chart API response types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}
