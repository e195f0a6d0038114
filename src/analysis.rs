use std::sync::Arc;
use std::time::Duration;

use error_stack::{Report, ResultExt, bail};
use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::indicator::{BAND_WINDOW, IndicatorSeries};
use crate::model::{PriceSeries, Timeframe, close_values};
use crate::provider::MarketData;
use crate::sector::{SectorAggregate, aggregate};
use crate::verdict::Verdict;

/// Computed output for one ticker: the raw bars (for candlesticks) plus the
/// aligned indicator series a charting layer would plot.
#[derive(Debug, Clone)]
pub struct StockAnalysis {
    pub symbol: String,
    pub bars: PriceSeries,
    pub indicators: IndicatorSeries,
}

impl StockAnalysis {
    /// Verdict from the latest bar, or `InsufficientHistory` when that bar
    /// has any undefined indicator field.
    pub fn verdict(&self) -> Result<Verdict, Report<AnalysisError>> {
        let closes = close_values(&self.bars);
        match self.indicators.latest_defined(&closes) {
            Some(latest) => Ok(Verdict::from_latest(&latest)),
            None => Err(Report::new(AnalysisError::InsufficientHistory {
                required: BAND_WINDOW,
                available: self.bars.len(),
            })),
        }
    }
}

/// Computed output for one sector.
#[derive(Debug, Clone)]
pub struct SectorAnalysis {
    pub sector: String,
    pub aggregate: SectorAggregate,
    pub indicators: IndicatorSeries,
    pub verdict: Verdict,
    /// Tickers dropped because their fetch failed, timed out, or came back empty.
    pub skipped: Vec<String>,
}

/// Fetch and analyze a single ticker. A failed fetch is fatal here; there is
/// no sector to degrade into.
pub async fn analyze_stock(
    provider: &dyn MarketData,
    symbol: &str,
    timeframe: Timeframe,
    fetch_timeout: Duration,
) -> Result<StockAnalysis, Report<AnalysisError>> {
    let bars = tokio::time::timeout(fetch_timeout, provider.fetch_history(symbol, timeframe))
        .await
        .map_err(|_| {
            Report::new(AnalysisError::Fetch {
                symbol: symbol.to_owned(),
            })
            .attach(format!("timed out after {fetch_timeout:?}"))
        })?
        .change_context(AnalysisError::Fetch {
            symbol: symbol.to_owned(),
        })?;

    let indicators = IndicatorSeries::compute(&close_values(&bars))
        .change_context(AnalysisError::Indicator)?;

    Ok(StockAnalysis {
        symbol: symbol.to_owned(),
        bars,
        indicators,
    })
}

/// Fetch all constituents concurrently, aggregate the survivors, and derive
/// the sector verdict.
///
/// Per-ticker failures degrade to warnings; the analysis aborts only when
/// every constituent is unavailable (`EmptySector`) or the aggregate is too
/// short for a fully-defined latest point (`InsufficientHistory`).
pub async fn analyze_sector(
    provider: Arc<dyn MarketData>,
    sector: &str,
    tickers: &[String],
    timeframe: Timeframe,
    fetch_timeout: Duration,
) -> Result<SectorAnalysis, Report<AnalysisError>> {
    // One spawned task per ticker; each owns its own result slot. The
    // provider's internal rate limiter keeps the request rate bounded.
    let mut handles = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let provider = Arc::clone(&provider);
        let ticker = ticker.clone();
        handles.push(tokio::spawn(async move {
            match tokio::time::timeout(fetch_timeout, provider.fetch_history(&ticker, timeframe))
                .await
            {
                Ok(Ok(bars)) if !bars.is_empty() => Some(bars),
                Ok(Ok(_)) => {
                    warn!(symbol = %ticker, "no data returned, dropping from sector");
                    None
                }
                Ok(Err(e)) => {
                    warn!(symbol = %ticker, error = ?e, "fetch failed, dropping from sector");
                    None
                }
                Err(_) => {
                    warn!(symbol = %ticker, timeout = ?fetch_timeout, "fetch timed out, dropping from sector");
                    None
                }
            }
        }));
    }

    let mut constituents: Vec<(String, PriceSeries)> = Vec::new();
    let mut skipped = Vec::new();
    for (ticker, handle) in tickers.iter().zip(handles) {
        match handle.await {
            Ok(Some(bars)) => constituents.push((ticker.clone(), bars)),
            Ok(None) => skipped.push(ticker.clone()),
            Err(e) => {
                warn!(symbol = %ticker, error = ?e, "fetch task failed");
                skipped.push(ticker.clone());
            }
        }
    }

    if constituents.is_empty() {
        bail!(AnalysisError::EmptySector {
            sector: sector.to_owned(),
        });
    }

    info!(
        sector,
        constituents = constituents.len(),
        skipped = skipped.len(),
        "aggregating sector"
    );

    let agg = aggregate(&constituents);
    let indicators =
        IndicatorSeries::compute(&agg.closes).change_context(AnalysisError::Indicator)?;

    let latest = indicators.latest_defined(&agg.closes).ok_or_else(|| {
        Report::new(AnalysisError::InsufficientHistory {
            required: BAND_WINDOW,
            available: agg.len(),
        })
    })?;

    Ok(SectorAnalysis {
        sector: sector.to_owned(),
        aggregate: agg,
        indicators,
        verdict: Verdict::from_latest(&latest),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::TimeZone;
    use chrono::Utc;
    use futures::future::BoxFuture;

    use crate::error::ProviderError;
    use crate::model::{PriceBar, Signal};

    struct StubProvider {
        data: HashMap<String, PriceSeries>,
    }

    impl StubProvider {
        fn new(entries: &[(&str, &[f64])]) -> Self {
            let data = entries
                .iter()
                .map(|(symbol, closes)| ((*symbol).to_owned(), series(closes)))
                .collect();
            Self { data }
        }
    }

    impl MarketData for StubProvider {
        fn fetch_history(
            &self,
            symbol: &str,
            _timeframe: Timeframe,
        ) -> BoxFuture<'_, Result<PriceSeries, Report<ProviderError>>> {
            let symbol = symbol.to_owned();
            Box::pin(async move {
                self.data
                    .get(&symbol)
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .ok_or_else(|| Report::new(ProviderError::NoData { symbol }))
            })
        }
    }

    fn series(closes: &[f64]) -> PriceSeries {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
            })
            .collect()
    }

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| 100.0 + i as f64).collect()
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn tf() -> Timeframe {
        Timeframe::Period(crate::model::Period::Year1)
    }

    #[tokio::test]
    async fn empty_ticker_is_skipped_with_survivors_intact() {
        let closes = ramp(25);
        let provider: Arc<dyn MarketData> =
            Arc::new(StubProvider::new(&[("A", &[]), ("B", &closes)]));
        let tickers = vec!["A".to_owned(), "B".to_owned()];

        let analysis = analyze_sector(provider, "Tech", &tickers, tf(), TIMEOUT)
            .await
            .unwrap();

        assert_eq!(analysis.skipped, vec!["A".to_owned()]);
        // Aggregate of one constituent is that constituent exactly
        assert_eq!(analysis.aggregate.closes, closes);
    }

    #[tokio::test]
    async fn all_tickers_empty_is_empty_sector() {
        let provider: Arc<dyn MarketData> =
            Arc::new(StubProvider::new(&[("A", &[]), ("B", &[])]));
        let tickers = vec!["A".to_owned(), "B".to_owned()];

        let result = analyze_sector(provider, "Tech", &tickers, tf(), TIMEOUT).await;
        let report = result.unwrap_err();
        assert!(matches!(
            report.current_context(),
            AnalysisError::EmptySector { .. }
        ));
    }

    #[tokio::test]
    async fn short_aggregate_is_insufficient_history() {
        let closes = ramp(10);
        let provider: Arc<dyn MarketData> = Arc::new(StubProvider::new(&[("A", &closes)]));
        let tickers = vec!["A".to_owned()];

        let result = analyze_sector(provider, "Tech", &tickers, tf(), TIMEOUT).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            AnalysisError::InsufficientHistory { .. }
        ));
    }

    #[tokio::test]
    async fn sector_verdict_from_aggregate_latest_point() {
        // Steady ramp: RSI saturates at 100 (NotInvestable) while the close
        // stays inside the bands (Neutral), so the consensus is Neutral.
        let closes = ramp(30);
        let provider: Arc<dyn MarketData> = Arc::new(StubProvider::new(&[("A", &closes)]));
        let tickers = vec!["A".to_owned()];

        let analysis = analyze_sector(provider, "Tech", &tickers, tf(), TIMEOUT)
            .await
            .unwrap();
        assert_eq!(analysis.verdict.rsi_signal, Signal::NotInvestable);
        assert_eq!(analysis.verdict.band_signal, Signal::Neutral);
        assert_eq!(analysis.verdict.combined, Signal::Neutral);
        assert!(analysis.skipped.is_empty());
    }

    #[tokio::test]
    async fn stock_analysis_carries_bars_and_indicators() {
        let closes = ramp(30);
        let provider = StubProvider::new(&[("AAPL", &closes)]);

        let analysis = analyze_stock(&provider, "AAPL", tf(), TIMEOUT).await.unwrap();
        assert_eq!(analysis.bars.len(), 30);
        assert_eq!(analysis.indicators.len(), 30);

        let verdict = analysis.verdict().unwrap();
        assert_eq!(verdict.rsi, 100.0);
    }

    #[tokio::test]
    async fn stock_verdict_guarded_by_history() {
        let closes = ramp(15);
        let provider = StubProvider::new(&[("AAPL", &closes)]);

        let analysis = analyze_stock(&provider, "AAPL", tf(), TIMEOUT).await.unwrap();
        assert!(matches!(
            analysis.verdict().unwrap_err().current_context(),
            AnalysisError::InsufficientHistory { .. }
        ));
    }

    #[tokio::test]
    async fn stock_fetch_failure_is_fatal() {
        let provider = StubProvider::new(&[]);
        let result = analyze_stock(&provider, "GONE", tf(), TIMEOUT).await;
        assert!(matches!(
            result.unwrap_err().current_context(),
            AnalysisError::Fetch { .. }
        ));
    }
}
