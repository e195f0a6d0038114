use crate::analysis::{SectorAnalysis, StockAnalysis};
use crate::report::Reporter;
use crate::verdict::Verdict;

pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn report_sector(&self, analysis: &SectorAnalysis) {
        if !analysis.skipped.is_empty() {
            tracing::warn!(
                sector = %analysis.sector,
                skipped = ?analysis.skipped,
                "tickers dropped from aggregate"
            );
        }
        tracing::info!(
            sector = %analysis.sector,
            samples = analysis.aggregate.len(),
            rsi = analysis.verdict.rsi,
            rsi_signal = %analysis.verdict.rsi_signal,
            close = analysis.verdict.close,
            upper_band = analysis.verdict.upper_band,
            lower_band = analysis.verdict.lower_band,
            band_signal = %analysis.verdict.band_signal,
            "combined verdict for {}: {}",
            analysis.sector,
            analysis.verdict.combined,
        );
    }

    fn report_stock(&self, analysis: &StockAnalysis, verdict: Option<&Verdict>) {
        match verdict {
            Some(v) => {
                tracing::info!(
                    symbol = %analysis.symbol,
                    samples = analysis.bars.len(),
                    rsi = v.rsi,
                    rsi_signal = %v.rsi_signal,
                    close = v.close,
                    upper_band = v.upper_band,
                    lower_band = v.lower_band,
                    band_signal = %v.band_signal,
                    "verdict for {}: {}",
                    analysis.symbol,
                    v.combined,
                );
            }
            None => {
                tracing::info!(
                    symbol = %analysis.symbol,
                    samples = analysis.bars.len(),
                    "series computed; not enough history for a verdict"
                );
            }
        }
    }
}
