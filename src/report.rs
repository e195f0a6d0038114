pub mod terminal;

use crate::analysis::{SectorAnalysis, StockAnalysis};
use crate::verdict::Verdict;

/// Sink for completed analysis results.
pub trait Reporter: Send + Sync {
    fn report_sector(&self, analysis: &SectorAnalysis);

    /// `verdict` is absent when the series was too short to support one;
    /// the computed series is still reported for charting.
    fn report_stock(&self, analysis: &StockAnalysis, verdict: Option<&Verdict>);
}
