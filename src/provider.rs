pub mod yahoo;

use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ProviderError;
use crate::model::{PriceSeries, Timeframe};

/// Abstraction over a historical market data source.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn MarketData`).
pub trait MarketData: Send + Sync {
    /// Fetch daily price history for `symbol` over `timeframe`, oldest first.
    ///
    /// An empty history is an error (`ProviderError::NoData`); the caller
    /// treats empty and failed fetches identically.
    fn fetch_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<ProviderError>>>;
}
