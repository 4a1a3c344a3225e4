use crate::ingest::types::{DateRange, PriceSeries};
use anyhow::Result;

/// Source of daily price history.
///
/// Implementations return an empty series (not an error) when the upstream has no usable
/// close prices for the symbol; errors are reserved for transport and protocol failures.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn fetch_daily(&self, symbol: &str, range: DateRange) -> Result<PriceSeries>;
}
