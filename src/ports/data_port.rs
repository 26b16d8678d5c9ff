//! Market data access port.

use chrono::NaiveDate;

use crate::domain::analysis::{NewsItem, Quote};
use crate::domain::bar::OhlcvBar;
use crate::domain::error::EodtraderError;
use crate::domain::screening::SnapshotRow;

/// Price adjustment applied to historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Raw exchange prices.
    None,
    /// Forward-adjusted for splits and dividends.
    Forward,
}

/// The external market data provider. Implementations must tolerate
/// unavailable symbols by returning empty results rather than erroring;
/// errors are reserved for transport and payload failures.
pub trait MarketDataPort {
    /// Daily bars for one symbol over a closed date range, oldest first.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjustment: Adjustment,
    ) -> Result<Vec<OhlcvBar>, EodtraderError>;

    /// One cross-sectional snapshot row per listed symbol.
    fn fetch_snapshot(&self) -> Result<Vec<SnapshotRow>, EodtraderError>;

    /// Realtime quote for one symbol; `None` when the symbol is unknown.
    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, EodtraderError>;

    /// Recent announcement headlines for one symbol.
    fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, EodtraderError>;
}
