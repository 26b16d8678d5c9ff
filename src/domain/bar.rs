//! OHLCV bar: one immutable daily price/volume record for a symbol.

use chrono::NaiveDate;
use serde::Serialize;

/// A single end-of-day OHLCV observation for one symbol.
///
/// Immutable once ingested. Volume is `f64` because the provider reports
/// scaled floats. A-share codes carry the venue in the prefix, so there is
/// no separate exchange column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
