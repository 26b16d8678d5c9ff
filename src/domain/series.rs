//! Per-symbol bar series and the unified timeline.

use crate::domain::bar::OhlcvBar;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// An ordered, gap-tolerant bar sequence for one symbol.
/// Invariant: strictly increasing dates, no duplicates — the constructor
/// sorts the input and keeps the first bar per date.
#[derive(Debug, Clone)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<OhlcvBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl SymbolSeries {
    pub fn new(symbol: String, mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);

        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        Self {
            symbol,
            bars,
            date_index,
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn bar_at(&self, date: NaiveDate) -> Option<&OhlcvBar> {
        self.index_of(date).map(|i| &self.bars[i])
    }
}

/// Sorted union of all dates across the given series.
pub fn build_timeline(series: &[SymbolSeries]) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.bars.iter().map(|b| b.date))
        .collect();
    dates.into_iter().collect()
}
