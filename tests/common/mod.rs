#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use eodtrader::domain::analysis::{NewsItem, Quote};
use eodtrader::domain::bar::OhlcvBar;
use eodtrader::domain::error::EodtraderError;
use eodtrader::domain::screening::SnapshotRow;
use eodtrader::ports::data_port::{Adjustment, MarketDataPort};

/// In-memory data provider. Date ranges are ignored so fixtures do not
/// depend on the wall clock.
#[derive(Default)]
pub struct MockDataPort {
    pub bars: HashMap<String, Vec<OhlcvBar>>,
    pub snapshot: Vec<SnapshotRow>,
    pub quotes: HashMap<String, Quote>,
    pub news: HashMap<String, Vec<NewsItem>>,
    pub bar_errors: HashMap<String, String>,
    pub snapshot_calls: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_snapshot_row(mut self, row: SnapshotRow) -> Self {
        self.snapshot.push(row);
        self
    }

    pub fn with_quote(mut self, symbol: &str, quote: Quote) -> Self {
        self.quotes.insert(symbol.to_string(), quote);
        self
    }

    pub fn with_news(mut self, symbol: &str, news: Vec<NewsItem>) -> Self {
        self.news.insert(symbol.to_string(), news);
        self
    }

    pub fn with_bar_error(mut self, symbol: &str, reason: &str) -> Self {
        self.bar_errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn snapshot_fetches(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
        _adjustment: Adjustment,
    ) -> Result<Vec<OhlcvBar>, EodtraderError> {
        if let Some(reason) = self.bar_errors.get(symbol) {
            return Err(EodtraderError::Provider {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.get(symbol).cloned().unwrap_or_default())
    }

    fn fetch_snapshot(&self) -> Result<Vec<SnapshotRow>, EodtraderError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot.clone())
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, EodtraderError> {
        Ok(self.quotes.get(symbol).cloned())
    }

    fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, EodtraderError> {
        Ok(self.news.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

/// Closes rising 0.5% per day with a single 3.5% jump on doubled volume at
/// `jump_index` — the one bar that satisfies the full entry rule.
pub fn jump_bars(symbol: &str, start: NaiveDate, len: usize, jump_index: usize) -> Vec<OhlcvBar> {
    let mut bars = Vec::with_capacity(len);
    let mut price = 100.0;
    for i in 0..len {
        if i > 0 {
            price *= if i == jump_index { 1.035 } else { 1.005 };
        }
        let volume = if i == jump_index { 2000.0 } else { 1000.0 };
        bars.push(make_bar(
            symbol,
            start + chrono::Duration::days(i as i64),
            price,
            volume,
        ));
    }
    bars
}

/// Constant price and volume: never aligns, never trades.
pub fn flat_bars(symbol: &str, start: NaiveDate, len: usize, price: f64) -> Vec<OhlcvBar> {
    (0..len)
        .map(|i| {
            make_bar(
                symbol,
                start + chrono::Duration::days(i as i64),
                price,
                1000.0,
            )
        })
        .collect()
}

pub fn passing_snapshot_row(code: &str) -> SnapshotRow {
    SnapshotRow {
        code: code.to_string(),
        name: format!("Stock {}", code),
        price: Some(25.0),
        pct_change: Some(3.5),
        turnover_pct: Some(6.0),
        volume_ratio: Some(1.8),
        market_cap_billions: Some(120.0),
    }
}

pub fn failing_snapshot_row(code: &str) -> SnapshotRow {
    SnapshotRow {
        code: code.to_string(),
        name: format!("Stock {}", code),
        price: Some(25.0),
        pct_change: Some(0.2),
        turnover_pct: Some(1.0),
        volume_ratio: Some(0.5),
        market_cap_billions: Some(500.0),
    }
}

pub fn sample_quote() -> Quote {
    Quote {
        price: 25.0,
        change_pct: 4.0,
        change: 0.96,
        volume: 9.0,
        amount: 2.5,
        turnover_pct: 6.0,
        pe: 15.0,
    }
}
