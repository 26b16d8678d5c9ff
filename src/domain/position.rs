//! Position state and trade records.

use chrono::NaiveDate;
use serde::Serialize;

/// Per-symbol holding inside one backtest run. Owned exclusively by the
/// portfolio; removal via the execution step is the only mutation path.
#[derive(Debug, Clone)]
pub struct Position {
    pub symbol: String,
    pub size: i64,
    pub entry_price: f64,
    pub entry_commission: f64,
    pub entry_bar_index: usize,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.size as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.size as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Append-only ledger entry, one per executed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: TradeSide,
    pub price: f64,
    pub size: i64,
}

/// One completed buy/sell round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub size: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Net of entry and exit commissions.
    pub pnl: f64,
}

impl ClosedTrade {
    /// Win/loss is judged on raw prices, not net-of-fee pnl.
    pub fn is_win(&self) -> bool {
        self.exit_price > self.entry_price
    }
}
