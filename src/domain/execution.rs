//! Order execution against the simulated cash account.
//!
//! Fills happen at the same bar's close: whole-share sizing from a
//! percent-of-cash budget, proportional commission on both sides. A sell
//! with no open position is a programming error and must abort the run
//! rather than corrupt the ledger.

use chrono::NaiveDate;

use super::error::EodtraderError;
use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position, TradeRecord, TradeSide};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Percent of current cash committed per entry.
    pub sizing_pct: f64,
    /// Commission as percent of notional, charged on entry and exit.
    pub commission_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            sizing_pct: 95.0,
            commission_pct: 0.1,
        }
    }
}

pub fn calculate_commission(notional: f64, config: &ExecutionConfig) -> f64 {
    notional * config.commission_pct / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        size: i64,
        cost: f64,
        commission: f64,
    },
    InsufficientCash,
}

/// Open a position at `price`, sized to `sizing_pct` of current cash in
/// whole shares. Cash is debited cost plus commission.
pub fn enter_position(
    portfolio: &mut Portfolio,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    bar_index: usize,
    config: &ExecutionConfig,
) -> EntryResult {
    if price <= 0.0 {
        return EntryResult::InsufficientCash;
    }

    let budget = portfolio.cash * config.sizing_pct / 100.0;
    let size = (budget / price).floor() as i64;
    if size == 0 {
        return EntryResult::InsufficientCash;
    }

    let cost = size as f64 * price;
    let commission = calculate_commission(cost, config);
    if cost + commission > portfolio.cash {
        return EntryResult::InsufficientCash;
    }

    portfolio.cash -= cost + commission;
    portfolio.add_position(Position {
        symbol: symbol.to_string(),
        size,
        entry_price: price,
        entry_commission: commission,
        entry_bar_index: bar_index,
        entry_date: date,
    });
    portfolio.record_trade(TradeRecord {
        date,
        symbol: symbol.to_string(),
        side: TradeSide::Buy,
        price,
        size,
    });

    EntryResult::Entered {
        size,
        cost,
        commission,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitOutcome {
    pub size: i64,
    pub proceeds: f64,
    pub commission: f64,
    pub pnl: f64,
}

/// Close the position for `symbol` at `price`. Cash is credited proceeds
/// minus commission; the round trip is appended to the closed-trade log.
pub fn exit_position(
    portfolio: &mut Portfolio,
    symbol: &str,
    price: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> Result<ExitOutcome, EodtraderError> {
    let position = portfolio
        .remove_position(symbol)
        .ok_or_else(|| EodtraderError::Engine {
            reason: format!("sell emitted for {} with no open position", symbol),
        })?;

    let proceeds = position.size as f64 * price;
    let commission = calculate_commission(proceeds, config);
    portfolio.cash += proceeds - commission;

    let pnl = position.size as f64 * (price - position.entry_price)
        - position.entry_commission
        - commission;

    portfolio.record_trade(TradeRecord {
        date,
        symbol: symbol.to_string(),
        side: TradeSide::Sell,
        price,
        size: position.size,
    });
    portfolio.record_round_trip(ClosedTrade {
        symbol: position.symbol,
        size: position.size,
        entry_price: position.entry_price,
        exit_price: price,
        entry_date: position.entry_date,
        exit_date: date,
        pnl,
    });

    Ok(ExitOutcome {
        size: position.size,
        proceeds,
        commission,
        pnl,
    })
}
