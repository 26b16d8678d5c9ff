//! Performance analytics over the equity curve and closed-trade ledger.
//!
//! Derived purely from the run's outputs — nothing here re-reads raw bars.
//! Ratios that cannot be computed are reported as absent, never as zero.

use serde::Serialize;

use super::portfolio::{EquityPoint, Portfolio};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub annual_return_pct: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown_pct: Option<f64>,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio) -> Self {
        let equity_curve = &portfolio.equity_curve;
        let initial_cash = portfolio.initial_cash;

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_cash);

        let total_return_pct = if initial_cash > 0.0 {
            (final_equity - initial_cash) / initial_cash * 100.0
        } else {
            0.0
        };

        let trading_days = equity_curve.len() as f64;
        let annual_return_pct = if trading_days > 0.0 && total_return_pct.is_finite() {
            let growth = 1.0 + total_return_pct / 100.0;
            Some((growth.powf(TRADING_DAYS_PER_YEAR / trading_days) - 1.0) * 100.0)
        } else {
            None
        };

        let max_drawdown_pct = compute_max_drawdown(equity_curve);
        let sharpe_ratio = compute_sharpe(equity_curve);

        let mut winning_trades = 0;
        let mut losing_trades = 0;
        for trade in &portfolio.closed_trades {
            if trade.is_win() {
                winning_trades += 1;
            } else {
                losing_trades += 1;
            }
        }

        Metrics {
            total_return_pct,
            annual_return_pct,
            sharpe_ratio,
            max_drawdown_pct,
            total_trades: portfolio.closed_trades.len(),
            winning_trades,
            losing_trades,
        }
    }
}

/// Largest peak-to-trough decline, as a positive percentage. Absent when
/// the curve is empty.
fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> Option<f64> {
    let first = equity_curve.first()?;

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    Some(max_dd * 100.0)
}

/// Annualized Sharpe ratio over daily equity returns (zero risk-free
/// rate). Absent below two returns or at zero variance.
fn compute_sharpe(equity_curve: &[EquityPoint]) -> Option<f64> {
    if equity_curve.len() < 3 {
        return None;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].equity;
            (prev > 0.0).then(|| (w[1].equity - prev) / prev)
        })
        .collect();

    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        Some(mean / stddev * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        None
    }
}
