//! Backtest engine: multi-symbol lockstep replay of the moving-average /
//! volume entry rule with a fixed one-bar holding period.
//!
//! The engine advances one global timeline index at a time over the sorted
//! union of all symbols' dates. A symbol with no bar on a date is skipped
//! for that step; its last close still marks open positions for equity.
//! No evaluation happens before `ma_long` global steps have elapsed — the
//! counter is the run's, not the symbol's.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::error::EodtraderError;
use super::execution::{self, EntryResult, ExecutionConfig};
use super::indicator::calculate_sma;
use super::portfolio::Portfolio;
use super::position::TradeSide;
use super::series::SymbolSeries;

/// Entry-rule parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub ma_short: usize,
    pub ma_mid: usize,
    pub ma_long: usize,
    pub pct_min: f64,
    pub pct_max: f64,
    pub vol_ratio_min: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            ma_short: 5,
            ma_mid: 10,
            ma_long: 20,
            pct_min: 2.0,
            pct_max: 5.0,
            vol_ratio_min: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub execution: ExecutionConfig,
    pub strategy: StrategyParams,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 100_000.0,
            execution: ExecutionConfig::default(),
            strategy: StrategyParams::default(),
        }
    }
}

/// Per-symbol state machine: flat, or holding since a given bar index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolState {
    Flat,
    Holding { entry_bar_index: usize },
}

/// A transient buy/sell intent for one bar; consumed by the execution step
/// within the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderIntent {
    pub side: TradeSide,
    pub bar_index: usize,
}

/// Everything the rule needs to see for one symbol on one bar. Derived
/// values are `None` during warm-up or when the prior bar is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct BarContext {
    pub bar_index: usize,
    pub close: f64,
    pub volume: f64,
    pub prev_close: Option<f64>,
    pub prev_volume: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_mid: Option<f64>,
    pub ma_long: Option<f64>,
}

/// Pure rule evaluation: no portfolio access, no side effects.
///
/// Flat -> Holding when the moving averages align bullishly
/// (short > mid > long, all positive), the close is above the short
/// average, the day-over-day change sits inside the percent band, and
/// today's volume exceeds yesterday's. Holding -> Flat on the first bar
/// processed after the entry bar.
pub fn evaluate(
    state: SymbolState,
    ctx: &BarContext,
    params: &StrategyParams,
) -> (SymbolState, Option<OrderIntent>) {
    match state {
        SymbolState::Flat => {
            if entry_rule_holds(ctx, params) {
                (
                    SymbolState::Holding {
                        entry_bar_index: ctx.bar_index,
                    },
                    Some(OrderIntent {
                        side: TradeSide::Buy,
                        bar_index: ctx.bar_index,
                    }),
                )
            } else {
                (SymbolState::Flat, None)
            }
        }
        SymbolState::Holding { entry_bar_index } => {
            if ctx.bar_index > entry_bar_index {
                (
                    SymbolState::Flat,
                    Some(OrderIntent {
                        side: TradeSide::Sell,
                        bar_index: ctx.bar_index,
                    }),
                )
            } else {
                (state, None)
            }
        }
    }
}

fn entry_rule_holds(ctx: &BarContext, params: &StrategyParams) -> bool {
    let (Some(ma_short), Some(ma_mid), Some(ma_long)) = (ctx.ma_short, ctx.ma_mid, ctx.ma_long)
    else {
        return false;
    };
    if ma_short <= 0.0 || ma_mid <= 0.0 || ma_long <= 0.0 {
        return false;
    }

    let Some(prev_close) = ctx.prev_close.filter(|&c| c > 0.0) else {
        return false;
    };
    let Some(prev_volume) = ctx.prev_volume.filter(|&v| v > 0.0) else {
        return false;
    };

    let pct = (ctx.close - prev_close) / prev_close * 100.0;
    let vol_ratio = ctx.volume / prev_volume;

    ma_short > ma_mid
        && ma_mid > ma_long
        && ctx.close > ma_short
        && pct >= params.pct_min
        && pct <= params.pct_max
        && vol_ratio > params.vol_ratio_min
}

/// A symbol excluded before the run for lack of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub bars: usize,
}

#[derive(Debug)]
pub struct BacktestRun {
    pub portfolio: Portfolio,
    pub skipped: Vec<SkippedSymbol>,
    /// Per-symbol terminal states, in input order of the eligible symbols.
    pub final_states: Vec<(String, SymbolState)>,
}

/// Replay all series bar-by-bar in lockstep. The engine holds no state
/// across runs; everything lives in the returned [`BacktestRun`].
pub fn run_backtest(
    series: &[SymbolSeries],
    config: &BacktestConfig,
) -> Result<BacktestRun, EodtraderError> {
    let params = &config.strategy;
    let min_bars = params.ma_long + 1;

    let mut eligible: Vec<&SymbolSeries> = Vec::new();
    let mut skipped = Vec::new();
    for s in series {
        if s.bar_count() < min_bars {
            warn!(
                symbol = %s.symbol,
                bars = s.bar_count(),
                minimum = min_bars,
                "excluding symbol with insufficient history"
            );
            skipped.push(SkippedSymbol {
                symbol: s.symbol.clone(),
                bars: s.bar_count(),
            });
        } else {
            eligible.push(s);
        }
    }

    let mut portfolio = Portfolio::new(config.initial_cash);
    let mut states = vec![SymbolState::Flat; eligible.len()];
    let mut marks: HashMap<String, f64> = HashMap::new();

    let sma_short: Vec<Vec<Option<f64>>> = eligible
        .iter()
        .map(|s| calculate_sma(&s.bars, params.ma_short).simple_values())
        .collect();
    let sma_mid: Vec<Vec<Option<f64>>> = eligible
        .iter()
        .map(|s| calculate_sma(&s.bars, params.ma_mid).simple_values())
        .collect();
    let sma_long: Vec<Vec<Option<f64>>> = eligible
        .iter()
        .map(|s| calculate_sma(&s.bars, params.ma_long).simple_values())
        .collect();

    let timeline: Vec<chrono::NaiveDate> = eligible
        .iter()
        .flat_map(|s| s.bars.iter().map(|b| b.date))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    for (step, &date) in timeline.iter().enumerate() {
        for (si, s) in eligible.iter().enumerate() {
            let Some(i) = s.index_of(date) else {
                continue;
            };
            let bar = &s.bars[i];
            marks.insert(s.symbol.clone(), bar.close);

            // Global warm-up: the run's step counter gates evaluation, not
            // the symbol's own bar count.
            if step < params.ma_long {
                continue;
            }

            let ctx = BarContext {
                bar_index: i,
                close: bar.close,
                volume: bar.volume,
                prev_close: (i > 0).then(|| s.bars[i - 1].close),
                prev_volume: (i > 0).then(|| s.bars[i - 1].volume),
                ma_short: sma_short[si][i],
                ma_mid: sma_mid[si][i],
                ma_long: sma_long[si][i],
            };

            let (next_state, intent) = evaluate(states[si], &ctx, params);

            match intent.map(|o| o.side) {
                Some(TradeSide::Buy) => {
                    match execution::enter_position(
                        &mut portfolio,
                        &s.symbol,
                        bar.close,
                        date,
                        i,
                        &config.execution,
                    ) {
                        EntryResult::Entered { size, .. } => {
                            debug!(symbol = %s.symbol, %date, size, price = bar.close, "entered position");
                            states[si] = next_state;
                        }
                        EntryResult::InsufficientCash => {
                            debug!(symbol = %s.symbol, %date, "entry signal with insufficient cash");
                        }
                    }
                }
                Some(TradeSide::Sell) => {
                    let outcome = execution::exit_position(
                        &mut portfolio,
                        &s.symbol,
                        bar.close,
                        date,
                        &config.execution,
                    )?;
                    debug!(symbol = %s.symbol, %date, pnl = outcome.pnl, "closed position");
                    states[si] = next_state;
                }
                None => {
                    states[si] = next_state;
                }
            }
        }

        let equity = portfolio.total_equity(&marks);
        portfolio.record_equity(date, equity);
    }

    // Positions still open when the series end stay open, unrealized.
    let final_states = eligible
        .iter()
        .zip(states)
        .map(|(s, state)| (s.symbol.clone(), state))
        .collect();

    Ok(BacktestRun {
        portfolio,
        skipped,
        final_states,
    })
}
