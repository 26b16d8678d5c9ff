//! Screening, backtest, and analysis orchestration shared by the CLI and
//! the web service. Each call builds its own engine state; nothing here is
//! retained between runs.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::adapters::cache::SnapshotCache;
use crate::domain::analysis::{build_report, technical_snapshot, AnalysisReport};
use crate::domain::bar::OhlcvBar;
use crate::domain::engine::{run_backtest, BacktestConfig};
use crate::domain::error::EodtraderError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::{EquityPoint, Portfolio};
use crate::domain::position::TradeRecord;
use crate::domain::screening::{screen, ScreeningCriteria, ScreeningOutcome};
use crate::domain::series::SymbolSeries;
use crate::ports::data_port::{Adjustment, MarketDataPort};

pub struct ScreeningRun {
    pub outcome: ScreeningOutcome,
    pub from_cache: bool,
}

/// Read-through screening pass: use the cached snapshot unless
/// `force_refresh` is set or no cache exists, then filter and persist both
/// the raw snapshot and the surviving rows.
pub fn run_screening(
    port: &dyn MarketDataPort,
    cache: &SnapshotCache,
    criteria: &ScreeningCriteria,
    force_refresh: bool,
) -> Result<ScreeningRun, EodtraderError> {
    let cached = if force_refresh {
        None
    } else {
        cache.load_snapshot()?.filter(|rows| !rows.is_empty())
    };

    let from_cache = cached.is_some();
    let rows = match cached {
        Some(rows) => rows,
        None => {
            let rows = port.fetch_snapshot()?;
            cache.store_snapshot(&rows)?;
            rows
        }
    };

    let outcome = screen(&rows, criteria);
    info!(
        scanned = outcome.scanned,
        pct_change = outcome.counts.pct_change,
        turnover = outcome.counts.turnover,
        volume_ratio = outcome.counts.volume_ratio,
        market_cap = outcome.counts.market_cap,
        passed = outcome.passed.len(),
        from_cache,
        "screening pass complete"
    );

    cache.store_filtered(&outcome.passed)?;

    Ok(ScreeningRun { outcome, from_cache })
}

#[derive(Debug, Clone)]
pub struct BacktestOptions {
    pub initial_cash: f64,
    pub force_refresh: bool,
    pub symbol_limit: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug)]
pub struct BacktestSummary {
    pub success: bool,
    pub message: String,
    pub initial_cash: f64,
    pub final_value: f64,
    pub metrics: Metrics,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub symbol_bars: HashMap<String, Vec<OhlcvBar>>,
    pub skipped_symbols: usize,
}

impl BacktestSummary {
    fn empty(initial_cash: f64, message: String) -> Self {
        let portfolio = Portfolio::new(initial_cash);
        BacktestSummary {
            success: false,
            message,
            initial_cash,
            final_value: initial_cash,
            metrics: Metrics::compute(&portfolio),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            symbol_bars: HashMap::new(),
            skipped_symbols: 0,
        }
    }
}

/// Full screening-to-analytics pipeline. Provider failures drop the
/// affected symbol and are surfaced as counts; an empty screening result
/// is a well-formed `success = false` summary, not an error.
pub fn run_backtest_pipeline(
    port: &dyn MarketDataPort,
    cache: &SnapshotCache,
    criteria: &ScreeningCriteria,
    options: &BacktestOptions,
) -> Result<BacktestSummary, EodtraderError> {
    let screening = run_screening(port, cache, criteria, options.force_refresh)?;

    if screening.outcome.passed.is_empty() {
        return Ok(BacktestSummary::empty(
            options.initial_cash,
            "no symbols passed screening".to_string(),
        ));
    }

    let candidates: Vec<String> = screening
        .outcome
        .passed
        .iter()
        .take(options.symbol_limit)
        .map(|row| row.code.clone())
        .collect();

    info!(
        candidates = candidates.len(),
        start = %options.start,
        end = %options.end,
        "fetching history for screened symbols"
    );

    let mut series = Vec::with_capacity(candidates.len());
    let mut symbol_bars = HashMap::new();
    let mut unavailable = 0usize;

    for code in &candidates {
        let bars = match port.fetch_bars(code, options.start, options.end, Adjustment::Forward) {
            Ok(bars) => bars,
            Err(e) => {
                warn!(symbol = %code, error = %e, "dropping symbol after provider failure");
                unavailable += 1;
                continue;
            }
        };
        if bars.is_empty() {
            warn!(symbol = %code, "dropping symbol with no history");
            unavailable += 1;
            continue;
        }

        symbol_bars.insert(code.clone(), bars.clone());
        series.push(SymbolSeries::new(code.clone(), bars));
    }

    if series.is_empty() {
        return Ok(BacktestSummary::empty(
            options.initial_cash,
            format!(
                "no history could be loaded for any of {} screened symbols",
                candidates.len()
            ),
        ));
    }

    let config = BacktestConfig {
        initial_cash: options.initial_cash,
        ..BacktestConfig::default()
    };
    let run = run_backtest(&series, &config)?;
    let metrics = Metrics::compute(&run.portfolio);

    let final_value = run
        .portfolio
        .equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(options.initial_cash);

    let skipped_symbols = unavailable + run.skipped.len();
    let message = format!(
        "backtest complete: {} symbols loaded, {} unavailable, {} below minimum history",
        series.len(),
        unavailable,
        run.skipped.len(),
    );
    info!(
        final_value,
        total_return_pct = metrics.total_return_pct,
        trades = metrics.total_trades,
        "{}",
        message
    );

    Ok(BacktestSummary {
        success: true,
        message,
        initial_cash: options.initial_cash,
        final_value,
        metrics,
        trades: run.portfolio.trades,
        equity_curve: run.portfolio.equity_curve,
        symbol_bars,
        skipped_symbols,
    })
}

/// Days of daily history pulled for the technical snapshot.
const ANALYSIS_LOOKBACK_DAYS: i64 = 180;

/// Quote + news + indicator snapshot for one symbol. News and history
/// failures degrade to partial reports; a missing quote is fatal since
/// every classification hangs off it.
pub fn run_analysis(
    port: &dyn MarketDataPort,
    code: &str,
    name: &str,
    as_of: NaiveDate,
) -> Result<AnalysisReport, EodtraderError> {
    let quote = port
        .fetch_quote(code)?
        .ok_or_else(|| EodtraderError::Provider {
            reason: format!("no quote data for {}", code),
        })?;

    let news = match port.fetch_news(code) {
        Ok(news) => news,
        Err(e) => {
            warn!(symbol = %code, error = %e, "news fetch failed, continuing without");
            Vec::new()
        }
    };

    let start = as_of - Duration::days(ANALYSIS_LOOKBACK_DAYS);
    let technicals = match port.fetch_bars(code, start, as_of, Adjustment::Forward) {
        Ok(bars) => {
            let series = SymbolSeries::new(code.to_string(), bars);
            technical_snapshot(&series.bars)
        }
        Err(e) => {
            warn!(symbol = %code, error = %e, "history fetch failed, skipping technicals");
            None
        }
    };

    Ok(build_report(code, name, quote, news, technicals))
}
