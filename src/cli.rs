//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Duration;
use clap::{Parser, Subcommand};
use tracing::error;

use crate::adapters::cache::SnapshotCache;
use crate::adapters::eastmoney::EastmoneyAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::web::{build_router, AppState};
use crate::domain::error::EodtraderError;
use crate::domain::screening::ScreeningCriteria;
use crate::pipeline::{self, BacktestOptions};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "eodtrader", about = "End-of-day stock screener and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the end-of-day screening filter and persist the results
    Screen {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        force_refresh: bool,
    },
    /// Screen, fetch history, and replay the strategy
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        initial_cash: Option<f64>,
        #[arg(long)]
        symbol_limit: Option<usize>,
        #[arg(long)]
        force_refresh: bool,
    },
    /// Qualitative analysis of a single symbol
    Analyze {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the JSON web service
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        listen: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            force_refresh,
        } => run_screen(config.as_ref(), force_refresh),
        Command::Backtest {
            config,
            initial_cash,
            symbol_limit,
            force_refresh,
        } => run_backtest(config.as_ref(), initial_cash, symbol_limit, force_refresh),
        Command::Analyze { code, name, config } => {
            run_analyze(&code, name.as_deref().unwrap_or(""), config.as_ref())
        }
        Command::Serve { config, listen } => run_serve(config.as_ref(), listen.as_deref()),
    }
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EodtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        error!("{err}");
        ExitCode::from(&err)
    })
}

fn load_optional_config(path: Option<&PathBuf>) -> Result<Option<FileConfigAdapter>, ExitCode> {
    match path {
        Some(p) => load_config(p).map(Some),
        None => Ok(None),
    }
}

fn build_components(
    config: Option<&FileConfigAdapter>,
) -> Result<(EastmoneyAdapter, SnapshotCache), EodtraderError> {
    let provider = match config {
        Some(c) => EastmoneyAdapter::from_config(c)?,
        None => EastmoneyAdapter::new()?,
    };

    let data_dir = config
        .and_then(|c| c.get_string("cache", "data_dir"))
        .unwrap_or_else(|| "data".to_string());
    let cache = SnapshotCache::new(PathBuf::from(data_dir));

    Ok((provider, cache))
}

fn fail(err: &EodtraderError) -> ExitCode {
    error!("{err}");
    err.into()
}

fn run_screen(config_path: Option<&PathBuf>, force_refresh: bool) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (provider, cache) = match build_components(config.as_ref()) {
        Ok(parts) => parts,
        Err(e) => return fail(&e),
    };

    let criteria = ScreeningCriteria::default();
    let run = match pipeline::run_screening(&provider, &cache, &criteria, force_refresh) {
        Ok(run) => run,
        Err(e) => return fail(&e),
    };

    let counts = run.outcome.counts;
    eprintln!(
        "Scanned {} symbols ({}):",
        run.outcome.scanned,
        if run.from_cache { "cached" } else { "fresh" },
    );
    eprintln!("  pct change {:.1}-{:.1}%: {}", criteria.pct_change_min, criteria.pct_change_max, counts.pct_change);
    eprintln!("  turnover {:.1}-{:.1}%:   {}", criteria.turnover_min, criteria.turnover_max, counts.turnover);
    eprintln!("  volume ratio > {:.1}:  {}", criteria.volume_ratio_min, counts.volume_ratio);
    eprintln!("  market cap {:.0}-{:.0}:  {}", criteria.market_cap_min_billions, criteria.market_cap_max_billions, counts.market_cap);
    eprintln!();

    if run.outcome.passed.is_empty() {
        eprintln!("No symbols passed all four predicates");
        return ExitCode::SUCCESS;
    }

    println!("{:<8} {:<12} {:>8} {:>8} {:>8} {:>8}", "code", "name", "pct%", "turn%", "vr", "cap");
    for row in &run.outcome.passed {
        let fmt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into());
        println!(
            "{:<8} {:<12} {:>8} {:>8} {:>8} {:>8}",
            row.code,
            row.name,
            fmt(row.pct_change),
            fmt(row.turnover_pct),
            fmt(row.volume_ratio),
            fmt(row.market_cap_billions),
        );
    }
    eprintln!("\n{} symbols passed, written to {}", run.outcome.passed.len(), cache.data_dir().display());

    ExitCode::SUCCESS
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    initial_cash: Option<f64>,
    symbol_limit: Option<usize>,
    force_refresh: bool,
) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (provider, cache) = match build_components(config.as_ref()) {
        Ok(parts) => parts,
        Err(e) => return fail(&e),
    };

    let config_ref = config.as_ref().map(|c| c as &dyn ConfigPort);
    let initial_cash = initial_cash
        .or_else(|| config_ref.map(|c| c.get_double("backtest", "initial_cash", 100_000.0)))
        .unwrap_or(100_000.0);
    let symbol_limit = symbol_limit
        .or_else(|| config_ref.map(|c| c.get_usize("backtest", "symbol_limit", 10)))
        .unwrap_or(10);
    let lookback_days = config_ref
        .map(|c| c.get_int("backtest", "lookback_days", 365))
        .unwrap_or(365);

    let today = chrono::Local::now().date_naive();
    let options = BacktestOptions {
        initial_cash,
        force_refresh,
        symbol_limit,
        start: today - Duration::days(lookback_days),
        end: today,
    };

    let criteria = ScreeningCriteria::default();
    let summary =
        match pipeline::run_backtest_pipeline(&provider, &cache, &criteria, &options) {
            Ok(summary) => summary,
            Err(e) => return fail(&e),
        };

    eprintln!("{}", summary.message);
    if !summary.success {
        return ExitCode::SUCCESS;
    }

    let opt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "n/a".into());
    println!("Initial cash:     {:.2}", summary.initial_cash);
    println!("Final value:      {:.2}", summary.final_value);
    println!("Total return:     {:.2}%", summary.metrics.total_return_pct);
    println!("Annualized:       {}%", opt(summary.metrics.annual_return_pct));
    println!("Sharpe ratio:     {}", opt(summary.metrics.sharpe_ratio));
    println!("Max drawdown:     {}%", opt(summary.metrics.max_drawdown_pct));
    println!("Round trips:      {}", summary.metrics.total_trades);
    println!("  won:            {}", summary.metrics.winning_trades);
    println!("  lost:           {}", summary.metrics.losing_trades);
    println!("Skipped symbols:  {}", summary.skipped_symbols);

    if !summary.trades.is_empty() {
        println!("\nTrades:");
        for trade in &summary.trades {
            println!(
                "  {} {:>4?} {:<8} {:>10.2} x {}",
                trade.date, trade.side, trade.symbol, trade.price, trade.size,
            );
        }
    }

    ExitCode::SUCCESS
}

fn run_analyze(code: &str, name: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(exit) => return exit,
    };
    let (provider, _cache) = match build_components(config.as_ref()) {
        Ok(parts) => parts,
        Err(e) => return fail(&e),
    };

    let as_of = chrono::Local::now().date_naive();
    let report = match pipeline::run_analysis(&provider, code, name, as_of) {
        Ok(report) => report,
        Err(e) => return fail(&e),
    };

    println!("=== {} {} ===", report.code, report.name);
    println!("Price:       {:.2} ({:+.2}%)", report.quote.price, report.quote.change_pct);
    println!("Turnover:    {:.2}%", report.quote.turnover_pct);
    println!("PE (TTM):    {}", if report.quote.pe > 0.0 { format!("{:.2}", report.quote.pe) } else { "loss".into() });
    println!("Valuation:   {}", report.valuation);
    println!("Liquidity:   {}", report.liquidity);
    println!("Trend:       {}", report.trend);
    println!("Momentum:    {}", report.momentum);
    println!("Sentiment:   {}", report.market_sentiment);
    println!("Capital:     {}", report.capital_flow);
    println!("News:        {}", report.news_sentiment);

    if let Some(tech) = &report.technicals {
        println!("MACD:        {}", tech.macd_signal.as_str());
        if let Some(rsi) = tech.rsi {
            println!("RSI(14):     {:.1} ({})", rsi, tech.rsi_signal.as_str());
        }
        if let Some(bias) = tech.bias_pct {
            println!("Bias(20):    {:+.2}%", bias);
        }
    }

    for headline in report.headlines.iter().take(3) {
        println!("  {} {}", headline.date, headline.title);
    }

    println!("Score:       {}/100", report.score);
    println!("Rating:      {}", report.recommendation);

    ExitCode::SUCCESS
}

fn run_serve(config_path: Option<&PathBuf>, listen: Option<&str>) -> ExitCode {
    let config = match load_optional_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (provider, cache) = match build_components(config.as_ref()) {
        Ok(parts) => parts,
        Err(e) => return fail(&e),
    };

    let addr: std::net::SocketAddr = listen
        .map(str::to_string)
        .or_else(|| config.as_ref().and_then(|c| c.get_string("web", "listen")))
        .unwrap_or_else(|| "127.0.0.1:8000".to_string())
        .parse()
        .unwrap_or_else(|_| "127.0.0.1:8000".parse().expect("default listen address"));

    let lookback_days = config
        .as_ref()
        .map(|c| c.get_int("backtest", "lookback_days", 365))
        .unwrap_or(365);

    let state = AppState {
        data_port: Arc::new(provider),
        cache: Arc::new(cache),
        criteria: Arc::new(ScreeningCriteria::default()),
        lookback_days,
    };
    let router = build_router(state);

    tracing::info!(%addr, "starting web service");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => return fail(&EodtraderError::Io(e)),
    };

    let served = runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    });

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&EodtraderError::Io(e)),
    }
}
