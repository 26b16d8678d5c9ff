//! HTTP request handlers for the JSON API.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::analysis::AnalysisReport;
use crate::domain::bar::OhlcvBar;
use crate::domain::portfolio::EquityPoint;
use crate::domain::position::TradeRecord;
use crate::domain::screening::SnapshotRow;
use crate::pipeline::{self, BacktestOptions, BacktestSummary};

use super::{ApiError, AppState};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacktestRequest {
    pub initial_cash: f64,
    pub force_refresh_data: bool,
    pub symbol_limit: usize,
}

impl Default for BacktestRequest {
    fn default() -> Self {
        BacktestRequest {
            initial_cash: 100_000.0,
            force_refresh_data: false,
            symbol_limit: 10,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResponse {
    pub success: bool,
    pub message: String,
    pub initial_cash: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_return_pct: Option<f64>,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub skipped_symbols: usize,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    pub per_symbol_bars: HashMap<String, Vec<OhlcvBar>>,
}

impl From<BacktestSummary> for BacktestResponse {
    fn from(summary: BacktestSummary) -> Self {
        BacktestResponse {
            success: summary.success,
            message: summary.message,
            initial_cash: summary.initial_cash,
            final_value: summary.final_value,
            total_return_pct: summary.metrics.total_return_pct,
            sharpe_ratio: summary.metrics.sharpe_ratio,
            max_drawdown_pct: summary.metrics.max_drawdown_pct,
            annual_return_pct: summary.metrics.annual_return_pct,
            total_trades: summary.metrics.total_trades,
            winning_trades: summary.metrics.winning_trades,
            losing_trades: summary.metrics.losing_trades,
            skipped_symbols: summary.skipped_symbols,
            trades: summary.trades,
            equity_curve: summary.equity_curve,
            per_symbol_bars: summary.symbol_bars,
        }
    }
}

pub async fn run_backtest(
    State(state): State<AppState>,
    Json(request): Json<BacktestRequest>,
) -> Result<Json<BacktestResponse>, ApiError> {
    if request.initial_cash <= 0.0 {
        return Err(ApiError::bad_request("initialCash must be positive"));
    }

    let today = chrono::Local::now().date_naive();
    let options = BacktestOptions {
        initial_cash: request.initial_cash,
        force_refresh: request.force_refresh_data,
        symbol_limit: request.symbol_limit,
        start: today - chrono::Duration::days(state.lookback_days),
        end: today,
    };

    let summary = tokio::task::spawn_blocking(move || {
        pipeline::run_backtest_pipeline(
            state.data_port.as_ref(),
            &state.cache,
            &state.criteria,
            &options,
        )
    })
    .await
    .map_err(|e| ApiError::internal(format!("backtest task failed: {}", e)))??;

    Ok(Json(summary.into()))
}

#[derive(Debug, Serialize)]
pub struct StocksResponse {
    pub success: bool,
    pub stocks: Vec<SnapshotRow>,
}

/// Filtered symbol list from the last screening pass, straight from the
/// cache; no provider round trip.
pub async fn stocks(State(state): State<AppState>) -> Result<Json<StocksResponse>, ApiError> {
    let rows = tokio::task::spawn_blocking(move || state.cache.load_filtered())
        .await
        .map_err(|e| ApiError::internal(format!("cache read failed: {}", e)))??;

    Ok(Json(match rows {
        Some(stocks) => StocksResponse {
            success: true,
            stocks,
        },
        None => StocksResponse {
            success: false,
            stocks: Vec::new(),
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub report: AnalysisReport,
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let code = request.code.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::bad_request("code is required"));
    }

    let as_of = chrono::Local::now().date_naive();
    let report = tokio::task::spawn_blocking(move || {
        pipeline::run_analysis(state.data_port.as_ref(), &code, &request.name, as_of)
    })
    .await
    .map_err(|e| ApiError::internal(format!("analysis task failed: {}", e)))??;

    Ok(Json(AnalyzeResponse {
        success: true,
        report,
    }))
}
