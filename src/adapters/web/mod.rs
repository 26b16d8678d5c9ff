//! JSON web service adapter.
//!
//! Stateless request/response wrapper over the screening, backtest, and
//! analysis pipelines. Handlers push the blocking pipelines onto the
//! blocking pool so a long backtest never stalls unrelated requests; every
//! request gets its own engine state.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adapters::cache::SnapshotCache;
use crate::domain::screening::ScreeningCriteria;
use crate::ports::data_port::MarketDataPort;

#[derive(Clone)]
pub struct AppState {
    pub data_port: Arc<dyn MarketDataPort + Send + Sync>,
    pub cache: Arc<SnapshotCache>,
    pub criteria: Arc<ScreeningCriteria>,
    /// Calendar days of history fetched per backtested symbol.
    pub lookback_days: i64,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/backtest", post(handlers::run_backtest))
        .route("/api/stocks", get(handlers::stocks))
        .route("/api/analyze", post(handlers::analyze))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
