mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use common::{date, flat_bars, jump_bars, passing_snapshot_row, MockDataPort};
use eodtrader::adapters::cache::SnapshotCache;
use eodtrader::adapters::web::{build_router, AppState};
use eodtrader::domain::screening::ScreeningCriteria;

struct TestApp {
    router: axum::Router,
    cache: Arc<SnapshotCache>,
    _dir: TempDir,
}

fn make_app(port: MockDataPort) -> TestApp {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(SnapshotCache::new(dir.path().to_path_buf()));
    let state = AppState {
        data_port: Arc::new(port),
        cache: cache.clone(),
        criteria: Arc::new(ScreeningCriteria::default()),
        lookback_days: 365,
    };
    TestApp {
        router: build_router(state),
        cache,
        _dir: dir,
    }
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let app = make_app(MockDataPort::new());
    let (status, body) = get(app.router, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn stocks_without_cache_is_empty_failure() {
    let app = make_app(MockDataPort::new());
    let (status, body) = get(app.router, "/api/stocks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["stocks"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn stocks_returns_last_filtered_list() {
    let app = make_app(MockDataPort::new());
    app.cache
        .store_filtered(&[passing_snapshot_row("600519")])
        .unwrap();

    let (status, body) = get(app.router, "/api/stocks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let stocks = body["stocks"].as_array().unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0]["code"], "600519");
    assert_eq!(stocks[0]["pct_change"], 3.5);
}

#[tokio::test]
async fn backtest_happy_path_returns_full_payload() {
    let start = date(2024, 1, 1);
    let port = MockDataPort::new()
        .with_snapshot_row(passing_snapshot_row("600519"))
        .with_bars("600519", jump_bars("600519", start, 30, 21));
    let app = make_app(port);

    let (status, body) = post(
        app.router,
        "/api/backtest",
        json!({"initialCash": 100000.0, "forceRefreshData": false, "symbolLimit": 5}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["initialCash"], 100000.0);
    assert!(body["finalValue"].as_f64().unwrap() > 0.0);
    assert!(body["totalReturnPct"].is_number());
    assert_eq!(body["totalTrades"], 1);
    assert_eq!(body["winningTrades"], 1);
    assert_eq!(body["trades"].as_array().unwrap().len(), 2);
    assert_eq!(body["trades"][0]["side"], "buy");
    assert_eq!(body["equityCurve"].as_array().unwrap().len(), 30);
    assert!(body["perSymbolBars"]["600519"].is_array());
}

#[tokio::test]
async fn backtest_request_defaults_apply() {
    let port = MockDataPort::new();
    let app = make_app(port);

    let (status, body) = post(app.router, "/api/backtest", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "no symbols passed screening");
    assert_eq!(body["initialCash"], 100000.0);
}

#[tokio::test]
async fn backtest_rejects_non_positive_cash() {
    let app = make_app(MockDataPort::new());
    let (status, body) = post(
        app.router,
        "/api/backtest",
        json!({"initialCash": -5.0}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn absent_ratios_are_omitted_from_the_payload() {
    // History too short to trade: the run succeeds but Sharpe has no
    // value, so the key must be absent rather than zero.
    let start = date(2024, 1, 1);
    let port = MockDataPort::new()
        .with_snapshot_row(passing_snapshot_row("600519"))
        .with_bars("600519", flat_bars("600519", start, 10, 100.0));
    let app = make_app(port);

    let (status, body) = post(app.router, "/api/backtest", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["skippedSymbols"], 1);
    assert!(body.get("sharpeRatio").is_none());
    assert!(body.get("maxDrawdownPct").is_none());
}

#[tokio::test]
async fn analyze_returns_report() {
    let start = date(2024, 1, 1);
    let port = MockDataPort::new()
        .with_quote("600519", common::sample_quote())
        .with_bars("600519", jump_bars("600519", start, 60, 21));
    let app = make_app(port);

    let (status, body) = post(
        app.router,
        "/api/analyze",
        json!({"code": "600519", "name": "贵州茅台"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["report"]["code"], "600519");
    assert_eq!(body["report"]["valuation"], "undervalued");
    assert!(body["report"]["score"].is_number());
    assert!(body["report"]["technicals"]["macd_signal"].is_string());
}

#[tokio::test]
async fn analyze_requires_code() {
    let app = make_app(MockDataPort::new());
    let (status, _) = post(app.router, "/api/analyze", json!({"code": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_unknown_symbol_is_server_error() {
    let app = make_app(MockDataPort::new());
    let (status, body) = post(app.router, "/api/analyze", json!({"code": "999999"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("999999"));
}
