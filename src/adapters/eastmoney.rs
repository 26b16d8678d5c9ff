//! Eastmoney-compatible HTTP market data adapter.
//!
//! Three endpoint families: kline history (push2his), spot snapshot/quote
//! (push2), and the announcement feed. Requests are retried with bounded
//! exponential backoff; payload parsing lives in pure functions over the
//! response text so it can be tested without a network.

use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

use crate::domain::analysis::{NewsItem, Quote};
use crate::domain::bar::OhlcvBar;
use crate::domain::error::EodtraderError;
use crate::domain::screening::SnapshotRow;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{Adjustment, MarketDataPort};

const DEFAULT_HIST_BASE: &str = "https://push2his.eastmoney.com";
const DEFAULT_QUOTE_BASE: &str = "https://push2.eastmoney.com";
const DEFAULT_NEWS_BASE: &str = "https://np-anotice-stock.eastmoney.com";
const DEFAULT_MAX_RETRIES: usize = 3;

pub struct EastmoneyAdapter {
    client: reqwest::blocking::Client,
    hist_base: String,
    quote_base: String,
    news_base: String,
    max_retries: usize,
}

impl EastmoneyAdapter {
    pub fn new() -> Result<Self, EodtraderError> {
        Self::with_bases(
            DEFAULT_HIST_BASE.to_string(),
            DEFAULT_QUOTE_BASE.to_string(),
            DEFAULT_NEWS_BASE.to_string(),
            DEFAULT_MAX_RETRIES,
        )
    }

    pub fn with_bases(
        hist_base: String,
        quote_base: String,
        news_base: String,
        max_retries: usize,
    ) -> Result<Self, EodtraderError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EodtraderError::Provider {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            hist_base,
            quote_base,
            news_base,
            max_retries,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EodtraderError> {
        Self::with_bases(
            config
                .get_string("provider", "hist_base")
                .unwrap_or_else(|| DEFAULT_HIST_BASE.to_string()),
            config
                .get_string("provider", "quote_base")
                .unwrap_or_else(|| DEFAULT_QUOTE_BASE.to_string()),
            config
                .get_string("provider", "news_base")
                .unwrap_or_else(|| DEFAULT_NEWS_BASE.to_string()),
            config.get_usize("provider", "max_retries", DEFAULT_MAX_RETRIES),
        )
    }

    fn get_text(&self, url: &str) -> Result<String, EodtraderError> {
        let fetch = || {
            let response =
                self.client
                    .get(url)
                    .send()
                    .map_err(|e| EodtraderError::Provider {
                        reason: e.to_string(),
                    })?;
            let response = response
                .error_for_status()
                .map_err(|e| EodtraderError::Provider {
                    reason: e.to_string(),
                })?;
            response.text().map_err(|e| EodtraderError::Provider {
                reason: e.to_string(),
            })
        };

        fetch
            .retry(ExponentialBuilder::default().with_max_times(self.max_retries))
            .notify(|err: &EodtraderError, dur: Duration| {
                warn!(error = %err, backoff_ms = dur.as_millis() as u64, "provider request failed, retrying");
            })
            .call()
    }
}

impl MarketDataPort for EastmoneyAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        adjustment: Adjustment,
    ) -> Result<Vec<OhlcvBar>, EodtraderError> {
        let fqt = match adjustment {
            Adjustment::None => 0,
            Adjustment::Forward => 1,
        };
        let url = format!(
            "{}/api/qt/stock/kline/get?secid={}&klt=101&fqt={}&beg={}&end={}&fields1=f1,f2,f3&fields2=f51,f52,f53,f54,f55,f56",
            self.hist_base,
            secid(symbol),
            fqt,
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        );
        let body = self.get_text(&url)?;
        parse_kline_payload(&body, symbol)
    }

    fn fetch_snapshot(&self) -> Result<Vec<SnapshotRow>, EodtraderError> {
        let url = format!(
            "{}/api/qt/clist/get?pn=1&pz=10000&po=1&np=1&fltt=2&fid=f3&fs=m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23&fields=f2,f3,f8,f10,f12,f14,f20",
            self.quote_base,
        );
        let body = self.get_text(&url)?;
        parse_snapshot_payload(&body)
    }

    fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>, EodtraderError> {
        let url = format!(
            "{}/api/qt/stock/get?secid={}&fields=f43,f46,f47,f50,f51,f169,f170",
            self.quote_base,
            secid(symbol),
        );
        let body = self.get_text(&url)?;
        parse_quote_payload(&body)
    }

    fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, EodtraderError> {
        let url = format!(
            "{}/api/security/ann?page=true&pageSize=10&stock={}",
            self.news_base, symbol,
        );
        let body = self.get_text(&url)?;
        parse_news_payload(&body)
    }
}

/// Eastmoney security id: Shanghai codes (6xx...) live on market 1,
/// everything else on market 0.
pub fn secid(symbol: &str) -> String {
    if symbol.starts_with('6') {
        format!("1.{}", symbol)
    } else {
        format!("0.{}", symbol)
    }
}

fn parse_root(text: &str) -> Result<Value, EodtraderError> {
    serde_json::from_str(text).map_err(|e| EodtraderError::Payload {
        reason: e.to_string(),
    })
}

/// Numeric field that may arrive as a number or a string; "-" and other
/// non-numeric strings map to `None`.
fn num(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Kline payload: `data.klines` is a list of comma-joined strings in the
/// order date,open,close,high,low,volume. An absent `data` object means
/// the symbol is unknown and yields an empty series.
pub fn parse_kline_payload(text: &str, symbol: &str) -> Result<Vec<OhlcvBar>, EodtraderError> {
    let root = parse_root(text)?;
    let Some(data) = root.get("data").filter(|d| !d.is_null()) else {
        return Ok(Vec::new());
    };
    let Some(klines) = data.get("klines").and_then(|k| k.as_array()) else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(klines.len());
    for line in klines {
        let line = line.as_str().ok_or_else(|| EodtraderError::Payload {
            reason: "kline entry is not a string".into(),
        })?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 6 {
            return Err(EodtraderError::Payload {
                reason: format!("kline entry has {} fields, expected 6", fields.len()),
            });
        }

        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d").map_err(|e| {
            EodtraderError::Payload {
                reason: format!("invalid kline date {}: {}", fields[0], e),
            }
        })?;
        let parse = |i: usize, name: &str| -> Result<f64, EodtraderError> {
            fields[i].parse().map_err(|_| EodtraderError::Payload {
                reason: format!("invalid kline {} value: {}", name, fields[i]),
            })
        };

        bars.push(OhlcvBar {
            symbol: symbol.to_string(),
            date,
            open: parse(1, "open")?,
            close: parse(2, "close")?,
            high: parse(3, "high")?,
            low: parse(4, "low")?,
            volume: parse(5, "volume")?,
        });
    }

    Ok(bars)
}

/// Snapshot payload: `data.diff` rows keyed f2 price, f3 pct change,
/// f8 turnover, f10 volume ratio, f12 code, f14 name, f20 market cap in
/// yuan. Unparseable numerics become `None`; rows without a code are
/// dropped.
pub fn parse_snapshot_payload(text: &str) -> Result<Vec<SnapshotRow>, EodtraderError> {
    let root = parse_root(text)?;
    let Some(diff) = root
        .get("data")
        .and_then(|d| d.get("diff"))
        .and_then(|d| d.as_array())
    else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::with_capacity(diff.len());
    for entry in diff {
        let Some(code) = entry.get("f12").and_then(|c| c.as_str()) else {
            continue;
        };
        let name = entry
            .get("f14")
            .and_then(|n| n.as_str())
            .unwrap_or_default();

        rows.push(SnapshotRow {
            code: code.to_string(),
            name: name.to_string(),
            price: num(entry.get("f2")),
            pct_change: num(entry.get("f3")),
            turnover_pct: num(entry.get("f8")),
            volume_ratio: num(entry.get("f10")),
            // yuan -> hundred-million units, the scale the criteria use
            market_cap_billions: num(entry.get("f20")).map(|v| v / 1e8),
        });
    }

    Ok(rows)
}

/// Quote payload: scaled integer fields under `data`. `data: null` means
/// the symbol is unknown. Missing fields default to zero, matching the
/// provider's sparse responses for suspended stocks.
pub fn parse_quote_payload(text: &str) -> Result<Option<Quote>, EodtraderError> {
    let root = parse_root(text)?;
    let Some(data) = root.get("data").filter(|d| !d.is_null()) else {
        return Ok(None);
    };

    let field = |key: &str, scale: f64| num(data.get(key)).map(|v| v / scale).unwrap_or(0.0);

    Ok(Some(Quote {
        price: field("f43", 100.0),
        change_pct: field("f169", 100.0),
        change: field("f170", 100.0),
        volume: field("f46", 10_000.0),
        amount: field("f47", 1e8),
        turnover_pct: field("f50", 100.0),
        pe: field("f51", 100.0),
    }))
}

/// Announcement payload: `data.data` entries with `title` and `showtime`.
pub fn parse_news_payload(text: &str) -> Result<Vec<NewsItem>, EodtraderError> {
    let root = parse_root(text)?;
    let Some(items) = root
        .get("data")
        .and_then(|d| d.get("data"))
        .and_then(|d| d.as_array())
    else {
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let title = item.get("title").and_then(|t| t.as_str())?;
            let date = item
                .get("showtime")
                .and_then(|t| t.as_str())
                .unwrap_or_default();
            Some(NewsItem {
                title: title.to_string(),
                date: date.to_string(),
            })
        })
        .collect())
}
