//! Qualitative single-symbol analysis: threshold classification of a
//! realtime quote, keyword sentiment over announcement headlines, and a
//! composite 0-100 score with a recommendation label.

use serde::Serialize;

use super::bar::OhlcvBar;
use super::indicator::{
    band_position, calculate_bias, calculate_macd_default, calculate_rsi, calculate_volume_ratio,
    IndicatorValue,
};
use super::signal::{classify_macd, classify_rsi, MacdSignal, RsiSignal};

/// Realtime quote fields as the provider reports them. Volume is in units
/// of ten thousand shares, amount in hundreds of millions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quote {
    pub price: f64,
    pub change_pct: f64,
    pub change: f64,
    pub volume: f64,
    pub amount: f64,
    pub turnover_pct: f64,
    pub pe: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub date: String,
}

const POSITIVE_WORDS: [&str; 6] = ["增长", "突破", "获批", "合作", "利好", "涨停"];
const NEGATIVE_WORDS: [&str; 6] = ["亏损", "减持", "风险", "调查", "处罚", "跌停"];

pub fn classify_valuation(pe: f64) -> &'static str {
    if pe <= 0.0 {
        "loss"
    } else if pe < 20.0 {
        "undervalued"
    } else if pe < 50.0 {
        "fair"
    } else {
        "overvalued"
    }
}

pub fn classify_liquidity(turnover_pct: f64) -> &'static str {
    if turnover_pct > 10.0 {
        "very_active"
    } else if turnover_pct > 5.0 {
        "active"
    } else if turnover_pct > 2.0 {
        "normal"
    } else {
        "low"
    }
}

pub fn classify_trend(change_pct: f64) -> &'static str {
    if change_pct > 3.0 {
        "strong_up"
    } else if change_pct > 0.0 {
        "slight_up"
    } else if change_pct > -3.0 {
        "slight_down"
    } else {
        "strong_down"
    }
}

pub fn classify_momentum(change_pct: f64) -> &'static str {
    if change_pct > 7.0 {
        "overbought"
    } else if change_pct < -7.0 {
        "oversold"
    } else if change_pct > 3.0 {
        "strong"
    } else if change_pct < -3.0 {
        "weak"
    } else {
        "neutral"
    }
}

pub fn classify_volume_status(volume: f64) -> &'static str {
    if volume > 15.0 {
        "high_vol"
    } else if volume > 8.0 {
        "vol_up"
    } else if volume > 4.0 {
        "normal_vol"
    } else {
        "low_vol"
    }
}

pub fn classify_sentiment(change_pct: f64) -> &'static str {
    if change_pct > 7.0 {
        "euphoric"
    } else if change_pct > 3.0 {
        "optimistic"
    } else if change_pct > -3.0 {
        "cautious"
    } else {
        "panic"
    }
}

pub fn classify_capital_flow(turnover_pct: f64) -> &'static str {
    if turnover_pct > 15.0 {
        "big_inflow"
    } else if turnover_pct > 8.0 {
        "inflow"
    } else if turnover_pct > 4.0 {
        "balanced"
    } else {
        "outflow"
    }
}

pub fn classify_news(headlines: &[NewsItem]) -> &'static str {
    if headlines.is_empty() {
        return "no_news";
    }
    let positive: usize = headlines
        .iter()
        .map(|h| POSITIVE_WORDS.iter().filter(|w| h.title.contains(*w)).count())
        .sum();
    let negative: usize = headlines
        .iter()
        .map(|h| NEGATIVE_WORDS.iter().filter(|w| h.title.contains(*w)).count())
        .sum();

    if positive > negative {
        "positive"
    } else if negative > positive {
        "negative"
    } else {
        "neutral"
    }
}

/// Indicator-derived view of recent daily bars; fields are `None` during
/// warm-up or on degenerate input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalSnapshot {
    pub macd_signal: MacdSignal,
    pub rsi: Option<f64>,
    pub rsi_signal: RsiSignal,
    pub bias_pct: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub band_position_pct: Option<f64>,
}

pub fn technical_snapshot(bars: &[OhlcvBar]) -> Option<TechnicalSnapshot> {
    if bars.is_empty() {
        return None;
    }
    let last = bars.len() - 1;

    let macd = calculate_macd_default(bars);
    let rsi = calculate_rsi(bars, 14);
    let bias = calculate_bias(bars, 20);
    let volume = calculate_volume_ratio(bars, 5);
    let boll = super::indicator::calculate_bollinger(bars, 20, 2.0);

    let rsi_value = rsi.simple_at(last);
    let band = boll.values.get(last).and_then(|p| {
        if !p.valid {
            return None;
        }
        match p.value {
            IndicatorValue::Bollinger { upper, lower, .. } => {
                band_position(bars[last].close, upper, lower)
            }
            _ => None,
        }
    });

    Some(TechnicalSnapshot {
        macd_signal: classify_macd(&macd, last),
        rsi: rsi_value,
        rsi_signal: classify_rsi(rsi_value),
        bias_pct: bias.simple_at(last),
        volume_ratio: volume.simple_at(last),
        band_position_pct: band,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub code: String,
    pub name: String,
    pub quote: Quote,
    pub valuation: &'static str,
    pub liquidity: &'static str,
    pub trend: &'static str,
    pub momentum: &'static str,
    pub volume_status: &'static str,
    pub market_sentiment: &'static str,
    pub capital_flow: &'static str,
    pub news_sentiment: &'static str,
    pub headlines: Vec<NewsItem>,
    pub technicals: Option<TechnicalSnapshot>,
    pub score: u8,
    pub recommendation: &'static str,
}

pub fn build_report(
    code: &str,
    name: &str,
    quote: Quote,
    news: Vec<NewsItem>,
    technicals: Option<TechnicalSnapshot>,
) -> AnalysisReport {
    let valuation = classify_valuation(quote.pe);
    let trend = classify_trend(quote.change_pct);
    let momentum = classify_momentum(quote.change_pct);
    let market_sentiment = classify_sentiment(quote.change_pct);
    let news_sentiment = classify_news(&news);

    let (score, recommendation) =
        composite_score(valuation, trend, momentum, market_sentiment, news_sentiment);

    AnalysisReport {
        code: code.to_string(),
        name: name.to_string(),
        valuation,
        liquidity: classify_liquidity(quote.turnover_pct),
        trend,
        momentum,
        volume_status: classify_volume_status(quote.volume),
        market_sentiment,
        capital_flow: classify_capital_flow(quote.turnover_pct),
        news_sentiment,
        headlines: news,
        technicals,
        score,
        recommendation,
        quote,
    }
}

/// Additive scoring from a base of 50, clamped to 0-100.
pub fn composite_score(
    valuation: &str,
    trend: &str,
    momentum: &str,
    market_sentiment: &str,
    news_sentiment: &str,
) -> (u8, &'static str) {
    let mut score: i32 = 50;

    match valuation {
        "undervalued" => score += 15,
        "fair" => score += 5,
        "overvalued" => score -= 10,
        _ => {}
    }

    if trend.contains("up") {
        score += 10;
    } else if trend.contains("down") {
        score -= 10;
    }

    if momentum.contains("oversold") {
        score += 10;
    } else if momentum.contains("overbought") {
        score -= 5;
    }

    if market_sentiment.contains("optimistic") {
        score += 5;
    } else if market_sentiment.contains("panic") {
        score -= 10;
    }

    if news_sentiment.contains("positive") {
        score += 5;
    } else if news_sentiment.contains("negative") {
        score -= 5;
    }

    let score = score.clamp(0, 100) as u8;

    let recommendation = if score >= 75 {
        "STRONG BUY"
    } else if score >= 60 {
        "BUY"
    } else if score >= 40 {
        "HOLD"
    } else {
        "SELL"
    };

    (score, recommendation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn valuation_thresholds() {
        assert_eq!(classify_valuation(-5.0), "loss");
        assert_eq!(classify_valuation(0.0), "loss");
        assert_eq!(classify_valuation(12.0), "undervalued");
        assert_eq!(classify_valuation(35.0), "fair");
        assert_eq!(classify_valuation(80.0), "overvalued");
    }

    #[test]
    fn trend_and_momentum_thresholds() {
        assert_eq!(classify_trend(5.0), "strong_up");
        assert_eq!(classify_trend(1.0), "slight_up");
        assert_eq!(classify_trend(-1.0), "slight_down");
        assert_eq!(classify_trend(-5.0), "strong_down");

        assert_eq!(classify_momentum(8.0), "overbought");
        assert_eq!(classify_momentum(-8.0), "oversold");
        assert_eq!(classify_momentum(4.0), "strong");
        assert_eq!(classify_momentum(-4.0), "weak");
        assert_eq!(classify_momentum(0.0), "neutral");
    }

    #[test]
    fn sentiment_and_flow_thresholds() {
        assert_eq!(classify_sentiment(8.0), "euphoric");
        assert_eq!(classify_sentiment(4.0), "optimistic");
        assert_eq!(classify_sentiment(0.0), "cautious");
        assert_eq!(classify_sentiment(-5.0), "panic");

        assert_eq!(classify_capital_flow(20.0), "big_inflow");
        assert_eq!(classify_capital_flow(9.0), "inflow");
        assert_eq!(classify_capital_flow(5.0), "balanced");
        assert_eq!(classify_capital_flow(1.0), "outflow");
    }

    #[test]
    fn news_keyword_sentiment() {
        let positive = vec![NewsItem {
            title: "一季度净利润大幅增长".into(),
            date: "2024-04-20".into(),
        }];
        assert_eq!(classify_news(&positive), "positive");

        let negative = vec![NewsItem {
            title: "公司股东拟减持股份".into(),
            date: "2024-04-21".into(),
        }];
        assert_eq!(classify_news(&negative), "negative");

        let mixed = vec![
            NewsItem {
                title: "业绩增长".into(),
                date: "2024-04-20".into(),
            },
            NewsItem {
                title: "监管调查".into(),
                date: "2024-04-21".into(),
            },
        ];
        assert_eq!(classify_news(&mixed), "neutral");

        assert_eq!(classify_news(&[]), "no_news");
    }

    #[test]
    fn composite_score_bullish_setup() {
        let (score, rec) =
            composite_score("undervalued", "strong_up", "strong", "optimistic", "positive");
        assert_eq!(score, 85);
        assert_eq!(rec, "STRONG BUY");
    }

    #[test]
    fn composite_score_bearish_setup() {
        let (score, rec) =
            composite_score("overvalued", "strong_down", "neutral", "panic", "negative");
        assert_eq!(score, 15);
        assert_eq!(rec, "SELL");
    }

    #[test]
    fn composite_score_neutral_holds() {
        let (score, rec) = composite_score("loss", "slight_down", "neutral", "cautious", "no_news");
        assert_eq!(score, 40);
        assert_eq!(rec, "HOLD");
    }

    fn make_bars(count: usize) -> Vec<OhlcvBar> {
        (0..count)
            .map(|i| OhlcvBar {
                symbol: "600519".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.0 + i as f64,
                volume: 1000.0 + (i % 3) as f64 * 100.0,
            })
            .collect()
    }

    #[test]
    fn technical_snapshot_on_rising_series() {
        let snapshot = technical_snapshot(&make_bars(80)).unwrap();

        assert_eq!(snapshot.macd_signal, MacdSignal::Bullish);
        assert!((snapshot.rsi.unwrap() - 100.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.rsi_signal, RsiSignal::Overbought);
        assert!(snapshot.bias_pct.unwrap() > 0.0);
        assert!(snapshot.band_position_pct.is_some());
    }

    #[test]
    fn technical_snapshot_empty_bars() {
        assert!(technical_snapshot(&[]).is_none());
    }

    #[test]
    fn technical_snapshot_short_history_is_neutral() {
        let snapshot = technical_snapshot(&make_bars(5)).unwrap();
        assert_eq!(snapshot.macd_signal, MacdSignal::Neutral);
        assert_eq!(snapshot.rsi, None);
        assert_eq!(snapshot.rsi_signal, RsiSignal::Neutral);
    }

    #[test]
    fn build_report_wires_classifications() {
        let quote = Quote {
            price: 25.0,
            change_pct: 4.0,
            change: 1.0,
            volume: 9.0,
            amount: 2.5,
            turnover_pct: 6.0,
            pe: 15.0,
        };
        let report = build_report("600519", "贵州茅台", quote, vec![], None);

        assert_eq!(report.valuation, "undervalued");
        assert_eq!(report.trend, "strong_up");
        assert_eq!(report.market_sentiment, "optimistic");
        assert_eq!(report.news_sentiment, "no_news");
        assert_eq!(report.score, 80);
        assert_eq!(report.recommendation, "STRONG BUY");
    }
}
