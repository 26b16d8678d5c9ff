//! String-label classification of indicator states.
//!
//! Invalid indicator points always classify as neutral; a missing prior bar
//! means no crossover can be claimed.

use serde::Serialize;

use crate::domain::indicator::{IndicatorSeries, IndicatorValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    /// DIF crossed above DEA on this bar.
    GoldenCross,
    /// DIF crossed below DEA on this bar.
    DeathCross,
    /// DIF above DEA without a cross this bar.
    Bullish,
    /// DIF at or below DEA without a cross this bar.
    Bearish,
    Neutral,
}

impl MacdSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            MacdSignal::GoldenCross => "golden_cross",
            MacdSignal::DeathCross => "death_cross",
            MacdSignal::Bullish => "bullish",
            MacdSignal::Bearish => "bearish",
            MacdSignal::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsiSignal::Overbought => "overbought",
            RsiSignal::Oversold => "oversold",
            RsiSignal::Neutral => "neutral",
        }
    }
}

fn macd_components(series: &IndicatorSeries, index: usize) -> Option<(f64, f64)> {
    let point = series.values.get(index)?;
    if !point.valid {
        return None;
    }
    match point.value {
        IndicatorValue::Macd { dif, dea, .. } => Some((dif, dea)),
        _ => None,
    }
}

/// Classify the MACD state at `index`. A crossover requires a valid prior
/// point; a persistent DIF > DEA without a cross is bullish, not a golden
/// cross.
pub fn classify_macd(series: &IndicatorSeries, index: usize) -> MacdSignal {
    let Some((dif, dea)) = macd_components(series, index) else {
        return MacdSignal::Neutral;
    };

    let prev = index.checked_sub(1).and_then(|i| macd_components(series, i));

    match prev {
        Some((prev_dif, prev_dea)) => {
            if dif > dea && prev_dif <= prev_dea {
                MacdSignal::GoldenCross
            } else if dif < dea && prev_dif >= prev_dea {
                MacdSignal::DeathCross
            } else if dif > dea {
                MacdSignal::Bullish
            } else {
                MacdSignal::Bearish
            }
        }
        None => {
            if dif > dea {
                MacdSignal::Bullish
            } else {
                MacdSignal::Bearish
            }
        }
    }
}

pub fn classify_rsi(rsi: Option<f64>) -> RsiSignal {
    match rsi {
        Some(v) if v > 70.0 => RsiSignal::Overbought,
        Some(v) if v < 30.0 => RsiSignal::Oversold,
        Some(_) => RsiSignal::Neutral,
        None => RsiSignal::Neutral,
    }
}
