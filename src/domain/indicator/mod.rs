//! Technical indicator implementations.
//!
//! Each `calculate_*` function takes an ordered bar slice and returns an
//! [`IndicatorSeries`] of the same length, aligned by index. Points inside a
//! warm-up window, or whose denominator is zero, are marked invalid rather
//! than raising; downstream classification treats invalid as neutral.
//! A value at index `i` depends only on bars at indices `<= i`.

pub mod bias;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use bias::calculate_bias;
pub use bollinger::{band_position, calculate_bollinger};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use volume::calculate_volume_ratio;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        dif: f64,
        dea: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

/// Indicator identity plus parameters; usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    VolumeRatio(usize),
    Bias(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        width_x100: u32,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Valid `Simple` value at `index`, or `None`.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        let point = self.values.get(index)?;
        if !point.valid {
            return None;
        }
        match point.value {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }

    /// All `Simple` values with invalid points mapped to `None`.
    pub fn simple_values(&self) -> Vec<Option<f64>> {
        (0..self.values.len()).map(|i| self.simple_at(i)).collect()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::VolumeRatio(period) => write!(f, "VR({})", period),
            IndicatorType::Bias(period) => write!(f, "BIAS({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger { period, width_x100 } => {
                write!(f, "BOLL({},{})", period, *width_x100 as f64 / 100.0)
            }
        }
    }
}
