//! MACD (Moving Average Convergence Divergence).
//!
//! DIF  = EMA(close, fast) - EMA(close, slow)
//! DEA  = EMA(DIF, signal)
//! histogram = (DIF - DEA) * 2
//!
//! All EMAs use the first-value-seeded recursion from [`super::ema`].
//! Defaults: fast=12, slow=26, signal=9.
//! Warmup: slow - 1 + signal - 1 bars.

use crate::domain::bar::OhlcvBar;
use crate::domain::indicator::ema::ema_recursive;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd { fast, slow, signal };

    if bars.is_empty() || fast == 0 || slow == 0 || signal == 0 {
        let values = bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            })
            .collect();
        return IndicatorSeries {
            indicator_type,
            values,
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_recursive(&closes, fast);
    let ema_slow = ema_recursive(&closes, slow);

    let dif: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let dea = ema_recursive(&dif, signal);

    let warmup = slow - 1 + signal - 1;

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: i >= warmup,
            value: IndicatorValue::Macd {
                dif: dif[i],
                dea: dea[i],
                histogram: (dif[i] - dea[i]) * 2.0,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
