//! Exponential moving average.
//!
//! Standard recursive smoothing with span-derived decay k = 2/(period+1),
//! seeded by the first close with no warm-up adjustment:
//!   ema[0] = close[0]
//!   ema[i] = close[i] * k + ema[i-1] * (1 - k)
//!
//! Points before period-1 are computed but marked invalid.

use crate::domain::bar::OhlcvBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        let values = bars
            .iter()
            .map(|b| IndicatorPoint {
                date: b.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            })
            .collect();
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(period),
            values,
        };
    }

    let raw = ema_recursive(&bars.iter().map(|b| b.close).collect::<Vec<_>>(), period);

    let values = bars
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(i, (bar, ema))| IndicatorPoint {
            date: bar.date,
            valid: i + 1 >= period,
            value: IndicatorValue::Simple(ema),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// Raw first-value-seeded EMA recursion over an arbitrary series.
/// Shared with the MACD signal line, which smooths DIF rather than closes.
pub(crate) fn ema_recursive(series: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut ema = 0.0;
    for (i, &value) in series.iter().enumerate() {
        ema = if i == 0 {
            value
        } else {
            value * k + ema * (1.0 - k)
        };
        out.push(ema);
    }
    out
}
