//! Bollinger bands.
//!
//! middle = SMA(period); band offset = width * trailing population standard
//! deviation. `band_position` maps a close into percent-of-band space and
//! may leave [0, 100] when price pierces a band.

use crate::domain::bar::OhlcvBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_bollinger(bars: &[OhlcvBar], period: usize, width: f64) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        width_x100: (width * 100.0).round() as u32,
    };

    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if period == 0 || i + 1 < period {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|b| (b.close - mean).powi(2))
            .sum::<f64>()
            / period as f64;
        let offset = width * variance.sqrt();

        values.push(IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Bollinger {
                upper: mean + offset,
                middle: mean,
                lower: mean - offset,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Position of `close` inside the band as a percentage:
/// (close - lower) / (upper - lower) * 100. `None` on zero band width.
pub fn band_position(close: f64, upper: f64, lower: f64) -> Option<f64> {
    let span = upper - lower;
    if span == 0.0 {
        None
    } else {
        Some((close - lower) / span * 100.0)
    }
}
