//! Volume ratio.
//!
//! Current volume over the mean volume of the prior `period` bars. A zero
//! trailing mean makes the point invalid instead of dividing by zero.
//! Warmup: the first `period` bars are invalid.

use crate::domain::bar::OhlcvBar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_volume_ratio(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        if period == 0 || i < period {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        let trailing_mean =
            bars[i - period..i].iter().map(|b| b.volume).sum::<f64>() / period as f64;

        if trailing_mean > 0.0 {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Simple(bar.volume / trailing_mean),
            });
        } else {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::VolumeRatio(period),
        values,
    }
}
