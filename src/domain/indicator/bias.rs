//! Bias: percentage deviation of price from its moving average.
//!
//! bias = (close - SMA(period)) / SMA(period) * 100. A zero moving average
//! makes the point invalid.

use crate::domain::bar::OhlcvBar;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_bias(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let sma = calculate_sma(bars, period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match sma.simple_at(i) {
            Some(ma) if ma != 0.0 => IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Simple((bar.close - ma) / ma * 100.0),
            },
            _ => IndicatorPoint {
                date: bar.date,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bias(period),
        values,
    }
}
