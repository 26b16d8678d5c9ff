mod common;

use proptest::prelude::*;

use common::{date, make_bar};
use eodtrader::domain::bar::OhlcvBar;
use eodtrader::domain::engine::{run_backtest, BacktestConfig};
use eodtrader::domain::indicator::{calculate_rsi, calculate_sma};
use eodtrader::domain::position::TradeSide;
use eodtrader::domain::series::SymbolSeries;

fn bars_from(closes: &[f64], volumes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            make_bar(
                "600519",
                date(2024, 1, 1) + chrono::Duration::days(i as i64),
                close,
                volume,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn rsi_stays_within_bounds(
        closes in proptest::collection::vec(1.0f64..1000.0, 2..60),
        period in 2usize..20,
    ) {
        let volumes = vec![1000.0; closes.len()];
        let series = calculate_rsi(&bars_from(&closes, &volumes), period);

        for point in &series.values {
            if point.valid {
                if let eodtrader::domain::indicator::IndicatorValue::Simple(rsi) = point.value {
                    prop_assert!((0.0..=100.0).contains(&rsi), "RSI {} out of bounds", rsi);
                }
            }
        }
    }

    #[test]
    fn sma_warmup_length_is_exact(
        closes in proptest::collection::vec(1.0f64..1000.0, 1..60),
        period in 1usize..30,
    ) {
        let volumes = vec![1000.0; closes.len()];
        let series = calculate_sma(&bars_from(&closes, &volumes), period);

        let valid = series.values.iter().filter(|p| p.valid).count();
        let expected = (closes.len() + 1).saturating_sub(period);
        prop_assert_eq!(valid, expected);
    }

    #[test]
    fn engine_never_corrupts_the_ledger(
        closes in proptest::collection::vec(1.0f64..500.0, 22..50),
        volumes in proptest::collection::vec(1.0f64..1_000_000.0, 50),
    ) {
        let volumes = &volumes[..closes.len()];
        let series = SymbolSeries::new("600519".into(), bars_from(&closes, volumes));
        let lookup = series.clone();

        let run = run_backtest(&[series], &BacktestConfig::default()).unwrap();
        let trades = &run.portfolio.trades;

        // Ledger alternates buy/sell per symbol and every completed exit
        // lands exactly one bar after its entry.
        let mut last_buy_index: Option<usize> = None;
        for trade in trades {
            let index = lookup.index_of(trade.date).unwrap();
            match trade.side {
                TradeSide::Buy => {
                    prop_assert!(last_buy_index.is_none(), "buy while already holding");
                    prop_assert!(index >= 20, "entry inside warm-up window");
                    last_buy_index = Some(index);
                }
                TradeSide::Sell => {
                    let entry = last_buy_index.take();
                    prop_assert!(entry.is_some(), "sell while flat");
                    prop_assert_eq!(index, entry.unwrap() + 1);
                }
            }
        }

        // Equity curve: one point per bar date, in order.
        let curve = &run.portfolio.equity_curve;
        prop_assert_eq!(curve.len(), lookup.bar_count());
        prop_assert!(curve.windows(2).all(|w| w[0].date < w[1].date));
    }
}
