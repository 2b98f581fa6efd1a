//! Integration tests for the portfolio pipeline.
//!
//! Tests cover:
//! - Per-instrument returns through the portfolio drivers
//! - Full backtest with a mock data port
//! - Missing-instrument propagation across inputs
//! - Universe validation with partially bad data
//! - Aggregation over instruments with different calendars

mod common;

use approx::assert_relative_eq;
use common::*;
use trendcost::domain::backtest::{BacktestConfig, run_backtest};
use trendcost::domain::error::TrendError;
use trendcost::domain::instrument::InstrumentMap;
use trendcost::domain::portfolio::{
    PortfolioInputs, aggregate_returns, perc_returns_for_map, trend_filtered_positions,
};
use trendcost::domain::position_sizing::RiskParameters;
use trendcost::domain::returns::precost_return_price_points;
use trendcost::domain::series::Series;
use trendcost::domain::trend_filter::TrendFilter;
use trendcost::domain::universe::{MIN_PRICE_OBSERVATIONS, SkipReason, validate_universe};
use trendcost::domain::volatility::{FixedVolatility, VolatilityConfig, VolatilitySource};

fn backtest_config(capital: f64) -> BacktestConfig {
    BacktestConfig {
        risk: RiskParameters {
            capital,
            risk_target: 0.2,
            idm: 1.0,
        },
        trend: TrendFilter::default(),
        volatility: VolatilityConfig::default(),
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

mod portfolio_drivers {
    use super::*;

    fn single<T>(code: &str, value: T) -> InstrumentMap<T> {
        let mut map = InstrumentMap::new();
        map.insert(code.to_string(), value);
        map
    }

    #[test]
    fn worked_example_through_map_driver() {
        let positions = single("sp500", series(&[2.0; 4]));
        let prices = single("sp500", series(&[100.0, 102.0, 101.0, 105.0]));
        let fx = single("sp500", series(&[1.0; 4]));
        let specs = single("sp500", spec(5.0, 1.0, 1.0));
        let vol: Box<dyn VolatilitySource> = Box::new(FixedVolatility::new(series(&[1.0; 4])));
        let vols = single("sp500", vol);

        let inputs = PortfolioInputs {
            positions: &positions,
            prices: &prices,
            fx: &fx,
            specs: &specs,
            vols: &vols,
        };
        let returns = perc_returns_for_map(&inputs, 100_000.0).unwrap();
        let out = returns["sp500"].values();
        assert_eq!(out[0], None);
        assert_relative_eq!(out[1].unwrap(), 0.0002, max_relative = 1e-12);
        assert_relative_eq!(out[2].unwrap(), -0.0001, max_relative = 1e-12);
        assert_relative_eq!(out[3].unwrap(), 0.0004, max_relative = 1e-12);

        assert_eq!(aggregate_returns(&returns), returns["sp500"]);
    }

    #[test]
    fn missing_volatility_names_the_input() {
        let positions = single("sp500", series(&[2.0; 4]));
        let prices = single("sp500", series(&[100.0, 102.0, 101.0, 105.0]));
        let fx = single("sp500", series(&[1.0; 4]));
        let specs = single("sp500", spec(5.0, 1.0, 1.0));
        let vols: InstrumentMap<Box<dyn VolatilitySource>> = InstrumentMap::new();

        let inputs = PortfolioInputs {
            positions: &positions,
            prices: &prices,
            fx: &fx,
            specs: &specs,
            vols: &vols,
        };
        let err = perc_returns_for_map(&inputs, 100_000.0).unwrap_err();
        assert!(matches!(
            err,
            TrendError::MissingInstrument { ref code, ref input } if code == "sp500" && input == "volatility"
        ));
    }

    #[test]
    fn bearish_instrument_is_flattened() {
        let rising = trending_prices(20, 100.0, 1.0);
        let falling = trending_prices(20, 200.0, -1.0);
        let mut prices = InstrumentMap::new();
        prices.insert("up".to_string(), rising);
        prices.insert("down".to_string(), falling);
        let mut positions = InstrumentMap::new();
        positions.insert("up".to_string(), series(&[3.0; 20]));
        positions.insert("down".to_string(), series(&[3.0; 20]));

        let filtered = trend_filtered_positions(&prices, &positions, &TrendFilter::default()).unwrap();
        assert!(filtered["down"].values().iter().all(|v| *v == Some(0.0)));
        assert_eq!(filtered["up"].values()[0], Some(0.0));
        assert!(filtered["up"].values()[1..].iter().all(|v| *v == Some(3.0)));
    }

    #[test]
    fn aggregate_over_different_calendars() {
        let a = Series::from_values(&[date(2024, 1, 1), date(2024, 1, 3)], &[0.01, 0.02]).unwrap();
        let b = Series::from_values(&[date(2024, 1, 2), date(2024, 1, 3)], &[0.5, -0.01]).unwrap();
        let mut returns = InstrumentMap::new();
        returns.insert("a".to_string(), a);
        returns.insert("b".to_string(), b);

        let total = aggregate_returns(&returns);
        assert_eq!(
            total.dates(),
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
        let values = total.values();
        assert_relative_eq!(values[0].unwrap(), 0.01);
        assert_relative_eq!(values[1].unwrap(), 0.5);
        assert_relative_eq!(values[2].unwrap(), 0.01);
    }
}

mod full_backtest_pipeline {
    use super::*;

    const CAPITAL: f64 = 1_000_000.0;

    /// Four contracts for the first half, six for the second.
    fn stepped_positions() -> Series {
        let values: Vec<f64> = (0..60).map(|i| if i < 30 { 4.0 } else { 6.0 }).collect();
        series(&values)
    }

    fn port_with_supplied_positions(fx: Option<f64>) -> MockDataPort {
        let mut port = MockDataPort::new()
            .with_prices("sp500", trending_prices(60, 100.0, 1.0))
            .with_positions("sp500", stepped_positions());
        if let Some(rate) = fx {
            port = port.with_fx("sp500", series(&[rate; 60]));
        }
        port
    }

    #[test]
    fn zero_cost_returns_equal_gross_returns() {
        let port = port_with_supplied_positions(None);
        let prices = trending_prices(60, 100.0, 1.0);

        let result = run_backtest(
            &port,
            &codes(&["sp500"]),
            &specs_for(&["sp500"], 0.0),
            &backtest_config(CAPITAL),
        )
        .unwrap();

        let gross = precost_return_price_points(&prices, &result.positions["sp500"]).values();
        let net = result.returns["sp500"].values();
        assert_eq!(net[0], None);
        // undefined only while volatility warms up
        assert!(result.returns["sp500"].defined_count() > 40);
        for (n, g) in net.iter().zip(gross.iter()) {
            if let Some(n) = n {
                assert_relative_eq!(*n, g.unwrap() * 5.0 / CAPITAL, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn costs_only_reduce_returns() {
        let port = port_with_supplied_positions(None);
        let config = backtest_config(CAPITAL);
        let free = run_backtest(&port, &codes(&["sp500"]), &specs_for(&["sp500"], 0.0), &config)
            .unwrap();
        let costly = run_backtest(&port, &codes(&["sp500"]), &specs_for(&["sp500"], 10.0), &config)
            .unwrap();

        let free = free.returns["sp500"].values();
        let costly = costly.returns["sp500"].values();
        for (f, c) in free.iter().zip(costly.iter()) {
            if let (Some(f), Some(c)) = (f, c) {
                assert!(c <= f);
            }
        }
        // two contracts bought on the step date
        assert!(costly[30].unwrap() < free[30].unwrap());
        assert_relative_eq!(costly[31].unwrap(), free[31].unwrap());
    }

    #[test]
    fn supplied_fx_scales_returns() {
        let config = backtest_config(CAPITAL);
        let specs = specs_for(&["sp500"], 2.0);
        let base = run_backtest(&port_with_supplied_positions(None), &codes(&["sp500"]), &specs, &config)
            .unwrap();
        let doubled = run_backtest(
            &port_with_supplied_positions(Some(2.0)),
            &codes(&["sp500"]),
            &specs,
            &config,
        )
        .unwrap();

        for (b, d) in base.returns["sp500"]
            .values()
            .iter()
            .zip(doubled.returns["sp500"].values().iter())
        {
            match (b, d) {
                (Some(b), Some(d)) => assert_relative_eq!(*d, 2.0 * b, max_relative = 1e-12),
                (None, None) => {}
                _ => panic!("fx changed which dates are defined"),
            }
        }
    }

    #[test]
    fn sized_positions_follow_the_trend() {
        let port = MockDataPort::new()
            .with_prices("up", trending_prices(80, 100.0, 1.0))
            .with_prices("down", trending_prices(80, 300.0, -1.0));
        let result = run_backtest(
            &port,
            &codes(&["down", "up"]),
            &specs_for(&["down", "up"], 1.0),
            &backtest_config(CAPITAL),
        )
        .unwrap();

        assert!(
            result.positions["down"]
                .values()
                .iter()
                .all(|v| v.is_none() || *v == Some(0.0))
        );
        assert!(result.positions["up"].values().iter().flatten().any(|p| *p > 0.0));
        assert_eq!(result.returns.len(), 2);
        assert!(result.aggregate.defined_count() > 0);
    }

    #[test]
    fn missing_spec_aborts_whole_run() {
        let port = MockDataPort::new()
            .with_prices("sp500", trending_prices(40, 100.0, 1.0))
            .with_prices("us10", trending_prices(40, 120.0, 0.5));
        let err = run_backtest(
            &port,
            &codes(&["sp500", "us10"]),
            &specs_for(&["sp500"], 1.0),
            &backtest_config(CAPITAL),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TrendError::MissingInstrument { ref code, ref input } if code == "us10" && input == "instrument specs"
        ));
    }

    #[test]
    fn non_positive_capital_rejected() {
        let port = port_with_supplied_positions(None);
        let err = run_backtest(
            &port,
            &codes(&["sp500"]),
            &specs_for(&["sp500"], 1.0),
            &backtest_config(0.0),
        )
        .unwrap_err();
        assert!(matches!(err, TrendError::NonPositiveCapital { .. }));
    }

    #[test]
    fn flat_prices_are_degenerate() {
        let port = MockDataPort::new()
            .with_prices("flat", series(&[100.0; 40]))
            .with_positions("flat", series(&[1.0; 40]));
        let err = run_backtest(
            &port,
            &codes(&["flat"]),
            &specs_for(&["flat"], 1.0),
            &backtest_config(CAPITAL),
        )
        .unwrap_err();
        assert!(matches!(err, TrendError::DegenerateVolatility { .. }));
    }
}

mod universe_validation {
    use super::*;

    #[test]
    fn partial_universe_proceeds() {
        let port = MockDataPort::new()
            .with_prices("sp500", trending_prices(MIN_PRICE_OBSERVATIONS, 100.0, 1.0))
            .with_prices("short", trending_prices(5, 100.0, 1.0))
            .with_error("broken", "connection refused");

        let result = validate_universe(&port, codes(&["sp500", "short", "broken", "absent"])).unwrap();
        assert_eq!(result.universe.codes, vec!["sp500"]);
        assert_eq!(result.skipped.len(), 3);
        assert_eq!(
            result.skipped[0].reason,
            SkipReason::InsufficientObservations { observations: 5 }
        );
        assert_eq!(result.skipped[1].reason, SkipReason::NoData);
        assert_eq!(result.skipped[2].reason, SkipReason::NoData);
    }

    #[test]
    fn empty_universe_is_an_error() {
        let port = MockDataPort::new().with_prices("short", trending_prices(3, 100.0, 1.0));
        let err = validate_universe(&port, codes(&["short"])).unwrap_err();
        assert!(matches!(err, TrendError::InsufficientData { .. }));
    }
}
