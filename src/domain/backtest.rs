//! Portfolio backtest pipeline.
//!
//! Fetch prices, estimate volatility, size or load baseline positions,
//! apply the trend filter, then compute net and aggregated returns.

use crate::domain::error::TrendError;
use crate::domain::fx::fx_series_map;
use crate::domain::instrument::{InstrumentMap, InstrumentSpec};
use crate::domain::portfolio::{
    PortfolioInputs, aggregate_returns, perc_returns_for_map, trend_filtered_positions,
};
use crate::domain::position_sizing::{RiskParameters, positions_for_map};
use crate::domain::series::Series;
use crate::domain::trend_filter::TrendFilter;
use crate::domain::volatility::{StandardDeviation, VolatilityConfig, VolatilitySource};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub risk: RiskParameters,
    pub trend: TrendFilter,
    pub volatility: VolatilityConfig,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Trend-filtered positions.
    pub positions: InstrumentMap<Series>,
    pub returns: InstrumentMap<Series>,
    pub aggregate: Series,
}

/// Inputs fetched from a [`DataPort`] for a set of instruments.
struct MarketData {
    adjusted: InstrumentMap<Series>,
    vols: InstrumentMap<Box<dyn VolatilitySource>>,
    positions: InstrumentMap<Series>,
    fx: InstrumentMap<Series>,
}

fn fetch_market_data(
    data_port: &dyn DataPort,
    codes: &[String],
    volatility: &VolatilityConfig,
) -> Result<MarketData, TrendError> {
    let mut data = MarketData {
        adjusted: InstrumentMap::new(),
        vols: InstrumentMap::new(),
        positions: InstrumentMap::new(),
        fx: InstrumentMap::new(),
    };

    let [short_run, long_run] = volatility.indicators();
    for code in codes {
        let prices = data_port.fetch_prices(code)?;
        tracing::debug!(
            instrument = %code,
            observations = prices.adjusted.defined_count(),
            short_run = %short_run,
            long_run = %long_run,
            "estimating volatility"
        );
        let vol = StandardDeviation::from_prices(&prices.adjusted, &prices.current, volatility);
        data.vols.insert(code.clone(), Box::new(vol));
        data.adjusted.insert(code.clone(), prices.adjusted);

        if let Some(positions) = data_port.fetch_positions(code)? {
            data.positions.insert(code.clone(), positions);
        }
        if let Some(fx) = data_port.fetch_fx(code)? {
            data.fx.insert(code.clone(), fx);
        }
    }

    Ok(data)
}

pub fn run_backtest(
    data_port: &dyn DataPort,
    codes: &[String],
    specs: &InstrumentMap<InstrumentSpec>,
    config: &BacktestConfig,
) -> Result<BacktestResult, TrendError> {
    let data = fetch_market_data(data_port, codes, &config.volatility)?;
    let fx = fx_series_map(&data.adjusted, &data.fx);

    let mut baseline = positions_for_map(&config.risk, specs, &fx, &data.vols)?;
    for (code, supplied) in data.positions {
        tracing::debug!(instrument = %code, "using supplied baseline positions");
        baseline.insert(code, supplied);
    }

    let positions = trend_filtered_positions(&data.adjusted, &baseline, &config.trend)?;

    let inputs = PortfolioInputs {
        positions: &positions,
        prices: &data.adjusted,
        fx: &fx,
        specs,
        vols: &data.vols,
    };
    let returns = perc_returns_for_map(&inputs, config.risk.capital)?;
    let aggregate = aggregate_returns(&returns);

    tracing::info!(
        instruments = returns.len(),
        observations = aggregate.defined_count(),
        "backtest complete"
    );

    Ok(BacktestResult {
        positions,
        returns,
        aggregate,
    })
}
