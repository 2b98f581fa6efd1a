//! Net percentage returns for one instrument.
//!
//! held[t]   = position carried onto the price index, shifted one date
//! points[t] = (price[t] - price[t-1]) * held[t]
//! net[t]    = points[t] * multiplier - cost[t]
//! perc[t]   = net[t] * fx[t] / capital
//!
//! Cost and FX are carried forward onto the price index. The first date is
//! always undefined.

use crate::domain::costs::costs_deflated_for_vol;
use crate::domain::error::TrendError;
use crate::domain::series::Series;
use crate::domain::volatility::VolatilitySource;

/// Everything one instrument contributes to its return calculation.
pub struct InstrumentInputs<'a> {
    pub positions: &'a Series,
    pub prices: &'a Series,
    pub fx: &'a Series,
    pub vol: &'a dyn VolatilitySource,
    pub multiplier: f64,
    pub cost_per_contract: f64,
}

pub fn validate_capital(capital: f64) -> Result<(), TrendError> {
    if capital.is_finite() && capital > 0.0 {
        Ok(())
    } else {
        Err(TrendError::NonPositiveCapital { capital })
    }
}

/// Pre-cost return in price points, using the position held entering each
/// date.
pub fn precost_return_price_points(prices: &Series, positions: &Series) -> Series {
    let held = positions.reindex_ffill(&prices.dates()).shift(1);
    prices.diff().combine(&held, |change, held| change * held)
}

pub fn perc_returns_with_costs(
    inputs: &InstrumentInputs<'_>,
    capital: f64,
) -> Result<Series, TrendError> {
    validate_capital(capital)?;

    let precost_currency = precost_return_price_points(inputs.prices, inputs.positions)
        .scale(inputs.multiplier);

    let index = precost_currency.dates();
    let costs = costs_deflated_for_vol(inputs.vol, inputs.cost_per_contract, inputs.positions)?
        .reindex_ffill(&index);
    let net_currency = precost_currency.combine(&costs, |ret, cost| ret - cost);

    let fx = inputs.fx.reindex_ffill(&index);
    let base_currency = net_currency.combine(&fx, |ret, rate| ret * rate);

    Ok(base_currency.map(|ret| ret / capital))
}
