//! Volatility-deflated trading costs.
//!
//! deflated[t] = cost_per_contract * vol[t] / vol[last]
//! trades[t]   = |round(position[t]) - round(position[t-1])|, undefined on the first date
//! cost[t]     = trades[t] * deflated (carried forward onto the position index)

use crate::domain::error::TrendError;
use crate::domain::series::Series;
use crate::domain::volatility::VolatilitySource;

/// Flat cost per contract scaled by each date's volatility relative to the
/// final observation.
pub fn deflated_costs(
    vol: &dyn VolatilitySource,
    cost_per_contract: f64,
) -> Result<Series, TrendError> {
    let daily = vol.daily_risk_price_terms();
    let final_vol = match daily.last() {
        None => {
            return Err(TrendError::DegenerateVolatility {
                reason: "volatility series is empty".into(),
            });
        }
        Some(point) => point.value.ok_or_else(|| TrendError::DegenerateVolatility {
            reason: format!("final volatility on {} is undefined", point.date),
        })?,
    };

    if !final_vol.is_finite() || final_vol <= 0.0 {
        return Err(TrendError::DegenerateVolatility {
            reason: format!("final volatility is {}", final_vol),
        });
    }

    Ok(daily.map(|v| cost_per_contract * v / final_vol))
}

/// Realized cost of rounding `positions` to whole contracts and trading the
/// day-over-day changes.
pub fn historic_costs(positions: &Series, deflated: &Series) -> Series {
    let trades = positions.round().diff().abs();
    let cost_aligned = deflated.reindex_ffill(&trades.dates());
    trades.combine(&cost_aligned, |n, cost| n * cost)
}

/// Deflate then accumulate in one step.
pub fn costs_deflated_for_vol(
    vol: &dyn VolatilitySource,
    cost_per_contract: f64,
    positions: &Series,
) -> Result<Series, TrendError> {
    let deflated = deflated_costs(vol, cost_per_contract)?;
    Ok(historic_costs(positions, &deflated))
}
