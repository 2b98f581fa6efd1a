//! Baseline position sizing from a variable risk estimate.
//!
//! N[t] = capital * idm * weight * risk_target / (multiplier * fx[t] * annual_risk_price_terms[t])
//!
//! FX is carried forward onto the volatility index. A zero or undefined
//! denominator gives an undefined position.

use crate::domain::error::TrendError;
use crate::domain::instrument::{InstrumentMap, InstrumentSpec, lookup};
use crate::domain::returns::validate_capital;
use crate::domain::series::Series;
use crate::domain::volatility::VolatilitySource;

/// Portfolio-wide sizing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParameters {
    pub capital: f64,
    pub risk_target: f64,
    pub idm: f64,
}

pub fn position_series_given_variable_risk(
    params: &RiskParameters,
    spec: &InstrumentSpec,
    fx: &Series,
    vol: &dyn VolatilitySource,
) -> Result<Series, TrendError> {
    validate_capital(params.capital)?;

    let annual_risk = vol.annual_risk_price_terms();
    let fx_aligned = fx.reindex_ffill(&annual_risk.dates());
    let risk_per_contract = annual_risk
        .combine(&fx_aligned, |risk, rate| risk * rate)
        .scale(spec.multiplier);

    let numerator = params.capital * params.idm * spec.weight * params.risk_target;
    Ok(risk_per_contract.map(|risk| {
        if risk == 0.0 { f64::NAN } else { numerator / risk }
    }))
}

/// Size every instrument in `vols`.
pub fn positions_for_map(
    params: &RiskParameters,
    specs: &InstrumentMap<InstrumentSpec>,
    fx: &InstrumentMap<Series>,
    vols: &InstrumentMap<Box<dyn VolatilitySource>>,
) -> Result<InstrumentMap<Series>, TrendError> {
    vols.iter()
        .map(|(code, vol)| {
            let spec = lookup(specs, code, "instrument specs")?;
            let rates = lookup(fx, code, "fx")?;
            let positions = position_series_given_variable_risk(params, spec, rates, vol.as_ref())?;
            tracing::debug!(
                instrument = %code,
                observations = positions.defined_count(),
                "sized baseline positions"
            );
            Ok((code.clone(), positions))
        })
        .collect()
}
