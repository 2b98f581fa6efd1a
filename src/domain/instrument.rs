//! Per-instrument parameters and the instrument-keyed map type.

use crate::domain::error::TrendError;
use std::collections::BTreeMap;

/// Instrument code to value. Ordered so that every driver visits
/// instruments in the same order.
pub type InstrumentMap<T> = BTreeMap<String, T>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentSpec {
    /// Currency value of one price point for one contract.
    pub multiplier: f64,
    /// Flat currency cost of trading one contract.
    pub cost_per_contract: f64,
    /// Share of the risk budget given to this instrument.
    pub weight: f64,
}

/// Look up `code` in `map`, naming `input` in the error if absent.
pub fn lookup<'a, T>(
    map: &'a InstrumentMap<T>,
    code: &str,
    input: &str,
) -> Result<&'a T, TrendError> {
    map.get(code).ok_or_else(|| TrendError::missing(code, input))
}
