//! Data access port trait.

use crate::domain::error::TrendError;
use crate::domain::series::Series;

/// Adjusted (back-adjusted, continuous) and current (traded contract)
/// prices for one instrument.
#[derive(Debug, Clone)]
pub struct PriceData {
    pub adjusted: Series,
    pub current: Series,
}

pub trait DataPort {
    fn fetch_prices(&self, code: &str) -> Result<PriceData, TrendError>;

    /// Baseline positions, if the instrument has them precomputed.
    fn fetch_positions(&self, code: &str) -> Result<Option<Series>, TrendError>;

    /// FX rates to the base currency, if the instrument needs converting.
    fn fetch_fx(&self, code: &str) -> Result<Option<Series>, TrendError>;

    fn list_instruments(&self) -> Result<Vec<String>, TrendError>;
}
