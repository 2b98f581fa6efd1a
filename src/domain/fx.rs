//! FX conversion series.

use crate::domain::instrument::InstrumentMap;
use crate::domain::series::Series;

/// Unit conversion on the price index, for instruments already quoted in
/// the base currency.
pub fn fx_series_for_prices(prices: &Series) -> Series {
    Series::constant_like(prices, 1.0)
}

/// FX series for every priced instrument, preferring supplied rates.
pub fn fx_series_map(
    prices: &InstrumentMap<Series>,
    supplied: &InstrumentMap<Series>,
) -> InstrumentMap<Series> {
    prices
        .iter()
        .map(|(code, price)| {
            let fx = match supplied.get(code) {
                Some(rates) => rates.clone(),
                None => {
                    tracing::debug!(instrument = %code, "no fx rates supplied, using base currency");
                    fx_series_for_prices(price)
                }
            };
            (code.clone(), fx)
        })
        .collect()
}
