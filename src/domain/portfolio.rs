//! Per-instrument drivers over instrument maps, and return aggregation.
//!
//! Each driver walks the key set of its primary input and looks every other
//! input up by code. A code missing from any input aborts the whole call with
//! [`TrendError::MissingInstrument`]; no partial map is returned.

use crate::domain::error::TrendError;
use crate::domain::instrument::{InstrumentMap, InstrumentSpec, lookup};
use crate::domain::returns::{InstrumentInputs, perc_returns_with_costs};
use crate::domain::series::{Series, SeriesPoint};
use crate::domain::trend_filter::TrendFilter;
use crate::domain::volatility::VolatilitySource;

/// Apply `filter` to every instrument in `prices`.
pub fn trend_filtered_positions(
    prices: &InstrumentMap<Series>,
    positions: &InstrumentMap<Series>,
    filter: &TrendFilter,
) -> Result<InstrumentMap<Series>, TrendError> {
    prices
        .iter()
        .map(|(code, price)| {
            let baseline = lookup(positions, code, "positions")?;
            let filtered = filter.apply(price, baseline);
            tracing::debug!(
                instrument = %code,
                indicator = %filter.indicator(),
                zeroed = filtered.points().iter().filter(|p| p.value == Some(0.0)).count(),
                "applied trend filter"
            );
            Ok((code.clone(), filtered))
        })
        .collect()
}

/// Parallel instrument maps consumed by [`perc_returns_for_map`].
pub struct PortfolioInputs<'a> {
    pub positions: &'a InstrumentMap<Series>,
    pub prices: &'a InstrumentMap<Series>,
    pub fx: &'a InstrumentMap<Series>,
    pub specs: &'a InstrumentMap<InstrumentSpec>,
    pub vols: &'a InstrumentMap<Box<dyn VolatilitySource>>,
}

/// Net percentage returns for every instrument in `inputs.positions`.
pub fn perc_returns_for_map(
    inputs: &PortfolioInputs<'_>,
    capital: f64,
) -> Result<InstrumentMap<Series>, TrendError> {
    inputs
        .positions
        .iter()
        .map(|(code, positions)| {
            let spec = lookup(inputs.specs, code, "instrument specs")?;
            let instrument = InstrumentInputs {
                positions,
                prices: lookup(inputs.prices, code, "prices")?,
                fx: lookup(inputs.fx, code, "fx")?,
                vol: lookup(inputs.vols, code, "volatility")?.as_ref(),
                multiplier: spec.multiplier,
                cost_per_contract: spec.cost_per_contract,
            };
            let returns = perc_returns_with_costs(&instrument, capital)?;
            tracing::debug!(
                instrument = %code,
                observations = returns.defined_count(),
                "computed net returns"
            );
            Ok((code.clone(), returns))
        })
        .collect()
}

/// Portfolio return: on the union of all instrument dates, the sum of the
/// instruments' defined returns. Dates where no instrument is defined stay
/// undefined.
pub fn aggregate_returns(returns: &InstrumentMap<Series>) -> Series {
    let all: Vec<&Series> = returns.values().collect();
    let index = Series::union_index(&all);

    let points = index
        .into_iter()
        .map(|date| {
            let value = all
                .iter()
                .filter_map(|s| s.get(date))
                .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v));
            SeriesPoint { date, value }
        })
        .collect();

    // union_index is strictly ascending
    Series::new(points).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::volatility::FixedVolatility;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(days: &[u32], values: &[f64]) -> Series {
        let dates: Vec<NaiveDate> = days.iter().map(|&d| day(d)).collect();
        Series::from_values(&dates, values).unwrap()
    }

    fn map_of(entries: Vec<(&str, Series)>) -> InstrumentMap<Series> {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn filter_driver_missing_positions() {
        let prices = map_of(vec![("sp500", series(&[1, 2], &[1.0, 2.0]))]);
        let positions = InstrumentMap::new();
        let err = trend_filtered_positions(&prices, &positions, &TrendFilter::default())
            .unwrap_err();
        assert!(matches!(
            err,
            TrendError::MissingInstrument { ref code, ref input } if code == "sp500" && input == "positions"
        ));
    }

    #[test]
    fn filter_driver_one_entry_per_price_key() {
        let up = series(&[1, 2, 3], &[1.0, 2.0, 3.0]);
        let down = series(&[1, 2, 3], &[3.0, 2.0, 1.0]);
        let prices = map_of(vec![("a", up), ("b", down)]);
        let positions = map_of(vec![
            ("a", series(&[1, 2, 3], &[1.0; 3])),
            ("b", series(&[1, 2, 3], &[1.0; 3])),
            ("unused", series(&[1], &[1.0])),
        ]);
        let out = trend_filtered_positions(&prices, &positions, &TrendFilter::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out["a"].values(), vec![Some(0.0), Some(1.0), Some(1.0)]);
        assert_eq!(out["b"].values(), vec![Some(0.0); 3]);
    }

    #[test]
    fn returns_driver_missing_fx() {
        let days = [1, 2, 3];
        let positions = map_of(vec![("sp500", series(&days, &[1.0; 3]))]);
        let prices = map_of(vec![("sp500", series(&days, &[1.0, 2.0, 3.0]))]);
        let fx = InstrumentMap::new();
        let mut specs = InstrumentMap::new();
        specs.insert(
            "sp500".to_string(),
            InstrumentSpec {
                multiplier: 1.0,
                cost_per_contract: 0.0,
                weight: 1.0,
            },
        );
        let mut vols: InstrumentMap<Box<dyn VolatilitySource>> = InstrumentMap::new();
        vols.insert(
            "sp500".to_string(),
            Box::new(FixedVolatility::new(series(&days, &[1.0; 3]))),
        );

        let inputs = PortfolioInputs {
            positions: &positions,
            prices: &prices,
            fx: &fx,
            specs: &specs,
            vols: &vols,
        };
        let err = perc_returns_for_map(&inputs, 100.0).unwrap_err();
        assert!(matches!(err, TrendError::MissingInstrument { ref input, .. } if input == "fx"));
    }

    #[test]
    fn aggregate_single_instrument_is_identity() {
        let s = Series::from_pairs(vec![
            (day(1), None),
            (day(2), Some(0.5)),
            (day(3), Some(-0.25)),
        ])
        .unwrap();
        let returns = map_of(vec![("sp500", s.clone())]);
        assert_eq!(aggregate_returns(&returns), s);
    }

    #[test]
    fn aggregate_sums_on_union_index() {
        let returns = map_of(vec![
            ("a", series(&[1, 2], &[1.0, 2.0])),
            ("b", series(&[2, 3], &[10.0, 20.0])),
        ]);
        let out = aggregate_returns(&returns);
        assert_eq!(out.dates(), vec![day(1), day(2), day(3)]);
        assert_eq!(out.values(), vec![Some(1.0), Some(12.0), Some(20.0)]);
    }

    #[test]
    fn aggregate_all_undefined_stays_undefined() {
        let a = Series::from_pairs(vec![(day(1), None), (day(2), Some(1.0))]).unwrap();
        let b = Series::from_pairs(vec![(day(1), None)]).unwrap();
        let out = aggregate_returns(&map_of(vec![("a", a), ("b", b)]));
        assert_eq!(out.values(), vec![None, Some(1.0)]);
    }

    #[test]
    fn aggregate_empty_map() {
        assert!(aggregate_returns(&InstrumentMap::new()).is_empty());
    }
}
