#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use trendcost::domain::error::TrendError;
use trendcost::domain::instrument::{InstrumentMap, InstrumentSpec};
use trendcost::domain::series::Series;
use trendcost::ports::data_port::{DataPort, PriceData};

pub struct MockDataPort {
    pub prices: HashMap<String, Series>,
    pub positions: HashMap<String, Series>,
    pub fx: HashMap<String, Series>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            positions: HashMap::new(),
            fx: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, code: &str, prices: Series) -> Self {
        self.prices.insert(code.to_string(), prices);
        self
    }

    pub fn with_positions(mut self, code: &str, positions: Series) -> Self {
        self.positions.insert(code.to_string(), positions);
        self
    }

    pub fn with_fx(mut self, code: &str, fx: Series) -> Self {
        self.fx.insert(code.to_string(), fx);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(&self, code: &str) -> Result<PriceData, TrendError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(TrendError::Data {
                reason: reason.clone(),
            });
        }
        let adjusted = self.prices.get(code).cloned().unwrap_or_default();
        Ok(PriceData {
            current: adjusted.clone(),
            adjusted,
        })
    }

    fn fetch_positions(&self, code: &str) -> Result<Option<Series>, TrendError> {
        Ok(self.positions.get(code).cloned())
    }

    fn fetch_fx(&self, code: &str) -> Result<Option<Series>, TrendError> {
        Ok(self.fx.get(code).cloned())
    }

    fn list_instruments(&self) -> Result<Vec<String>, TrendError> {
        let mut codes: Vec<String> = self.prices.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn daily_dates(count: usize) -> Vec<NaiveDate> {
    let start = date(2024, 1, 1);
    (0..count)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

pub fn series(values: &[f64]) -> Series {
    Series::from_values(&daily_dates(values.len()), values).unwrap()
}

/// A rising price path with a small zig-zag so that returns have non-zero
/// variance.
pub fn trending_prices(count: usize, start_price: f64, step: f64) -> Series {
    let values: Vec<f64> = (0..count)
        .map(|i| start_price + step * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
        .collect();
    series(&values)
}

pub fn spec(multiplier: f64, cost_per_contract: f64, weight: f64) -> InstrumentSpec {
    InstrumentSpec {
        multiplier,
        cost_per_contract,
        weight,
    }
}

pub fn specs_for(codes: &[&str], cost_per_contract: f64) -> InstrumentMap<InstrumentSpec> {
    codes
        .iter()
        .map(|c| {
            (
                c.to_string(),
                spec(5.0, cost_per_contract, 1.0 / codes.len() as f64),
            )
        })
        .collect()
}
