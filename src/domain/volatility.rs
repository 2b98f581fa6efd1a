//! Volatility sources consumed by cost deflation and position sizing.
//!
//! [`StandardDeviation`] estimates risk from prices:
//! - daily % returns r[t] = (adjusted[t] - adjusted[t-1]) / current[t-1]
//! - short-run annual vol = EWM std(r, span) * 16
//! - blended annual vol = 0.3 * rolling mean(short-run, long window) + 0.7 * short-run
//!
//! Price-terms risk multiplies the annual % vol by the current price.

use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::rolling::rolling_mean;
use crate::domain::indicator::stddev::ewm_std;
use crate::domain::series::Series;

/// Square root of business days per year, rounded.
pub const BUSINESS_DAYS_ROOT: f64 = 16.0;

const LONG_RUN_WEIGHT: f64 = 0.3;

/// Something that can report an instrument's risk in price terms.
pub trait VolatilitySource {
    /// Daily standard deviation, in price units.
    fn daily_risk_price_terms(&self) -> Series;

    /// Annualised standard deviation, in price units.
    fn annual_risk_price_terms(&self) -> Series {
        self.daily_risk_price_terms().scale(BUSINESS_DAYS_ROOT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityConfig {
    pub span: usize,
    pub long_run_window: usize,
    pub min_periods: usize,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            span: 32,
            long_run_window: 2520,
            min_periods: 10,
        }
    }
}

impl VolatilityConfig {
    /// The short-run and long-run estimators, for labelling output.
    pub fn indicators(&self) -> [IndicatorType; 2] {
        [
            IndicatorType::EwmStd(self.span),
            IndicatorType::RollingMean(self.long_run_window),
        ]
    }
}

/// Price-based volatility estimate for one instrument.
#[derive(Debug, Clone)]
pub struct StandardDeviation {
    annual_risk_perc: Series,
    current_price: Series,
}

impl StandardDeviation {
    pub fn from_prices(adjusted: &Series, current: &Series, config: &VolatilityConfig) -> Self {
        let current_aligned = current.reindex_ffill(&adjusted.dates());
        let daily_returns = adjusted
            .diff()
            .combine(&current_aligned.shift(1), |change, price| change / price);

        let short_run = ewm_std(&daily_returns, config.span, config.min_periods)
            .scale(BUSINESS_DAYS_ROOT);
        let long_run = rolling_mean(&short_run, config.long_run_window, 1);
        let annual_risk_perc = long_run.combine(&short_run, |long, short| {
            LONG_RUN_WEIGHT * long + (1.0 - LONG_RUN_WEIGHT) * short
        });

        Self {
            annual_risk_perc,
            current_price: current_aligned,
        }
    }

    /// Annualised standard deviation as a fraction of price.
    pub fn annual_risk_perc(&self) -> &Series {
        &self.annual_risk_perc
    }
}

impl VolatilitySource for StandardDeviation {
    fn daily_risk_price_terms(&self) -> Series {
        self.annual_risk_price_terms().scale(1.0 / BUSINESS_DAYS_ROOT)
    }

    fn annual_risk_price_terms(&self) -> Series {
        self.annual_risk_perc
            .combine(&self.current_price, |perc, price| perc * price)
    }
}

/// A precomputed daily price-terms volatility series.
#[derive(Debug, Clone)]
pub struct FixedVolatility {
    daily: Series,
}

impl FixedVolatility {
    pub fn new(daily: Series) -> Self {
        Self { daily }
    }
}

impl VolatilitySource for FixedVolatility {
    fn daily_risk_price_terms(&self) -> Series {
        self.daily.clone()
    }
}
