//! Exponentially weighted and rolling indicators over a [`Series`].
//!
//! All indicators follow the same conventions:
//! - output index equals input index
//! - undefined inputs are skipped, but exponential decay still advances
//!   across them
//! - points before `min_periods` defined observations are undefined
//!
//! [`Series`]: crate::domain::series::Series

pub mod ewma;
pub mod rolling;
pub mod stddev;

use std::fmt;

/// Indicator identity plus parameters, used to label log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    EwmStd(usize),
    RollingMean(usize),
    Ewmac { fast: usize, slow: usize },
}

/// Smoothing factor for a span: `2 / (span + 1)`.
pub fn alpha_for_span(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::EwmStd(span) => write!(f, "EWMSTD({})", span),
            IndicatorType::RollingMean(window) => write!(f, "MEAN({})", window),
            IndicatorType::Ewmac { fast, slow } => write!(f, "EWMAC({},{})", fast, slow),
        }
    }
}
