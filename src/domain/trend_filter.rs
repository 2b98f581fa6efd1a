//! EWMAC trend filter.
//!
//! EWMAC(fast, slow)[t] = EWMA(price, fast)[t] - EWMA(price, slow)[t], each
//! average needing two observations. A position survives only on dates where
//! the signal is strictly positive; undefined signal counts as bearish.

use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::ewma::ewma;
use crate::domain::series::Series;

pub const DEFAULT_FAST_SPAN: usize = 16;
pub const DEFAULT_SLOW_SPAN: usize = 64;
const EWMA_MIN_PERIODS: usize = 2;

/// Fast minus slow exponentially weighted moving average of `prices`.
pub fn ewmac(prices: &Series, fast_span: usize, slow_span: usize) -> Series {
    let fast = ewma(prices, fast_span, EWMA_MIN_PERIODS);
    let slow = ewma(prices, slow_span, EWMA_MIN_PERIODS);
    fast.combine(&slow, |f, s| f - s)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendFilter {
    pub fast_span: usize,
    pub slow_span: usize,
}

impl Default for TrendFilter {
    fn default() -> Self {
        Self {
            fast_span: DEFAULT_FAST_SPAN,
            slow_span: DEFAULT_SLOW_SPAN,
        }
    }
}

impl TrendFilter {
    pub fn indicator(&self) -> IndicatorType {
        IndicatorType::Ewmac {
            fast: self.fast_span,
            slow: self.slow_span,
        }
    }

    /// Copy of `positions` with every non-bullish date forced to zero.
    ///
    /// The signal is computed on the price index and carried forward onto
    /// the position index, so position dates the price series skips take
    /// the latest earlier signal.
    pub fn apply(&self, prices: &Series, positions: &Series) -> Series {
        let signal = ewmac(prices, self.fast_span, self.slow_span)
            .reindex_ffill(&positions.dates());

        let filtered = positions
            .points()
            .iter()
            .zip(signal.points())
            .map(|(position, signal)| match signal.value {
                Some(s) if s > 0.0 => position.value,
                _ => Some(0.0),
            });

        positions.with_values(filtered)
    }
}
