//! Exponentially weighted moving average.
//!
//! Adjusted weighting: y[t] = sum((1-a)^i * x[t-i]) / sum((1-a)^i), a = 2/(span+1).
//! Recursively, with w the accumulated weight of past observations:
//!   w <- w * (1-a);  y <- (w*y + x) / (w + 1);  w <- w + 1
//! Undefined inputs decay w without contributing; the previous average is
//! carried on their dates.

use crate::domain::indicator::alpha_for_span;
use crate::domain::series::Series;

pub fn ewma(series: &Series, span: usize, min_periods: usize) -> Series {
    if span == 0 {
        return series.with_values(std::iter::empty());
    }

    let decay = 1.0 - alpha_for_span(span);
    let mut average: Option<f64> = None;
    let mut old_weight = 1.0_f64;
    let mut observations = 0usize;

    let values: Vec<Option<f64>> = series
        .points()
        .iter()
        .map(|point| {
            match (average, point.value) {
                (None, Some(x)) => {
                    average = Some(x);
                    old_weight = 1.0;
                    observations += 1;
                }
                (Some(avg), Some(x)) => {
                    old_weight *= decay;
                    if avg != x {
                        average = Some((old_weight * avg + x) / (old_weight + 1.0));
                    }
                    old_weight += 1.0;
                    observations += 1;
                }
                (Some(_), None) => old_weight *= decay,
                (None, None) => {}
            }
            average.filter(|_| observations >= min_periods.max(1))
        })
        .collect();

    series.with_values(values)
}
