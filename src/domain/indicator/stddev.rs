//! Exponentially weighted standard deviation.
//!
//! Adjusted weighting as in [`ewma`](super::ewma), with the unbiased
//! correction factor (sum w)^2 / ((sum w)^2 - sum w^2) applied to the
//! weighted variance. A single observation has no defined deviation.

use crate::domain::indicator::alpha_for_span;
use crate::domain::series::Series;

pub fn ewm_std(series: &Series, span: usize, min_periods: usize) -> Series {
    if span == 0 {
        return series.with_values(std::iter::empty());
    }

    let decay = 1.0 - alpha_for_span(span);
    let mut mean: Option<f64> = None;
    let mut variance = 0.0_f64;
    let mut sum_weight = 1.0_f64;
    let mut sum_weight_sq = 1.0_f64;
    let mut old_weight = 1.0_f64;
    let mut observations = 0usize;

    let values: Vec<Option<f64>> = series
        .points()
        .iter()
        .map(|point| {
            match (mean, point.value) {
                (None, Some(x)) => {
                    mean = Some(x);
                    observations += 1;
                }
                (Some(old_mean), Some(x)) => {
                    sum_weight *= decay;
                    sum_weight_sq *= decay * decay;
                    old_weight *= decay;

                    let new_mean = if old_mean != x {
                        (old_weight * old_mean + x) / (old_weight + 1.0)
                    } else {
                        old_mean
                    };
                    let shift = old_mean - new_mean;
                    let dev = x - new_mean;
                    variance = (old_weight * (variance + shift * shift) + dev * dev)
                        / (old_weight + 1.0);

                    mean = Some(new_mean);
                    sum_weight += 1.0;
                    sum_weight_sq += 1.0;
                    old_weight += 1.0;
                    observations += 1;
                }
                (Some(_), None) => {
                    sum_weight *= decay;
                    sum_weight_sq *= decay * decay;
                    old_weight *= decay;
                }
                (None, None) => {}
            }

            if observations < min_periods.max(1) {
                return None;
            }
            let numerator = sum_weight * sum_weight;
            let denominator = numerator - sum_weight_sq;
            if denominator > 0.0 {
                Some((numerator / denominator * variance).max(0.0).sqrt())
            } else {
                None
            }
        })
        .collect();

    series.with_values(values)
}
