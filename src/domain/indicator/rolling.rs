//! Rolling mean over a fixed window of points.
//!
//! The window counts points, defined or not; the mean uses only the defined
//! values inside it and needs at least `min_periods` of them.

use crate::domain::series::Series;
use std::collections::VecDeque;

pub fn rolling_mean(series: &Series, window: usize, min_periods: usize) -> Series {
    if window == 0 {
        return series.with_values(std::iter::empty());
    }

    let mut buffer: VecDeque<Option<f64>> = VecDeque::with_capacity(window);
    let mut sum = 0.0_f64;
    let mut count = 0usize;

    let values: Vec<Option<f64>> = series
        .points()
        .iter()
        .map(|point| {
            if buffer.len() == window {
                if let Some(Some(old)) = buffer.pop_front() {
                    sum -= old;
                    count -= 1;
                }
            }
            buffer.push_back(point.value);
            if let Some(v) = point.value {
                sum += v;
                count += 1;
            }
            if count >= min_periods.max(1) {
                Some(sum / count as f64)
            } else {
                None
            }
        })
        .collect();

    series.with_values(values)
}
