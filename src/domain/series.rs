//! Date-indexed time series with explicit undefined values.
//!
//! A [`Series`] is a strictly ascending sequence of dated points. Undefined
//! values are `None` and propagate through arithmetic: any operation with an
//! undefined operand yields an undefined result. `NaN` never appears inside a
//! series; it is normalised to `None` on the way in.

use crate::domain::error::TrendError;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

fn defined(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

impl Series {
    /// Build a series, rejecting dates that are not strictly ascending.
    pub fn new(points: Vec<SeriesPoint>) -> Result<Self, TrendError> {
        if let Some(w) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(TrendError::UnorderedSeries {
                reason: format!("{} is not before {}", w[0].date, w[1].date),
            });
        }
        let points = points
            .into_iter()
            .map(|p| SeriesPoint {
                date: p.date,
                value: p.value.and_then(defined),
            })
            .collect();
        Ok(Self { points })
    }

    pub fn from_pairs<I>(pairs: I) -> Result<Self, TrendError>
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| SeriesPoint { date, value })
                .collect(),
        )
    }

    pub fn from_values(dates: &[NaiveDate], values: &[f64]) -> Result<Self, TrendError> {
        if dates.len() != values.len() {
            return Err(TrendError::Data {
                reason: format!(
                    "{} dates but {} values",
                    dates.len(),
                    values.len()
                ),
            });
        }
        Self::from_pairs(dates.iter().copied().zip(values.iter().map(|&v| Some(v))))
    }

    /// A series holding `value` on every date of `like`.
    pub fn constant_like(like: &Series, value: f64) -> Series {
        like.map_points(|_| defined(value))
    }

    /// Same index, new values. Missing trailing values are undefined.
    pub fn with_values<I>(&self, values: I) -> Series
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut values = values.into_iter();
        self.map_points(|_| values.next().flatten().and_then(defined))
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points holding a defined value.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Value at exactly `date`; `None` if absent or undefined.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .and_then(|i| self.points[i].value)
    }

    /// Shift values forward by `periods` positions on the same index.
    pub fn shift(&self, periods: usize) -> Series {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| SeriesPoint {
                date: p.date,
                value: if i >= periods {
                    self.points[i - periods].value
                } else {
                    None
                },
            })
            .collect();
        Series { points }
    }

    /// First difference; the first point is undefined.
    pub fn diff(&self) -> Series {
        self.combine(&self.shift(1), |a, b| a - b)
    }

    /// Reindex onto `index`, taking for each target date the point with the
    /// latest date at or before it. Targets before the first point are
    /// undefined. The value carried is whatever that point holds, defined or
    /// not.
    pub fn reindex_ffill(&self, index: &[NaiveDate]) -> Series {
        let mut cursor = 0usize;
        let mut current: Option<Option<f64>> = None;
        let mut points = Vec::with_capacity(index.len());
        let mut previous: Option<NaiveDate> = None;

        for &date in index {
            if previous.is_some_and(|p| date < p) {
                cursor = 0;
                current = None;
            }
            while cursor < self.points.len() && self.points[cursor].date <= date {
                current = Some(self.points[cursor].value);
                cursor += 1;
            }
            points.push(SeriesPoint {
                date,
                value: current.flatten(),
            });
            previous = Some(date);
        }
        Series { points }
    }

    /// Combine with `other` on this series' index. Dates absent from
    /// `other` are undefined in the result.
    pub fn combine<F>(&self, other: &Series, f: F) -> Series
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut j = 0usize;
        let points = self
            .points
            .iter()
            .map(|p| {
                while j < other.points.len() && other.points[j].date < p.date {
                    j += 1;
                }
                let rhs = other
                    .points
                    .get(j)
                    .filter(|o| o.date == p.date)
                    .and_then(|o| o.value);
                let value = match (p.value, rhs) {
                    (Some(a), Some(b)) => defined(f(a, b)),
                    _ => None,
                };
                SeriesPoint {
                    date: p.date,
                    value,
                }
            })
            .collect();
        Series { points }
    }

    pub fn map<F>(&self, f: F) -> Series
    where
        F: Fn(f64) -> f64,
    {
        self.map_points(|p| p.value.and_then(|v| defined(f(v))))
    }

    fn map_points<F>(&self, mut f: F) -> Series
    where
        F: FnMut(&SeriesPoint) -> Option<f64>,
    {
        Series {
            points: self
                .points
                .iter()
                .map(|p| SeriesPoint {
                    date: p.date,
                    value: f(p),
                })
                .collect(),
        }
    }

    /// Round half to even, matching the usual dataframe convention.
    pub fn round(&self) -> Series {
        self.map(f64::round_ties_even)
    }

    pub fn abs(&self) -> Series {
        self.map(f64::abs)
    }

    pub fn scale(&self, factor: f64) -> Series {
        self.map(|v| v * factor)
    }

    /// Sorted union of the indices of `series`.
    pub fn union_index(series: &[&Series]) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.date))
            .collect();
        dates.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a SeriesPoint;
    type IntoIter = std::slice::Iter<'a, SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
