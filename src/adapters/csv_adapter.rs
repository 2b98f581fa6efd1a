//! CSV file data adapter.
//!
//! Layout under the base directory, one set of files per instrument:
//! - `<code>_prices.csv`    `date,price[,current]`  (required)
//! - `<code>_positions.csv` `date,position`         (optional)
//! - `<code>_fx.csv`        `date,fx`               (optional)
//!
//! Dates are `YYYY-MM-DD`. Empty cells are undefined values.

use crate::domain::error::TrendError;
use crate::domain::series::Series;
use crate::ports::data_port::{DataPort, PriceData};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const PRICES_SUFFIX: &str = "_prices.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, kind: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, kind))
    }
}

struct Table {
    dates: Vec<NaiveDate>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl Table {
    fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    fn series(&self, name: &str, path: &Path) -> Result<Series, TrendError> {
        let values = self.column(name).ok_or_else(|| TrendError::Data {
            reason: format!("{}: missing {} column", path.display(), name),
        })?;
        Series::from_pairs(self.dates.iter().copied().zip(values.iter().copied()))
    }
}

fn read_table(path: &Path) -> Result<Table, TrendError> {
    let content = fs::read_to_string(path).map_err(|e| TrendError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| TrendError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    if headers.first().map(String::as_str) != Some("date") {
        return Err(TrendError::Data {
            reason: format!("{}: first column must be date", path.display()),
        });
    }

    let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| TrendError::Data {
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        })?;

        let date_str = record.get(0).ok_or_else(|| TrendError::Data {
            reason: "missing date column".into(),
        })?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
            TrendError::Data {
                reason: format!("invalid date {:?} in {}: {}", date_str, path.display(), e),
            }
        })?;

        let mut values = Vec::with_capacity(headers.len() - 1);
        for (i, name) in headers.iter().enumerate().skip(1) {
            let cell = record.get(i).unwrap_or("");
            let value = if cell.is_empty() {
                None
            } else {
                Some(cell.parse::<f64>().map_err(|e| TrendError::Data {
                    reason: format!("invalid {} value {:?} on {}: {}", name, cell, date, e),
                })?)
            };
            values.push(value);
        }
        rows.push((date, values));
    }

    rows.sort_by_key(|(date, _)| *date);

    let dates = rows.iter().map(|(d, _)| *d).collect();
    let columns = headers
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, name)| (name.clone(), rows.iter().map(|(_, v)| v[i]).collect()))
        .collect();

    Ok(Table { dates, columns })
}

fn read_optional(path: &Path, column: &str) -> Result<Option<Series>, TrendError> {
    if !path.exists() {
        return Ok(None);
    }
    read_table(path)?.series(column, path).map(Some)
}

impl DataPort for CsvAdapter {
    fn fetch_prices(&self, code: &str) -> Result<PriceData, TrendError> {
        let path = self.csv_path(code, "prices");
        let table = read_table(&path)?;
        let adjusted = table.series("price", &path)?;
        let current = match table.column("current") {
            Some(_) => table.series("current", &path)?,
            None => adjusted.clone(),
        };
        Ok(PriceData { adjusted, current })
    }

    fn fetch_positions(&self, code: &str) -> Result<Option<Series>, TrendError> {
        read_optional(&self.csv_path(code, "positions"), "position")
    }

    fn fetch_fx(&self, code: &str) -> Result<Option<Series>, TrendError> {
        read_optional(&self.csv_path(code, "fx"), "fx")
    }

    fn list_instruments(&self) -> Result<Vec<String>, TrendError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TrendError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut codes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TrendError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(PRICES_SUFFIX) {
                codes.push(code.to_string());
            }
        }

        codes.sort();
        Ok(codes)
    }
}
