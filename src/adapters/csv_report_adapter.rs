//! CSV report adapter: one row per date, one column per instrument plus the
//! aggregated portfolio column. Undefined values are written as blank cells.

use crate::domain::error::TrendError;
use crate::domain::instrument::InstrumentMap;
use crate::domain::series::Series;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub const PORTFOLIO_COLUMN: &str = "portfolio";

pub struct CsvReportAdapter;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_returns(
        &self,
        returns: &InstrumentMap<Series>,
        aggregate: &Series,
        output_path: &Path,
    ) -> Result<(), TrendError> {
        let mut all: Vec<&Series> = returns.values().collect();
        all.push(aggregate);
        let index = Series::union_index(&all);

        let mut wtr = csv::Writer::from_path(output_path).map_err(std::io::Error::other)?;

        let mut header = vec!["date".to_string()];
        header.extend(returns.keys().cloned());
        header.push(PORTFOLIO_COLUMN.to_string());
        wtr.write_record(&header).map_err(std::io::Error::other)?;

        for date in index {
            let mut row = vec![date.format("%Y-%m-%d").to_string()];
            row.extend(returns.values().map(|s| cell(s.get(date))));
            row.push(cell(aggregate.get(date)));
            wtr.write_record(&row).map_err(std::io::Error::other)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
