//! Report generation port trait.

use crate::domain::error::TrendError;
use crate::domain::instrument::InstrumentMap;
use crate::domain::series::Series;
use std::path::Path;

/// Port for writing return series.
pub trait ReportPort {
    fn write_returns(
        &self,
        returns: &InstrumentMap<Series>,
        aggregate: &Series,
        output_path: &Path,
    ) -> Result<(), TrendError>;
}
