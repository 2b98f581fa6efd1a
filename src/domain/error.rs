//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for trendcost.
#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("instrument {code} is missing from the {input} input")]
    MissingInstrument { code: String, input: String },

    #[error("degenerate volatility: {reason}")]
    DegenerateVolatility { reason: String },

    #[error("capital must be positive, got {capital}")]
    NonPositiveCapital { capital: f64 },

    #[error("unordered series: {reason}")]
    UnorderedSeries { reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient data for {code}: have {observations} observations, need {minimum}")]
    InsufficientData {
        code: String,
        observations: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrendError {
    pub(crate) fn missing(code: &str, input: &str) -> Self {
        TrendError::MissingInstrument {
            code: code.to_string(),
            input: input.to_string(),
        }
    }
}

impl From<&TrendError> for std::process::ExitCode {
    fn from(err: &TrendError) -> Self {
        let code: u8 = match err {
            TrendError::Io(_) => 1,
            TrendError::ConfigParse { .. }
            | TrendError::ConfigMissing { .. }
            | TrendError::ConfigInvalid { .. }
            | TrendError::Universe(_) => 2,
            TrendError::Data { .. }
            | TrendError::UnorderedSeries { .. }
            | TrendError::InsufficientData { .. } => 3,
            TrendError::MissingInstrument { .. } => 4,
            TrendError::DegenerateVolatility { .. } | TrendError::NonPositiveCapital { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
