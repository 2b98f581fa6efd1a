//! Instrument universe.
//!
//! Parses instrument lists from configuration and validates that each
//! instrument has enough price history to size and filter positions.

use crate::domain::error::TrendError;
use crate::ports::data_port::DataPort;
use std::collections::HashSet;

pub const MIN_PRICE_OBSERVATIONS: usize = 30;

#[derive(Debug, Clone)]
pub struct Universe {
    pub codes: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.codes.len()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in instrument list")]
    EmptyToken,

    #[error("duplicate instrument: {0}")]
    DuplicateCode(String),
}

/// Split a comma-separated instrument list. Codes are trimmed and
/// lowercased, matching INI section names.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_lowercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

#[derive(Debug)]
pub struct UniverseValidationResult {
    pub universe: Universe,
    pub skipped: Vec<SkippedCode>,
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientObservations { observations: usize },
}

pub fn validate_universe(
    data_port: &dyn DataPort,
    codes: Vec<String>,
) -> Result<UniverseValidationResult, TrendError> {
    let mut valid_codes = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        let prices = match data_port.fetch_prices(&code) {
            Ok(data) => data.adjusted,
            Err(e) => {
                tracing::warn!(instrument = %code, error = %e, "skipping instrument");
                skipped.push(SkippedCode {
                    code,
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        let observations = prices.defined_count();
        if observations == 0 {
            tracing::warn!(instrument = %code, "skipping instrument, no prices found");
            skipped.push(SkippedCode {
                code,
                reason: SkipReason::NoData,
            });
            continue;
        }

        if observations < MIN_PRICE_OBSERVATIONS {
            tracing::warn!(
                instrument = %code,
                observations,
                minimum = MIN_PRICE_OBSERVATIONS,
                "skipping instrument, insufficient prices"
            );
            skipped.push(SkippedCode {
                code,
                reason: SkipReason::InsufficientObservations { observations },
            });
            continue;
        }

        tracing::info!(instrument = %code, observations, "instrument ok");
        valid_codes.push(code);
    }

    if valid_codes.is_empty() {
        return Err(TrendError::InsufficientData {
            code: "all".to_string(),
            observations: 0,
            minimum: MIN_PRICE_OBSERVATIONS,
        });
    }

    if !skipped.is_empty() {
        tracing::info!(
            valid = valid_codes.len(),
            total = valid_codes.len() + skipped.len(),
            "running on a reduced universe"
        );
    }

    Ok(UniverseValidationResult {
        universe: Universe { codes: valid_codes },
        skipped,
    })
}
