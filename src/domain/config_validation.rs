//! Configuration validation.
//!
//! Validates every config field before any data is read.

use crate::domain::error::TrendError;
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;

pub const PORTFOLIO_SECTION: &str = "portfolio";
pub const TREND_SECTION: &str = "trend";
pub const VOLATILITY_SECTION: &str = "volatility";

/// INI section holding one instrument's parameters.
pub fn instrument_section(code: &str) -> String {
    format!("instrument.{}", code)
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), TrendError> {
    validate_capital(config)?;
    validate_risk_target(config)?;
    validate_idm(config)?;
    validate_trend(config)?;
    validate_volatility(config)?;
    let codes = validate_instruments(config)?;
    for code in &codes {
        validate_instrument(config, code)?;
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TrendError {
    TrendError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TrendError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(TrendError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_capital(config: &dyn ConfigPort) -> Result<(), TrendError> {
    require(config, PORTFOLIO_SECTION, "capital")?;
    let value = config.get_double(PORTFOLIO_SECTION, "capital", 0.0);
    if value <= 0.0 || !value.is_finite() {
        return Err(invalid(
            PORTFOLIO_SECTION,
            "capital",
            "capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_target(config: &dyn ConfigPort) -> Result<(), TrendError> {
    let value = config.get_double(PORTFOLIO_SECTION, "risk_target", 0.2);
    if value <= 0.0 || value > 1.0 {
        return Err(invalid(
            PORTFOLIO_SECTION,
            "risk_target",
            "risk_target must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_idm(config: &dyn ConfigPort) -> Result<(), TrendError> {
    let value = config.get_double(PORTFOLIO_SECTION, "idm", 1.0);
    if value < 1.0 {
        return Err(invalid(PORTFOLIO_SECTION, "idm", "idm must be at least 1"));
    }
    Ok(())
}

fn validate_trend(config: &dyn ConfigPort) -> Result<(), TrendError> {
    let fast = config.get_int(TREND_SECTION, "fast_span", 16);
    let slow = config.get_int(TREND_SECTION, "slow_span", 64);
    if fast < 1 {
        return Err(invalid(
            TREND_SECTION,
            "fast_span",
            "fast_span must be at least 1",
        ));
    }
    if slow <= fast {
        return Err(invalid(
            TREND_SECTION,
            "slow_span",
            "slow_span must be greater than fast_span",
        ));
    }
    Ok(())
}

fn validate_volatility(config: &dyn ConfigPort) -> Result<(), TrendError> {
    for (key, default) in [("span", 32), ("long_run_window", 2520), ("min_periods", 10)] {
        if config.get_int(VOLATILITY_SECTION, key, default) < 1 {
            return Err(invalid(
                VOLATILITY_SECTION,
                key,
                &format!("{} must be at least 1", key),
            ));
        }
    }
    Ok(())
}

fn validate_instruments(config: &dyn ConfigPort) -> Result<Vec<String>, TrendError> {
    let list = require(config, PORTFOLIO_SECTION, "instruments")?;
    Ok(parse_codes(&list)?)
}

fn validate_instrument(config: &dyn ConfigPort, code: &str) -> Result<(), TrendError> {
    let section = instrument_section(code);
    if !config.sections().contains(&section) {
        return Err(TrendError::ConfigMissing {
            section,
            key: "multiplier".to_string(),
        });
    }

    require(config, &section, "multiplier")?;
    if config.get_double(&section, "multiplier", 0.0) <= 0.0 {
        return Err(invalid(
            &section,
            "multiplier",
            "multiplier must be positive",
        ));
    }

    if config.get_double(&section, "cost_per_contract", 0.0) < 0.0 {
        return Err(invalid(
            &section,
            "cost_per_contract",
            "cost_per_contract must be non-negative",
        ));
    }

    let weight = config.get_double(&section, "weight", 1.0);
    if !(0.0..=1.0).contains(&weight) {
        return Err(invalid(&section, "weight", "weight must be between 0 and 1"));
    }
    Ok(())
}
