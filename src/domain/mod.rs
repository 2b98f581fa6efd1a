//! Core domain types and logic.

pub mod series;
pub mod indicator;
pub mod volatility;
pub mod trend_filter;
pub mod costs;
pub mod returns;
pub mod instrument;
pub mod fx;
pub mod position_sizing;
pub mod portfolio;
pub mod backtest;
pub mod universe;
pub mod config_validation;
pub mod error;
