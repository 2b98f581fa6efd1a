//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    PORTFOLIO_SECTION, TREND_SECTION, VOLATILITY_SECTION, instrument_section,
    validate_portfolio_config,
};
use crate::domain::error::TrendError;
use crate::domain::instrument::{InstrumentMap, InstrumentSpec};
use crate::domain::position_sizing::RiskParameters;
use crate::domain::trend_filter::{DEFAULT_FAST_SPAN, DEFAULT_SLOW_SPAN, TrendFilter};
use crate::domain::universe::{parse_codes, validate_universe};
use crate::domain::volatility::VolatilityConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_OUTPUT: &str = "returns.csv";

#[derive(Parser, Debug)]
#[command(
    name = "trendcost",
    about = "Trend-filtered portfolio returns net of trading costs"
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn max_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute trend-filtered net returns and write them as CSV
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a portfolio configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show price history coverage for each configured instrument
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            data_dir,
        } => run_backtest(&config, output.as_deref(), data_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data_dir } => run_info(&config, data_dir.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Load a config file and reject it before any data is read if invalid.
fn load_validated_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let config = load_config(path)?;
    validate_portfolio_config(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    Ok(config)
}

fn run_backtest(config_path: &Path, output: Option<&Path>, data_dir: Option<&Path>) -> ExitCode {
    tracing::info!(config = %config_path.display(), "loading config");
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &config));
    let output = resolve_output(output, &config);
    run_pipeline(&data_port, &CsvReportAdapter, &config, &output)
}

fn get_span(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TrendError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| TrendError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("expected a positive integer, got {}", value),
        })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TrendError> {
    if config.get_string(PORTFOLIO_SECTION, "capital").is_none() {
        return Err(TrendError::ConfigMissing {
            section: PORTFOLIO_SECTION.into(),
            key: "capital".into(),
        });
    }

    let defaults = VolatilityConfig::default();
    Ok(BacktestConfig {
        risk: RiskParameters {
            capital: config.get_double(PORTFOLIO_SECTION, "capital", 0.0),
            risk_target: config.get_double(PORTFOLIO_SECTION, "risk_target", 0.2),
            idm: config.get_double(PORTFOLIO_SECTION, "idm", 1.0),
        },
        trend: TrendFilter {
            fast_span: get_span(config, TREND_SECTION, "fast_span", DEFAULT_FAST_SPAN)?,
            slow_span: get_span(config, TREND_SECTION, "slow_span", DEFAULT_SLOW_SPAN)?,
        },
        volatility: VolatilityConfig {
            span: get_span(config, VOLATILITY_SECTION, "span", defaults.span)?,
            long_run_window: get_span(
                config,
                VOLATILITY_SECTION,
                "long_run_window",
                defaults.long_run_window,
            )?,
            min_periods: get_span(config, VOLATILITY_SECTION, "min_periods", defaults.min_periods)?,
        },
    })
}

pub fn build_instrument_specs(
    config: &dyn ConfigPort,
    codes: &[String],
) -> Result<InstrumentMap<InstrumentSpec>, TrendError> {
    codes
        .iter()
        .map(|code| {
            let section = instrument_section(code);
            if config.get_string(&section, "multiplier").is_none() {
                return Err(TrendError::ConfigMissing {
                    section,
                    key: "multiplier".into(),
                });
            }
            let spec = InstrumentSpec {
                multiplier: config.get_double(&section, "multiplier", 1.0),
                cost_per_contract: config.get_double(&section, "cost_per_contract", 0.0),
                weight: config.get_double(&section, "weight", 1.0),
            };
            Ok((code.clone(), spec))
        })
        .collect()
}

pub fn resolve_instruments(config: &dyn ConfigPort) -> Result<Vec<String>, TrendError> {
    let list = config
        .get_string(PORTFOLIO_SECTION, "instruments")
        .ok_or_else(|| TrendError::ConfigMissing {
            section: PORTFOLIO_SECTION.into(),
            key: "instruments".into(),
        })?;
    Ok(parse_codes(&list)?)
}

pub fn resolve_data_dir(override_dir: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => config
            .get_string(PORTFOLIO_SECTION, "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    }
}

pub fn resolve_output(override_path: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    match override_path {
        Some(path) => path.to_path_buf(),
        None => config
            .get_string(PORTFOLIO_SECTION, "output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
    }
}

/// Universe validation, backtest, console summary and report, against any
/// data and report port.
pub fn run_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    config: &dyn ConfigPort,
    output: &Path,
) -> ExitCode {
    match execute_pipeline(data_port, report_port, config, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn execute_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    config: &dyn ConfigPort,
    output: &Path,
) -> Result<(), TrendError> {
    let bt_config = build_backtest_config(config)?;
    let codes = resolve_instruments(config)?;

    let codes = validate_universe(data_port, codes)?.universe.codes;
    let specs = build_instrument_specs(config, &codes)?;

    tracing::info!(
        instruments = codes.len(),
        indicator = %bt_config.trend.indicator(),
        capital = bt_config.risk.capital,
        "running backtest"
    );
    let result = backtest_engine::run_backtest(data_port, &codes, &specs, &bt_config)?;

    eprint!("{}", returns_summary(&result));

    report_port.write_returns(&result.returns, &result.aggregate, output)?;
    eprintln!("\nReturns written to: {}", output.display());
    Ok(())
}

/// Defined return counts per instrument and for the portfolio.
fn returns_summary(result: &BacktestResult) -> String {
    let mut out = String::from("\n=== Net Returns ===\n");
    for (code, returns) in &result.returns {
        out.push_str(&format!("  {}:  {} dates\n", code, returns.defined_count()));
    }
    out.push_str(&format!(
        "  portfolio:  {} dates\n",
        result.aggregate.defined_count()
    ));
    out
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_validated_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let specs = match resolve_instruments(&config)
        .and_then(|codes| build_instrument_specs(&config, &codes))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("Instruments:");
    for (code, spec) in &specs {
        println!(
            "  {}: multiplier {}, cost per contract {}, weight {}",
            code, spec.multiplier, spec.cost_per_contract, spec.weight
        );
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, data_dir: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &config));

    let codes = match config.get_string(PORTFOLIO_SECTION, "instruments") {
        Some(_) => resolve_instruments(&config),
        None => data_port.list_instruments(),
    };
    let codes = match codes {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for code in &codes {
        match data_port.fetch_prices(code) {
            Ok(prices) => match (prices.adjusted.first(), prices.adjusted.last()) {
                (Some(first), Some(last)) => println!(
                    "{}: {} observations, {} to {}",
                    code,
                    prices.adjusted.defined_count(),
                    first.date,
                    last.date
                ),
                _ => eprintln!("{}: no data found", code),
            },
            Err(e) => eprintln!("error reading {}: {}", code, e),
        }
    }
    ExitCode::SUCCESS
}
