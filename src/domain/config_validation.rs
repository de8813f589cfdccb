//! Configuration validation.
//!
//! Reads and checks every config field before any candle data is loaded.
//! The three order parameters are written in percent in the INI file and
//! become fractions here.

use std::path::PathBuf;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::BacktestError;
use crate::domain::strategy::Strategy;
use crate::domain::tracker::DrawdownPolicy;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

/// Where and what to load.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub symbol: String,
    pub interval: String,
    pub limit: Option<usize>,
    pub dir: PathBuf,
    pub format: DataFormat,
}

/// Only the starting balance; the crossover loop sizes its own orders.
pub fn validate_starting_balance(config: &dyn ConfigPort) -> Result<f64, BacktestError> {
    let starting_balance = require_double(config, "backtest", "starting_balance")?;
    if starting_balance <= 0.0 {
        return Err(invalid("backtest", "starting_balance", "starting_balance must be positive"));
    }
    Ok(starting_balance)
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BacktestError> {
    let starting_balance = validate_starting_balance(config)?;

    let order_balance = require_double(config, "backtest", "order_balance")?;
    if order_balance <= 0.0 || order_balance > 100.0 {
        return Err(invalid(
            "backtest",
            "order_balance",
            "order_balance must be between 0 and 100 percent",
        ));
    }

    let take_profit = require_double(config, "backtest", "take_profit")?;
    if take_profit <= 0.0 {
        return Err(invalid("backtest", "take_profit", "take_profit must be positive"));
    }

    let stop_loss = require_double(config, "backtest", "stop_loss")?;
    if stop_loss <= 0.0 || stop_loss >= 100.0 {
        return Err(invalid(
            "backtest",
            "stop_loss",
            "stop_loss must be between 0 and 100 percent",
        ));
    }

    let drawdown_policy = match config.get_string("backtest", "drawdown") {
        None => DrawdownPolicy::default(),
        Some(s) => DrawdownPolicy::parse(&s).ok_or_else(|| {
            invalid(
                "backtest",
                "drawdown",
                &format!("expected starting or peak, got {s}"),
            )
        })?,
    };

    let backtest = BacktestConfig {
        starting_balance,
        order_balance_factor: order_balance * 0.01,
        take_profit_factor: take_profit * 0.01,
        stop_loss_factor: stop_loss * 0.01,
        drawdown_policy,
    };
    backtest.validate()?;
    Ok(backtest)
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<Strategy, BacktestError> {
    Strategy::from_config(config)
}

/// Data location and series selection. CLI overrides win over the file.
pub fn validate_data_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    interval_override: Option<&str>,
) -> Result<DataSettings, BacktestError> {
    let symbol = non_empty(symbol_override.map(str::to_string), config, "symbol")?;
    let interval = non_empty(interval_override.map(str::to_string), config, "interval")?;

    let limit = match config.get_string("backtest", "limit") {
        None => None,
        Some(s) => match s.trim().parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => return Err(invalid("backtest", "limit", "limit must be a positive integer")),
        },
    };

    let dir = config
        .get_string("data", "dir")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let format = match config.get_string("data", "format") {
        None => DataFormat::Csv,
        Some(s) => match s.trim().to_lowercase().as_str() {
            "csv" => DataFormat::Csv,
            "json" if cfg!(feature = "json") => DataFormat::Json,
            "json" => {
                return Err(invalid(
                    "data",
                    "format",
                    "json support is disabled in this build",
                ))
            }
            other => {
                return Err(invalid(
                    "data",
                    "format",
                    &format!("expected csv or json, got {other}"),
                ))
            }
        },
    };

    Ok(DataSettings {
        symbol,
        interval,
        limit,
        dir,
        format,
    })
}

/// Path of the trade log, if one is configured.
pub fn results_path(config: &dyn ConfigPort, path_override: Option<PathBuf>) -> Option<PathBuf> {
    path_override.or_else(|| {
        config
            .get_string("output", "results")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    })
}

fn require_double(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, BacktestError> {
    match config.get_double(section, key)? {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(invalid(section, key, &format!("{key} must be finite, got {v}"))),
        None => Err(BacktestError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn non_empty(
    value: Option<String>,
    config: &dyn ConfigPort,
    key: &str,
) -> Result<String, BacktestError> {
    value
        .or_else(|| config.get_string("backtest", key))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BacktestError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        })
}

fn invalid(section: &str, key: &str, reason: &str) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
