//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvCandleSource;
use crate::adapters::csv_result_sink::CsvResultSink;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::candle::format_timestamp;
use crate::domain::config_validation::{
    results_path, validate_backtest_config, validate_data_config, validate_starting_balance,
    validate_strategy_config, DataFormat, DataSettings,
};
use crate::domain::crossover::{run_crossover_backtest, CrossoverParams};
use crate::domain::error::BacktestError;
use crate::domain::metrics::TradeStats;
use crate::domain::position::TradeEvent;
use crate::domain::signal::SignalEvaluator;
use crate::domain::strategy::Strategy;
use crate::ports::candle_source::CandleSource;
use crate::ports::result_sink::ResultSink;

#[derive(Parser, Debug)]
#[command(name = "klinetest", about = "Candle-series signal backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        /// Trade log path, overrides [output] results
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            symbol,
            interval,
            output,
            json,
        } => run_backtest_command(
            &config,
            symbol.as_deref(),
            interval.as_deref(),
            output,
            json,
        ),
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Forwards every event to an optional file sink and keeps a copy for
/// trade statistics.
struct TradeRecorder {
    file: Option<CsvResultSink>,
    trades: Vec<TradeEvent>,
}

impl ResultSink for TradeRecorder {
    fn record(&mut self, event: &TradeEvent) -> Result<(), BacktestError> {
        if let Some(file) = self.file.as_mut() {
            file.record(event)?;
        }
        self.trades.push(event.clone());
        Ok(())
    }
}

/// What a validated config runs. The crossover loop sizes its own orders,
/// so it needs only a starting balance.
enum RunPlan {
    Crossover {
        params: CrossoverParams,
        starting_balance: f64,
    },
    Evaluator {
        evaluator: Box<dyn SignalEvaluator>,
        config: BacktestConfig,
    },
}

fn plan_run(adapter: &FileConfigAdapter, strategy: &Strategy) -> Result<RunPlan, BacktestError> {
    match strategy {
        Strategy::MaCrossover(params) => Ok(RunPlan::Crossover {
            params: *params,
            starting_balance: validate_starting_balance(adapter)?,
        }),
        other => {
            let config = validate_backtest_config(adapter)?;
            let evaluator =
                other
                    .build_evaluator()
                    .ok_or_else(|| BacktestError::UnknownStrategy {
                        name: other.name().to_string(),
                    })?;
            Ok(RunPlan::Evaluator { evaluator, config })
        }
    }
}

fn open_source(settings: &DataSettings) -> Result<Box<dyn CandleSource>, BacktestError> {
    match settings.format {
        DataFormat::Csv => Ok(Box::new(CsvCandleSource::new(settings.dir.clone()))),
        #[cfg(feature = "json")]
        DataFormat::Json => Ok(Box::new(
            crate::adapters::json_kline_adapter::JsonKlineSource::new(settings.dir.clone()),
        )),
        #[cfg(not(feature = "json"))]
        DataFormat::Json => Err(BacktestError::ConfigInvalid {
            section: "data".to_string(),
            key: "format".to_string(),
            reason: "json support is disabled in this build".to_string(),
        }),
    }
}

fn run_backtest_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    interval_override: Option<&str>,
    output_override: Option<PathBuf>,
    json: bool,
) -> Result<(), BacktestError> {
    // Stage 1: load and validate config
    info!("loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let strategy = validate_strategy_config(&adapter)?;
    let plan = plan_run(&adapter, &strategy)?;
    let settings = validate_data_config(&adapter, symbol_override, interval_override)?;
    info!("strategy {}: {}", strategy.name(), strategy.describe());

    // Stage 2: fetch candles
    let source = open_source(&settings)?;
    let candles = source.fetch_candles(&settings.symbol, &settings.interval, settings.limit)?;
    info!(
        "loaded {} candles for {} {} from {}",
        candles.len(),
        settings.symbol,
        settings.interval,
        settings.dir.display()
    );

    // Stage 3: run
    let file = match results_path(&adapter, output_override) {
        Some(path) => {
            info!("writing trade log to {}", path.display());
            Some(CsvResultSink::create(path)?)
        }
        None => None,
    };
    let mut recorder = TradeRecorder {
        file,
        trades: Vec::new(),
    };

    let result = match plan {
        RunPlan::Crossover {
            params,
            starting_balance,
        } => run_crossover_backtest(&candles, &params, starting_balance, &mut recorder)?,
        RunPlan::Evaluator {
            mut evaluator,
            config,
        } => run_backtest(&candles, evaluator.as_mut(), &config, &mut recorder)?,
    };

    // Stage 4: report
    let stats = TradeStats::compute(&recorder.trades);
    if json {
        print_json(&strategy, &settings, &result, &stats)
    } else {
        print_text(&strategy, &result, &stats);
        Ok(())
    }
}

fn print_text(strategy: &Strategy, result: &BacktestResult, stats: &TradeStats) {
    println!("Strategy: {}", strategy.describe());
    println!("{}", result.summary);
    println!(
        "Trades closed: {} (won {}, lost {}, win rate {:.2}%)",
        result.closed_trades,
        stats.trades_won,
        stats.trades_lost,
        stats.win_rate * 100.0
    );
    if let Some(pos) = &result.open_position {
        println!(
            "Open position: entered {} at {}",
            format_timestamp(pos.entry_time),
            pos.entry_price
        );
    }
}

#[cfg(feature = "json")]
fn print_json(
    strategy: &Strategy,
    settings: &DataSettings,
    result: &BacktestResult,
    stats: &TradeStats,
) -> Result<(), BacktestError> {
    let report = serde_json::json!({
        "strategy": strategy.name(),
        "description": strategy.describe(),
        "symbol": settings.symbol,
        "interval": settings.interval,
        "summary": result.summary,
        "closed_trades": result.closed_trades,
        "stats": stats,
        "open_position": result.open_position,
    });
    let text = serde_json::to_string_pretty(&report).map_err(|e| BacktestError::ResultSink {
        reason: format!("failed to encode summary: {e}"),
    })?;
    println!("{text}");
    Ok(())
}

#[cfg(not(feature = "json"))]
fn print_json(
    _strategy: &Strategy,
    _settings: &DataSettings,
    _result: &BacktestResult,
    _stats: &TradeStats,
) -> Result<(), BacktestError> {
    Err(BacktestError::invalid_config(
        "--json",
        "json support is disabled in this build",
    ))
}

fn run_validate(config_path: &Path) -> Result<(), BacktestError> {
    info!("validating {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let strategy = validate_strategy_config(&adapter)?;
    let plan = plan_run(&adapter, &strategy)?;
    let settings = validate_data_config(&adapter, None, None)?;

    println!("Configuration OK");
    println!("Symbol: {} {}", settings.symbol, settings.interval);
    match plan {
        RunPlan::Crossover {
            starting_balance, ..
        } => println!("Balance: {starting_balance:.2} (one unit per crossover order)"),
        RunPlan::Evaluator { config, .. } => println!(
            "Balance: {:.2} (order {:.2}%, take profit {:.2}%, stop loss {:.2}%)",
            config.starting_balance,
            config.order_balance_factor * 100.0,
            config.take_profit_factor * 100.0,
            config.stop_loss_factor * 100.0
        ),
    }
    println!("Strategy: {} = {}", strategy.name(), strategy.describe());
    Ok(())
}
