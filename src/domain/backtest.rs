//! Backtest engine and event loop.
//!
//! One pass over a validated candle series. On each step `i >= 1` the
//! evaluator is fed candle `i - 1`, the simulator acts on candle `i`, and the
//! tracker samples the resulting balance.

use log::{debug, info};

use crate::domain::candle::{validate_series, Candle};
use crate::domain::error::BacktestError;
use crate::domain::position::Position;
use crate::domain::signal::SignalEvaluator;
use crate::domain::simulator::{OrderParams, PositionSimulator, StepOutcome};
use crate::domain::tracker::{DrawdownPolicy, PerformanceTracker, Summary};
use crate::ports::candle_source::CandleSource;
use crate::ports::result_sink::ResultSink;

/// Balance and order parameters. Factors are fractions (`0.05` = 5%).
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub starting_balance: f64,
    pub order_balance_factor: f64,
    pub take_profit_factor: f64,
    pub stop_loss_factor: f64,
    pub drawdown_policy: DrawdownPolicy,
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        let fields = [
            ("starting_balance", self.starting_balance),
            ("order_balance_factor", self.order_balance_factor),
            ("take_profit_factor", self.take_profit_factor),
            ("stop_loss_factor", self.stop_loss_factor),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(BacktestError::invalid_config(name, "must be a finite number"));
            }
            if value <= 0.0 {
                return Err(BacktestError::invalid_config(
                    name,
                    format!("must be positive, got {value}"),
                ));
            }
        }
        if self.order_balance_factor > 1.0 {
            return Err(BacktestError::invalid_config(
                "order_balance_factor",
                format!("cannot exceed 1, got {}", self.order_balance_factor),
            ));
        }
        if self.stop_loss_factor >= 1.0 {
            return Err(BacktestError::invalid_config(
                "stop_loss_factor",
                format!("must be below 1, got {}", self.stop_loss_factor),
            ));
        }
        Ok(())
    }

    pub fn order_params(&self) -> OrderParams {
        OrderParams {
            order_balance_factor: self.order_balance_factor,
            take_profit_factor: self.take_profit_factor,
            stop_loss_factor: self.stop_loss_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub summary: Summary,
    /// Trades that closed and were handed to the sink.
    pub closed_trades: usize,
    /// Still open after the last candle; not force-closed.
    pub open_position: Option<Position>,
}

pub fn run_backtest(
    candles: &[Candle],
    evaluator: &mut dyn SignalEvaluator,
    config: &BacktestConfig,
    sink: &mut dyn ResultSink,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    validate_series(candles)?;

    info!(
        "running {} over {} candles (warm-up {})",
        evaluator.describe(),
        candles.len(),
        evaluator.warmup_period()
    );

    let mut simulator = PositionSimulator::new(config.starting_balance, config.order_params());
    let mut tracker = PerformanceTracker::new(config.starting_balance, config.drawdown_policy);
    let mut closed_trades = 0;

    for i in 1..candles.len() {
        let signal = evaluator.evaluate(&candles[i - 1]);
        match simulator.step(signal, &candles[i]) {
            StepOutcome::Opened(_) => tracker.on_order_opened(),
            StepOutcome::Closed(event) => {
                sink.record(&event)?;
                closed_trades += 1;
            }
            StepOutcome::Held | StepOutcome::Idle => {}
        }
        tracker.on_step(simulator.balance());
    }

    let open_position = simulator.position().cloned();
    if let Some(pos) = &open_position {
        debug!(
            "position opened at {} still open after the last candle",
            pos.entry_price
        );
    }

    Ok(BacktestResult {
        summary: tracker.summary(),
        closed_trades,
        open_position,
    })
}

/// Fetch one symbol's series from `source` and run it.
pub fn run_from_source(
    source: &dyn CandleSource,
    symbol: &str,
    interval: &str,
    limit: Option<usize>,
    evaluator: &mut dyn SignalEvaluator,
    config: &BacktestConfig,
    sink: &mut dyn ResultSink,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    let candles = source.fetch_candles(symbol, interval, limit)?;
    info!("loaded {} candles for {symbol} {interval}", candles.len());
    run_backtest(&candles, evaluator, config, sink)
}
