//! Moving-average crossover backtest.
//!
//! Unlike the take-profit/stop-loss loop, this variant trades one unit on
//! the crossing itself: both averages are computed on candle `i` including
//! its own close, a buy fills at that close when fast > slow and flat, a sell
//! fills at that close when fast < slow and holding. The first candle only
//! feeds the averages, and nothing trades until both are warm. The EMA is
//! seeded with the first close, so it is warm from candle 1 on. Drawdown is
//! sampled after each sell against the peak balance.

use log::{debug, info};
use std::fmt;

use crate::domain::backtest::BacktestResult;
use crate::domain::candle::{format_timestamp, validate_series, Candle};
use crate::domain::error::BacktestError;
use crate::domain::indicator::ema::Ema;
use crate::domain::indicator::{sma, CandleWindow};
use crate::domain::position::{ExitReason, Position, TradeEvent};
use crate::domain::tracker::{DrawdownPolicy, PerformanceTracker};
use crate::ports::result_sink::ResultSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaType {
    Sma,
    Ema,
}

impl MaType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sma" => Some(MaType::Sma),
            "ema" => Some(MaType::Ema),
            _ => None,
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaType::Sma => write!(f, "SMA"),
            MaType::Ema => write!(f, "EMA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub ma_type: MaType,
}

impl CrossoverParams {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.fast_period == 0 {
            return Err(BacktestError::invalid_config("fast_period", "must be at least 1"));
        }
        if self.slow_period == 0 {
            return Err(BacktestError::invalid_config("slow_period", "must be at least 1"));
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!(
            "CROSSOVER({}({}), {}({}))",
            self.ma_type, self.fast_period, self.ma_type, self.slow_period
        )
    }
}

enum MovingAverage {
    Simple { period: usize, window: CandleWindow },
    Exponential(Ema),
}

impl MovingAverage {
    fn new(ma_type: MaType, period: usize) -> Self {
        match ma_type {
            MaType::Sma => MovingAverage::Simple {
                period,
                window: CandleWindow::new(period),
            },
            MaType::Ema => MovingAverage::Exponential(Ema::new(period)),
        }
    }

    fn update(&mut self, candle: &Candle) -> Option<f64> {
        match self {
            MovingAverage::Simple { period, window } => {
                window.push(candle);
                sma(window.closes(), *period)
            }
            MovingAverage::Exponential(ema) => ema.update(candle.close),
        }
    }
}

pub fn run_crossover_backtest(
    candles: &[Candle],
    params: &CrossoverParams,
    starting_balance: f64,
    sink: &mut dyn ResultSink,
) -> Result<BacktestResult, BacktestError> {
    params.validate()?;
    if !starting_balance.is_finite() || starting_balance <= 0.0 {
        return Err(BacktestError::invalid_config(
            "starting_balance",
            format!("must be positive, got {starting_balance}"),
        ));
    }
    validate_series(candles)?;

    info!(
        "running {} over {} candles",
        params.describe(),
        candles.len()
    );

    let mut fast = MovingAverage::new(params.ma_type, params.fast_period);
    let mut slow = MovingAverage::new(params.ma_type, params.slow_period);
    let mut tracker = PerformanceTracker::new(starting_balance, DrawdownPolicy::PeakBalance);
    let mut balance = starting_balance;
    let mut holding: Option<Position> = None;
    let mut closed_trades = 0;

    for (i, candle) in candles.iter().enumerate() {
        let (Some(fast_ma), Some(slow_ma)) = (fast.update(candle), slow.update(candle)) else {
            continue;
        };
        if i == 0 {
            continue;
        }

        match holding.take() {
            None if fast_ma > slow_ma => {
                balance -= candle.close;
                tracker.on_order_opened();
                tracker.set_balance(balance);
                debug!(
                    "buy at {} price {}",
                    format_timestamp(candle.open_time),
                    candle.close
                );
                holding = Some(Position::unbounded(
                    candle.close,
                    candle.close,
                    candle.open_time,
                ));
            }
            Some(pos) if fast_ma < slow_ma => {
                balance += candle.close;
                // sells count as orders too
                tracker.on_order_opened();
                let event = TradeEvent {
                    entry_time: pos.entry_time,
                    exit_time: candle.open_time,
                    entry_price: pos.entry_price,
                    exit_price: candle.close,
                    size: pos.size,
                    exit_reason: ExitReason::SignalExit,
                    pnl: candle.close - pos.entry_price,
                    balance,
                };
                info!(
                    "sell at {}, open price: {}, balance {:.2}",
                    format_timestamp(candle.open_time),
                    pos.entry_price,
                    balance
                );
                sink.record(&event)?;
                closed_trades += 1;
                tracker.on_step(balance);
            }
            other => holding = other,
        }
    }

    Ok(BacktestResult {
        summary: tracker.summary(),
        closed_trades,
        open_position: holding,
    })
}
