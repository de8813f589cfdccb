//! Single-position order simulation.
//!
//! Two states: flat, or holding exactly one [`Position`]. Each step makes at
//! most one transition:
//! - flat + entry signal → open at the candle's close
//! - holding + high reaches take-profit → close in profit
//! - holding + low reaches stop-loss → close at a loss
//!
//! When one candle touches both bounds, take-profit wins. The order of the
//! two touches inside a candle is unknown, so this is a fixed policy.

use log::{debug, info};

use crate::domain::candle::{format_timestamp, Candle};
use crate::domain::position::{ExitReason, Position, TradeEvent};

/// Sizing and exit parameters, all fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderParams {
    pub order_balance_factor: f64,
    pub take_profit_factor: f64,
    pub stop_loss_factor: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum SimulatorState {
    Flat,
    InPosition(Position),
}

/// Outcome of one simulator step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Idle,
    Opened(Position),
    Held,
    Closed(TradeEvent),
}

#[derive(Debug, Clone)]
pub struct PositionSimulator {
    params: OrderParams,
    balance: f64,
    state: SimulatorState,
    entries: usize,
}

impl PositionSimulator {
    pub fn new(starting_balance: f64, params: OrderParams) -> Self {
        PositionSimulator {
            params,
            balance: starting_balance,
            state: SimulatorState::Flat,
            entries: 0,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn position(&self) -> Option<&Position> {
        match &self.state {
            SimulatorState::InPosition(p) => Some(p),
            SimulatorState::Flat => None,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, SimulatorState::Flat)
    }

    /// Number of flat → in-position transitions so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Advance one candle. `signal` is the evaluator's verdict on the
    /// previous candle; it is ignored while a position is open.
    pub fn step(&mut self, signal: bool, candle: &Candle) -> StepOutcome {
        match &self.state {
            SimulatorState::Flat => {
                if !signal {
                    return StepOutcome::Idle;
                }
                let position = Position::open(
                    self.params.order_balance_factor * self.balance,
                    candle.close,
                    candle.open_time,
                    self.params.take_profit_factor,
                    self.params.stop_loss_factor,
                );
                debug!(
                    "opened position at {} price {} size {:.2} (tp {:.2}, sl {:.2})",
                    format_timestamp(candle.open_time),
                    position.entry_price,
                    position.size,
                    position.take_profit_price,
                    position.stop_loss_price
                );
                self.entries += 1;
                self.state = SimulatorState::InPosition(position.clone());
                StepOutcome::Opened(position)
            }
            SimulatorState::InPosition(position) => {
                let (reason, exit_price, pnl) = if position.should_take_profit(candle.high) {
                    (
                        ExitReason::TakeProfit,
                        position.take_profit_price,
                        position.size * self.params.take_profit_factor,
                    )
                } else if position.should_stop_loss(candle.low) {
                    (
                        ExitReason::StopLoss,
                        position.stop_loss_price,
                        -position.size * self.params.stop_loss_factor,
                    )
                } else {
                    return StepOutcome::Held;
                };

                self.balance += pnl;
                let event = TradeEvent {
                    entry_time: position.entry_time,
                    exit_time: candle.open_time,
                    entry_price: position.entry_price,
                    exit_price,
                    size: position.size,
                    exit_reason: reason,
                    pnl,
                    balance: self.balance,
                };
                info!(
                    "{} at {}, open price: {}, balance {:.2}",
                    reason.label(),
                    format_timestamp(candle.open_time),
                    event.entry_price,
                    event.balance
                );
                self.state = SimulatorState::Flat;
                StepOutcome::Closed(event)
            }
        }
    }
}
