//! Open position and closed-trade records.

use serde::Serialize;

/// A single long position with fixed take-profit and stop-loss bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Balance committed to the trade.
    pub size: f64,
    pub entry_price: f64,
    pub entry_time: i64,
    pub take_profit_price: f64,
    pub stop_loss_price: f64,
}

impl Position {
    pub fn open(
        size: f64,
        entry_price: f64,
        entry_time: i64,
        take_profit_factor: f64,
        stop_loss_factor: f64,
    ) -> Self {
        Position {
            size,
            entry_price,
            entry_time,
            take_profit_price: entry_price * (1.0 + take_profit_factor),
            stop_loss_price: entry_price * (1.0 - stop_loss_factor),
        }
    }

    /// A position with no price bounds; it only closes on an exit signal.
    pub fn unbounded(size: f64, entry_price: f64, entry_time: i64) -> Self {
        Position {
            size,
            entry_price,
            entry_time,
            take_profit_price: f64::INFINITY,
            stop_loss_price: f64::NEG_INFINITY,
        }
    }

    pub fn should_take_profit(&self, high: f64) -> bool {
        high >= self.take_profit_price
    }

    pub fn should_stop_loss(&self, low: f64) -> bool {
        low <= self.stop_loss_price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    SignalExit,
}

impl ExitReason {
    /// Log wording for a close.
    pub fn label(self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "profit taken",
            ExitReason::StopLoss => "loss stopped",
            ExitReason::SignalExit => "exit signal",
        }
    }
}

/// Emitted whenever a position closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvent {
    pub entry_time: i64,
    pub exit_time: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub exit_reason: ExitReason,
    pub pnl: f64,
    /// Balance after the trade settled.
    pub balance: f64,
}
