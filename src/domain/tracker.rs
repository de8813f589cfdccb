//! Running performance statistics for a single backtest pass.

use serde::Serialize;
use std::fmt;

/// Reference balance that drawdown is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawdownPolicy {
    /// `1 - balance / starting_balance`
    #[default]
    StartingBalance,
    /// `1 - balance / peak_balance`, peak including the starting balance.
    PeakBalance,
}

impl DrawdownPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "starting" | "start" | "starting_balance" => Some(DrawdownPolicy::StartingBalance),
            "peak" | "peak_balance" => Some(DrawdownPolicy::PeakBalance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceTracker {
    policy: DrawdownPolicy,
    starting_balance: f64,
    balance: f64,
    peak_balance: f64,
    max_drawdown: f64,
    order_count: usize,
}

/// Final statistics of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub order_count: usize,
    pub starting_balance: f64,
    pub final_balance: f64,
    /// Fraction, not percent.
    pub max_drawdown: f64,
    pub percent_return: f64,
}

impl PerformanceTracker {
    pub fn new(starting_balance: f64, policy: DrawdownPolicy) -> Self {
        PerformanceTracker {
            policy,
            starting_balance,
            balance: starting_balance,
            peak_balance: starting_balance,
            max_drawdown: 0.0,
            order_count: 0,
        }
    }

    pub fn on_step(&mut self, balance: f64) {
        self.balance = balance;
        if balance > self.peak_balance {
            self.peak_balance = balance;
        }
        let reference = match self.policy {
            DrawdownPolicy::StartingBalance => self.starting_balance,
            DrawdownPolicy::PeakBalance => self.peak_balance,
        };
        if reference > 0.0 {
            let drawdown = 1.0 - balance / reference;
            self.max_drawdown = self.max_drawdown.max(drawdown);
        }
    }

    /// Update the balance without sampling drawdown.
    pub fn set_balance(&mut self, balance: f64) {
        self.balance = balance;
    }

    pub fn on_order_opened(&mut self) {
        self.order_count += 1;
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn peak_balance(&self) -> f64 {
        self.peak_balance
    }

    pub fn summary(&self) -> Summary {
        Summary {
            order_count: self.order_count,
            starting_balance: self.starting_balance,
            final_balance: self.balance,
            max_drawdown: self.max_drawdown,
            percent_return: (self.balance - self.starting_balance) / self.starting_balance
                * 100.0,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of orders made: {}", self.order_count)?;
        writeln!(f, "Resulting balance: {:.2}", self.final_balance)?;
        writeln!(f, "Max drawdown: {:.2}%", self.max_drawdown * 100.0)?;
        write!(f, "Balance increase: {:.2}%", self.percent_return)
    }
}
