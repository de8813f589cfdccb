//! Entry-signal evaluators.
//!
//! A [`SignalEvaluator`] is fed every candle of the series in time order and
//! answers whether to enter a position after that candle. Evaluators keep
//! their own rolling history, return `false` until warmed up, and never look
//! ahead.
//!
//! [`AllOf`] and [`AnyOf`] combine base conditions from [`conditions`]. Both
//! feed every child on every call so each child's history stays complete.

pub mod conditions;

pub use conditions::{
    CloseAboveSma, DmiBullish, PinBarReversal, RsiBelow, SmaAbove, SmaCrossUp, StochasticBelow,
};

use crate::domain::candle::Candle;

pub trait SignalEvaluator {
    /// Consume the next candle and report whether to enter.
    fn evaluate(&mut self, candle: &Candle) -> bool;

    /// Number of candles needed before the evaluator can return `true`.
    fn warmup_period(&self) -> usize;

    fn describe(&self) -> String;
}

impl<T: SignalEvaluator + ?Sized> SignalEvaluator for Box<T> {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        (**self).evaluate(candle)
    }

    fn warmup_period(&self) -> usize {
        (**self).warmup_period()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Logical AND of its children. An empty set never signals.
pub struct AllOf {
    children: Vec<Box<dyn SignalEvaluator>>,
}

impl AllOf {
    pub fn new(children: Vec<Box<dyn SignalEvaluator>>) -> Self {
        AllOf { children }
    }
}

impl SignalEvaluator for AllOf {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        let mut all = !self.children.is_empty();
        for child in &mut self.children {
            let verdict = child.evaluate(candle);
            all = all && verdict;
        }
        all
    }

    fn warmup_period(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.warmup_period())
            .max()
            .unwrap_or(0)
    }

    fn describe(&self) -> String {
        join_children(&self.children, "AND")
    }
}

/// Logical OR of its children.
pub struct AnyOf {
    children: Vec<Box<dyn SignalEvaluator>>,
}

impl AnyOf {
    pub fn new(children: Vec<Box<dyn SignalEvaluator>>) -> Self {
        AnyOf { children }
    }
}

impl SignalEvaluator for AnyOf {
    fn evaluate(&mut self, candle: &Candle) -> bool {
        let mut any = false;
        for child in &mut self.children {
            let verdict = child.evaluate(candle);
            any = any || verdict;
        }
        any
    }

    fn warmup_period(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.warmup_period())
            .min()
            .unwrap_or(0)
    }

    fn describe(&self) -> String {
        join_children(&self.children, "OR")
    }
}

fn join_children(children: &[Box<dyn SignalEvaluator>], op: &str) -> String {
    let parts: Vec<String> = children.iter().map(|c| c.describe()).collect();
    format!("{}({})", op, parts.join(", "))
}
