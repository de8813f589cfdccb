//! Core domain types and logic.

pub mod backtest;
pub mod candle;
pub mod config_validation;
pub mod crossover;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod position;
pub mod signal;
pub mod simulator;
pub mod strategy;
pub mod tracker;
