//! Technical indicator implementations.
//!
//! Every indicator is a pure function of the most recent slice of history and
//! returns `None` until the slice is long enough (its warm-up period).
//! Ratios with a zero denominator resolve to `0.0` rather than failing.
//!
//! - [`sma`]: simple moving average
//! - [`ema::Ema`]: incremental exponential moving average
//! - [`rsi`]: relative strength index (simple averages)
//! - [`stochastic_k`]: stochastic oscillator %K
//! - [`dmi`]: directional movement index (+DI / -DI)
//! - [`pinbar::PinBarShape`]: pin-bar candle shape test

pub mod dmi;
pub mod ema;
pub mod pinbar;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use dmi::{dmi, Dmi};
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::stochastic_k;

use crate::domain::candle::Candle;

/// Bounded rolling history of close/high/low prices.
///
/// Keeps at least `capacity` of the most recent values so slice-based
/// indicators can look back that far without holding the whole series.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    capacity: usize,
    closes: Vec<f64>,
    highs: Vec<f64>,
    lows: Vec<f64>,
}

impl CandleWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        CandleWindow {
            capacity,
            closes: Vec::with_capacity(capacity * 2),
            highs: Vec::with_capacity(capacity * 2),
            lows: Vec::with_capacity(capacity * 2),
        }
    }

    pub fn push(&mut self, candle: &Candle) {
        self.closes.push(candle.close);
        self.highs.push(candle.high);
        self.lows.push(candle.low);

        if self.closes.len() > self.capacity * 2 {
            let excess = self.closes.len() - self.capacity;
            self.closes.drain(..excess);
            self.highs.drain(..excess);
            self.lows.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }
}
