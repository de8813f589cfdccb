//! Stochastic oscillator %K.
//!
//! %K = 100 * (C - LL(n)) / (HH(n) - LL(n)), with HH/LL the highest high and
//! lowest low of the last n candles. A zero range yields 0.
//! Warmup: needs n candles.

pub fn stochastic_k(closes: &[f64], highs: &[f64], lows: &[f64], period: usize) -> Option<f64> {
    let len = closes.len().min(highs.len()).min(lows.len());
    if period == 0 || len < period {
        return None;
    }

    let close = closes[closes.len() - 1];
    let highest = highs[highs.len() - period..]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let lowest = lows[lows.len() - period..]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    if highest == lowest {
        return Some(0.0);
    }
    Some(100.0 * (close - lowest) / (highest - lowest))
}
