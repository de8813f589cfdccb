//! RSI (Relative Strength Index) over simple averages.
//!
//! Takes the last n close-to-close changes, averages gains and losses over n:
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)).
//! If avg_loss == 0 the ratio is taken as 0, which yields RSI = 0.
//!
//! Warmup: needs n + 1 closes.

pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - (period + 1)..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    let rs = if avg_loss == 0.0 {
        0.0
    } else {
        avg_gain / avg_loss
    };
    Some(100.0 - (100.0 / (1.0 + rs)))
}
