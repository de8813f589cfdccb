//! Directional Movement Index (+DI / -DI) over simple averages.
//!
//! For each of the last n candles against its predecessor:
//! - up = H[i] - H[i-1], down = L[i-1] - L[i]
//! - +DM = up if up > down and up > 0, else 0
//! - -DM = down if down > up and down > 0, else 0
//! - TR = max(H - L, |H - C[i-1]|, |L - C[i-1]|)
//!
//! +DI = 100 * mean(+DM) / mean(TR), -DI likewise. Zero ATR yields 0 for both.
//! Warmup: needs n + 1 candles.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dmi {
    pub plus_di: f64,
    pub minus_di: f64,
}

pub fn dmi(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<Dmi> {
    let len = highs.len();
    if period == 0 || len != lows.len() || len != closes.len() || len < period + 1 {
        return None;
    }

    let mut plus_dm = 0.0;
    let mut minus_dm = 0.0;
    let mut true_range = 0.0;

    for i in len - period..len {
        let up = highs[i] - highs[i - 1];
        let down = lows[i - 1] - lows[i];
        if up > down && up > 0.0 {
            plus_dm += up;
        }
        if down > up && down > 0.0 {
            minus_dm += down;
        }
        let prev_close = closes[i - 1];
        true_range += (highs[i] - lows[i])
            .max((highs[i] - prev_close).abs())
            .max((lows[i] - prev_close).abs());
    }

    let atr = true_range / period as f64;
    if atr == 0.0 {
        return Some(Dmi {
            plus_di: 0.0,
            minus_di: 0.0,
        });
    }

    Some(Dmi {
        plus_di: 100.0 * (plus_dm / period as f64) / atr,
        minus_di: 100.0 * (minus_dm / period as f64) / atr,
    })
}
