//! Exponential Moving Average, updated one value at a time.
//!
//! k = 2/(n+1), seeded with the first value, then
//! EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Every update past the first input yields a value; period 0 never does.

#[derive(Debug, Clone)]
pub struct Ema {
    k: Option<f64>,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Ema {
            k: (period > 0).then(|| 2.0 / (period as f64 + 1.0)),
            value: None,
        }
    }

    pub fn update(&mut self, x: f64) -> Option<f64> {
        let k = self.k?;
        self.value = Some(match self.value {
            Some(prev) => x * k + prev * (1.0 - k),
            None => x,
        });
        self.value
    }
}
