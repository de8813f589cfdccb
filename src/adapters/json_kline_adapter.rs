//! Exchange kline cache reader.
//!
//! `{dir}/{symbol}_{interval}_klines.json` holds an array of kline arrays:
//! `[open_time, "open", "high", "low", "close", "volume", close_time, ...]`.
//! Prices may be strings or numbers; trailing fields are ignored.

use crate::adapters::keep_latest;
use crate::domain::candle::Candle;
use crate::domain::error::BacktestError;
use crate::ports::candle_source::CandleSource;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

const FIELDS: [&str; 6] = ["open_time", "open", "high", "low", "close", "volume"];

pub struct JsonKlineSource {
    base_path: PathBuf,
}

impl JsonKlineSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn json_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}_klines.json", symbol, interval))
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_kline(index: usize, kline: &Value) -> Result<Candle, BacktestError> {
    let fields = kline
        .as_array()
        .ok_or_else(|| BacktestError::malformed(index, None, "kline is not an array"))?;
    if fields.len() < FIELDS.len() {
        return Err(BacktestError::malformed(
            index,
            None,
            format!("expected at least {} fields, got {}", FIELDS.len(), fields.len()),
        ));
    }

    let open_time = as_i64(&fields[0])
        .ok_or_else(|| BacktestError::malformed(index, None, "invalid open_time"))?;

    let mut prices = [0.0; 5];
    for (slot, (value, name)) in prices.iter_mut().zip(fields[1..6].iter().zip(&FIELDS[1..])) {
        *slot = as_f64(value).ok_or_else(|| {
            BacktestError::malformed(index, Some(open_time), format!("invalid {name} value {value}"))
        })?;
    }
    let [open, high, low, close, volume] = prices;
    Candle::new(index, open_time, open, high, low, close, volume)
}

impl CandleSource for JsonKlineSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, BacktestError> {
        let path = self.json_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let root: Value = serde_json::from_str(&content).map_err(|e| BacktestError::DataSource {
            reason: format!("invalid JSON in {}: {}", path.display(), e),
        })?;
        let klines = root.as_array().ok_or_else(|| BacktestError::DataSource {
            reason: format!("{} is not a JSON array", path.display()),
        })?;

        let mut candles = klines
            .iter()
            .enumerate()
            .map(|(i, k)| parse_kline(i, k))
            .collect::<Result<Vec<_>, _>>()?;

        candles.sort_by_key(|c| c.open_time);
        Ok(keep_latest(candles, limit))
    }
}
