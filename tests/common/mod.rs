#![allow(dead_code)]

use klinetest::domain::backtest::BacktestConfig;
pub use klinetest::domain::candle::Candle;
use klinetest::domain::error::BacktestError;
use klinetest::domain::signal::SignalEvaluator;
use klinetest::domain::tracker::DrawdownPolicy;
use klinetest::ports::candle_source::CandleSource;
use std::cell::RefCell;
use std::collections::HashMap;

pub const FOUR_HOURS_MS: i64 = 4 * 60 * 60 * 1000;
/// 2024-01-01 00:00:00 UTC
pub const START_MS: i64 = 1_704_067_200_000;

pub struct MockCandleSource {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, String, Option<usize>)>>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl CandleSource for MockCandleSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, BacktestError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), interval.to_string(), limit));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::DataSource {
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(symbol).cloned().unwrap_or_default();
        Ok(match limit {
            Some(n) if candles.len() > n => candles[candles.len() - n..].to_vec(),
            _ => candles,
        })
    }
}

/// Enters whenever it is asked.
pub struct AlwaysEnter;

impl SignalEvaluator for AlwaysEnter {
    fn evaluate(&mut self, _candle: &Candle) -> bool {
        true
    }

    fn warmup_period(&self) -> usize {
        0
    }

    fn describe(&self) -> String {
        "ALWAYS".into()
    }
}

/// Replays a fixed verdict list, then stays false.
pub struct ScriptedSignal {
    pub verdicts: Vec<bool>,
    pub fed: usize,
}

impl ScriptedSignal {
    pub fn new(verdicts: Vec<bool>) -> Self {
        Self { verdicts, fed: 0 }
    }
}

impl SignalEvaluator for ScriptedSignal {
    fn evaluate(&mut self, _candle: &Candle) -> bool {
        let verdict = self.verdicts.get(self.fed).copied().unwrap_or(false);
        self.fed += 1;
        verdict
    }

    fn warmup_period(&self) -> usize {
        0
    }

    fn describe(&self) -> String {
        "SCRIPTED".into()
    }
}

pub fn make_candle(index: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        open_time: START_MS + index as i64 * FOUR_HOURS_MS,
        open,
        high,
        low,
        close,
        volume: 10.0,
    }
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        starting_balance: 1000.0,
        order_balance_factor: 0.1,
        take_profit_factor: 0.05,
        stop_loss_factor: 0.05,
        drawdown_policy: DrawdownPolicy::StartingBalance,
    }
}

/// Linear trend with a fixed one-unit range around each close.
pub fn generate_candles(count: usize, start_price: f64, step: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            make_candle(i, close, close + 1.0, close - 1.0, close)
        })
        .collect()
}

/// Deterministic zig-zag series, useful for strategies that need both
/// rising and falling stretches.
pub fn generate_wave(count: usize, base: f64, amplitude: f64, period: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let phase = (i % period) as f64 / period as f64;
            let offset = if phase < 0.5 {
                amplitude * phase * 4.0 - amplitude
            } else {
                amplitude * (3.0 - phase * 4.0)
            };
            let close = base + offset;
            let open = if i == 0 {
                close
            } else {
                base + offset - amplitude * 0.1
            };
            make_candle(
                i,
                open,
                close.max(open) + amplitude * 0.05,
                close.min(open) - amplitude * 0.05,
                close,
            )
        })
        .collect()
}

pub fn candles_to_csv(candles: &[Candle]) -> String {
    let mut out = String::from("open_time,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.open_time, c.open, c.high, c.low, c.close, c.volume
        ));
    }
    out
}
