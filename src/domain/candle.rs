//! OHLCV candle representation.

use chrono::DateTime;

use crate::domain::error::BacktestError;

/// One price bar. `open_time` is a millisecond Unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Build a candle, rejecting non-finite prices and `high < low`.
    ///
    /// `index` is the candle's position in its series and only feeds the
    /// error context.
    pub fn new(
        index: usize,
        open_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, BacktestError> {
        let candle = Candle {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        };
        candle.validate(index)?;
        Ok(candle)
    }

    pub fn validate(&self, index: usize) -> Result<(), BacktestError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(BacktestError::malformed(
                    index,
                    Some(self.open_time),
                    format!("{name} is not a finite number"),
                ));
            }
        }
        if self.high < self.low {
            return Err(BacktestError::malformed(
                index,
                Some(self.open_time),
                format!("high {} is below low {}", self.high, self.low),
            ));
        }
        Ok(())
    }

    pub fn body(&self) -> f64 {
        (self.open - self.close).abs()
    }

    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Validate a whole series: every candle well formed, timestamps strictly
/// ascending.
pub fn validate_series(candles: &[Candle]) -> Result<(), BacktestError> {
    for (i, candle) in candles.iter().enumerate() {
        candle.validate(i)?;
        if i > 0 && candle.open_time <= candles[i - 1].open_time {
            return Err(BacktestError::malformed(
                i,
                Some(candle.open_time),
                format!(
                    "open_time is not after the previous candle ({})",
                    candles[i - 1].open_time
                ),
            ));
        }
    }
    Ok(())
}

/// Render a millisecond timestamp as `%Y-%m-%d %H:%M:%S` UTC.
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}
