//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_result_sink;
pub mod file_config_adapter;
#[cfg(feature = "json")]
pub mod json_kline_adapter;

use crate::domain::candle::Candle;

/// Keep the last `limit` candles of an ascending series.
pub(crate) fn keep_latest(mut candles: Vec<Candle>, limit: Option<usize>) -> Vec<Candle> {
    if let Some(n) = limit {
        if candles.len() > n {
            candles.drain(..candles.len() - n);
        }
    }
    candles
}
