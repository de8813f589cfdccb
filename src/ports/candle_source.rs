//! Candle data port.

use crate::domain::candle::Candle;
use crate::domain::error::BacktestError;

pub trait CandleSource {
    /// Fetch candles for `symbol` at `interval`, ascending by `open_time`.
    ///
    /// With `limit`, only the most recent `limit` candles are returned.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, BacktestError>;
}
