//! CSV candle source.
//!
//! Reads `{dir}/{symbol}_{interval}.csv` with the header
//! `open_time,open,high,low,close,volume`, `open_time` in milliseconds.

use crate::adapters::keep_latest;
use crate::domain::candle::Candle;
use crate::domain::error::BacktestError;
use crate::ports::candle_source::CandleSource;
use std::fs;
use std::path::PathBuf;

pub struct CsvCandleSource {
    base_path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    column: usize,
    name: &str,
    open_time: Option<i64>,
) -> Result<T, BacktestError>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(column)
        .ok_or_else(|| BacktestError::malformed(index, open_time, format!("missing {name} column")))?;
    raw.trim().parse().map_err(|e| {
        BacktestError::malformed(index, open_time, format!("invalid {name} value {raw:?}: {e}"))
    })
}

impl CandleSource for CsvCandleSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Candle>, BacktestError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| {
                BacktestError::malformed(index, None, format!("CSV parse error: {}", e))
            })?;

            let open_time: i64 = parse_field(&record, index, 0, "open_time", None)?;
            let t = Some(open_time);
            let open: f64 = parse_field(&record, index, 1, "open", t)?;
            let high: f64 = parse_field(&record, index, 2, "high", t)?;
            let low: f64 = parse_field(&record, index, 3, "low", t)?;
            let close: f64 = parse_field(&record, index, 4, "close", t)?;
            let volume: f64 = parse_field(&record, index, 5, "volume", t)?;

            candles.push(Candle::new(index, open_time, open, high, low, close, volume)?);
        }

        candles.sort_by_key(|c| c.open_time);
        Ok(keep_latest(candles, limit))
    }
}
