//! Trade log writer.
//!
//! One headerless row per closed trade:
//! `close_date,entry_price,exit_price,balance`, `close_date` formatted
//! `%Y-%m-%d %H:%M:%S` UTC. The file is truncated when the sink is created.

use crate::domain::candle::format_timestamp;
use crate::domain::error::BacktestError;
use crate::domain::position::TradeEvent;
use crate::ports::result_sink::ResultSink;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct CsvResultSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvResultSink {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, BacktestError> {
        let path = path.as_ref().to_path_buf();
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .map_err(|e| BacktestError::ResultSink {
                reason: format!("failed to create {}: {}", path.display(), e),
            })?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvResultSink {
    fn record(&mut self, event: &TradeEvent) -> Result<(), BacktestError> {
        let row = [
            format_timestamp(event.exit_time),
            event.entry_price.to_string(),
            event.exit_price.to_string(),
            event.balance.to_string(),
        ];
        self.writer
            .write_record(&row)
            .map_err(|e| BacktestError::ResultSink {
                reason: format!("failed to write {}: {}", self.path.display(), e),
            })?;
        self.writer.flush()?;
        Ok(())
    }
}
