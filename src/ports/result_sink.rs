//! Trade-event output port.

use crate::domain::error::BacktestError;
use crate::domain::position::TradeEvent;

/// Receives one event per closed trade, in order.
pub trait ResultSink {
    fn record(&mut self, event: &TradeEvent) -> Result<(), BacktestError>;
}

impl ResultSink for Vec<TradeEvent> {
    fn record(&mut self, event: &TradeEvent) -> Result<(), BacktestError> {
        self.push(event.clone());
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn record(&mut self, event: &TradeEvent) -> Result<(), BacktestError> {
        (**self).record(event)
    }
}
