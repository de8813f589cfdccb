//! Configuration access port.
//!
//! Typed getters return `Ok(None)` when the key is absent and
//! `ConfigInvalid` when it is present but does not parse.

use crate::domain::error::BacktestError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, BacktestError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, BacktestError>;
}
