//! INI file configuration adapter.

use crate::domain::error::BacktestError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BacktestError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| BacktestError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, BacktestError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| BacktestError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl FileConfigAdapter {
    fn invalid_value(&self, section: &str, key: &str, expected: &str) -> BacktestError {
        let raw = self.config.get(section, key).unwrap_or_default();
        BacktestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be {expected}, got {raw}"),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, BacktestError> {
        self.config
            .getint(section, key)
            .map_err(|_| self.invalid_value(section, key, "an integer"))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, BacktestError> {
        self.config
            .getfloat(section, key)
            .map_err(|_| self.invalid_value(section, key, "a number"))
    }
}
