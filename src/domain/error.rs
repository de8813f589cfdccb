//! Domain error types.
//!
//! Warm-up shortfalls and zero denominators are not errors: evaluators answer
//! "no signal" and indicators resolve to a sentinel instead.

/// Top-level error type for klinetest.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("malformed candle at index {index}{}: {reason}", format_open_time(.open_time))]
    MalformedCandle {
        index: usize,
        open_time: Option<i64>,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("result sink error: {reason}")]
    ResultSink { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_open_time(open_time: &Option<i64>) -> String {
    match open_time {
        Some(t) => format!(" (open_time {t})"),
        None => String::new(),
    }
}

impl BacktestError {
    pub fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        BacktestError::InvalidConfiguration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(index: usize, open_time: Option<i64>, reason: impl Into<String>) -> Self {
        BacktestError::MalformedCandle {
            index,
            open_time,
            reason: reason.into(),
        }
    }
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) | BacktestError::ResultSink { .. } => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. }
            | BacktestError::InvalidConfiguration { .. } => 2,
            BacktestError::DataSource { .. } => 3,
            BacktestError::UnknownStrategy { .. } => 4,
            BacktestError::MalformedCandle { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
