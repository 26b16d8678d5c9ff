//! Domain error types.

/// Top-level error type for eodtrader.
#[derive(Debug, thiserror::Error)]
pub enum EodtraderError {
    #[error("data provider error: {reason}")]
    Provider { reason: String },

    #[error("malformed provider payload: {reason}")]
    Payload { reason: String },

    #[error("cache error: {reason}")]
    Cache { reason: String },

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

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("engine invariant violated: {reason}")]
    Engine { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EodtraderError> for std::process::ExitCode {
    fn from(err: &EodtraderError) -> Self {
        let code: u8 = match err {
            EodtraderError::Io(_) => 1,
            EodtraderError::ConfigParse { .. }
            | EodtraderError::ConfigMissing { .. }
            | EodtraderError::ConfigInvalid { .. } => 2,
            EodtraderError::Provider { .. }
            | EodtraderError::Payload { .. }
            | EodtraderError::Cache { .. } => 3,
            EodtraderError::InsufficientHistory { .. } => 4,
            EodtraderError::Engine { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
