use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    // Bad arguments or configuration, raised before any computation starts.
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Unsorted input: {0}")]
    UnsortedInput(String),

    #[error("Calculation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    // Catch-all for anyhow errors when direct conversion is suitable
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

/// Coarse error category for callers that map errors to responses
/// (e.g. an HTTP layer) without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InsufficientData,
    UnsortedInput,
    Cancelled,
    Config,
    Data,
    Internal,
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::ValidationError(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ValidationError(_) => ErrorKind::Validation,
            EngineError::InsufficientData { .. } => ErrorKind::InsufficientData,
            EngineError::UnsortedInput(_) => ErrorKind::UnsortedInput,
            EngineError::Cancelled => ErrorKind::Cancelled,
            EngineError::ConfigError(_) => ErrorKind::Config,
            EngineError::IoError { .. } => ErrorKind::Data,
            EngineError::AnyhowError(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = EngineError::InsufficientData { required: 3, actual: 2 };
        assert!(err.to_string().contains("need at least 3, got 2"));
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_validation_message() {
        let err = EngineError::validation("period must be greater than 0");
        assert_eq!(err.to_string(), "Validation error: period must be greater than 0");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_io_error_maps_to_data() {
        let err: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_anyhow_maps_to_internal() {
        let err: EngineError = anyhow::anyhow!("boom").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "boom");
    }
}
