use thiserror::Error;

pub type Result<T> = std::result::Result<T, UnderwritingError>;

#[derive(Error, Debug)]
pub enum UnderwritingError {
    /// Malformed or out-of-range request fields. Never retried.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// An external collaborator failed or timed out. The request may be retried.
    #[error("{collaborator} unavailable: {reason}")]
    UnavailableError {
        collaborator: &'static str,
        reason: String,
    },
    /// The signing key is missing or the signature primitive rejected the payload.
    #[error("Signing error: {0}")]
    SigningError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl UnderwritingError {
    pub fn unavailable(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::UnavailableError {
            collaborator,
            reason: reason.into(),
        }
    }

    /// Only collaborator outages are worth retrying; everything else fails the same way twice.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UnavailableError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(UnderwritingError::unavailable("settings", "timed out").is_retryable());
        assert!(!UnderwritingError::ValidationError("bad".into()).is_retryable());
        assert!(!UnderwritingError::SigningError("no key".into()).is_retryable());
    }

    #[test]
    fn test_unavailable_display_names_collaborator() {
        let err = UnderwritingError::unavailable("supply rate feed", "unknown asset DAI");
        assert_eq!(err.to_string(), "supply rate feed unavailable: unknown asset DAI");
    }
}
