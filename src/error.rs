//! Error types for the trust aggregation engine

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trust aggregation engine
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Provider errors. Soft provider errors (subject-not-found, timeouts,
    // transport failures) never reach this enum in normal operation — the
    // pipeline folds them into `unresolved[]` before `evaluate` returns.
    // These variants exist for provider construction failures and for the
    // Provider HTTP Helper's internal signature.
    #[error("Provider '{name}' transport error: {reason}")]
    Provider { name: String, reason: String },

    #[error("Provider '{name}' timed out after {timeout_ms}ms")]
    ProviderTimeout { name: String, timeout_ms: u64 },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // Identity graph / resolver errors
    #[error("Identity graph error: {0}")]
    IdentityGraph(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    // Internal invariant violations. These are the only errors the pipeline
    // ever propagates out of `evaluate` — every other category is contained
    // and folded into `unresolved[]` or a fraud signal.
    #[error("Internal invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is retryable (transient transport failure)
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Provider { .. } | Error::ProviderTimeout { .. } | Error::Transport(_)
        )
    }

    /// Check if this error represents a programmer error that must never be
    /// observed by a caller of `Pipeline::evaluate`.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Invariant(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        let err = Error::Provider {
            name: "github".into(),
            reason: "connection reset".into(),
        };
        assert!(err.is_retryable());
        assert!(!err.is_internal());
    }

    #[test]
    fn invariant_is_internal() {
        let err = Error::Invariant("cohort contained duplicate canonical subject".into());
        assert!(err.is_internal());
        assert!(!err.is_retryable());
    }
}
