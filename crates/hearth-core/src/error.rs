//! Unified error type for hearth crates.

use thiserror::Error;

/// Errors surfaced across crate boundaries.
///
/// Transport and oracle failures are normally absorbed at their own layer
/// (the environment client degrades to absent results, a failed oracle call
/// yields zero actions); this type carries the cases the runtime still wants
/// to report.
#[derive(Debug, Error)]
pub enum Error {
    #[error("environment client error: {0}")]
    Client(String),

    #[error("oracle error: {0}")]
    Oracle(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Convenience constructor for client errors.
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Convenience constructor for oracle errors.
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::Oracle(msg.into())
    }

    /// Convenience constructor for configuration errors.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Convenience constructor for runtime errors.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

/// Result type for hearth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::oracle("model timed out");
        assert!(err.to_string().contains("model timed out"));

        let err = Error::client("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
