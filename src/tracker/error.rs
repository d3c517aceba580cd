//! Error types for tracker access.

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Error type for tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// Missing or malformed credentials / base URL.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-level failure (DNS, TLS, connection reset).
    /// Typically transient and retryable by the caller.
    #[error("Transport error during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// Non-success HTTP status from the tracker.
    #[error("Tracker returned {status} during {operation}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// Rate limiting persisted through every retry attempt.
    #[error("Rate limited during {operation} after {attempts} attempts")]
    RateLimited { operation: String, attempts: u32 },

    /// Response body did not match the expected shape.
    #[error("Failed to decode {operation} response: {message}")]
    Decode { operation: String, message: String },
}

impl TrackerError {
    pub fn transport(operation: impl Into<String>, message: impl ToString) -> Self {
        TrackerError::Transport {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(operation: impl Into<String>, message: impl ToString) -> Self {
        TrackerError::Decode {
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}
