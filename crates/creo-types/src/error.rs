use thiserror::Error;

/// Errors from the injected persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),
}

/// Errors from the remote streaming exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("stream error: {0}")]
    Stream(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors surfaced by the chat subsystems.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from goal ledger operations.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("goal title must not be empty")]
    EmptyTitle,

    #[error("goal target must be a positive number, got {0}")]
    InvalidTarget(f64),

    #[error("goal not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::InvalidKey("a/b".to_string());
        assert_eq!(err.to_string(), "invalid storage key: 'a/b'");
    }

    #[test]
    fn test_exchange_error_display() {
        let err = ExchangeError::Provider {
            message: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: HTTP 500");
    }

    #[test]
    fn test_chat_error_wraps_exchange() {
        let err: ChatError = ExchangeError::RateLimited.into();
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_goal_error_display() {
        let err = GoalError::InvalidTarget(-5.0);
        assert!(err.to_string().contains("-5"));
    }
}
