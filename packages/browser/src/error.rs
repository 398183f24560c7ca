use ayon_api::ApiError;
use thiserror::Error;

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Errors surfaced by browser actions
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server answered but reported the operation as failed
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl BrowserError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BrowserError::Cancelled)
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            BrowserError::Api(err) => err.user_message(),
            BrowserError::OperationFailed(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = BrowserError::OperationFailed("Version is locked".to_string());
        assert_eq!(err.user_message(), "Version is locked");

        let err = BrowserError::from(ApiError::Http {
            status: 500,
            message: "Internal error".to_string(),
        });
        assert_eq!(err.user_message(), "Internal error");
        assert!(!err.is_cancelled());
        assert!(BrowserError::Cancelled.is_cancelled());
    }
}
