//! Error types for the synchronization engine.
//!
//! Failures are caught at the operation boundary of the controller and
//! converted into a restored state plus a notification; none of these
//! kinds is fatal to the process.

use thiserror::Error;

/// Errors that can occur while synchronizing cart/wishlist state.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The operation requires an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A cart quantity outside the accepted range was requested.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The network call exceeded the request timeout.
    #[error("Request timeout")]
    RequestTimeout,

    /// The store API returned a non-2xx response.
    #[error("{message}")]
    RemoteFailure { status: u16, message: String },

    /// The device-local snapshot failed to parse. Recovered to an empty
    /// list inside [`crate::DeviceStore`]; never surfaced to the user.
    #[error("local store corrupt: {0}")]
    LocalStoreCorrupt(String),

    /// HTTP transport failed before a response status was available.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// JSON encoding/decoding failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Device store I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Map a transport error, folding timeout aborts into their own kind.
    #[must_use]
    pub fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else {
            Self::Http(err)
        }
    }

    /// The message shown to the user for a failed mutation: the
    /// server-supplied message when there is one, else the caller's
    /// per-operation fallback.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::RemoteFailure { message, .. } => message.clone(),
            Self::RequestTimeout => self.to_string(),
            _ => fallback.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_uses_server_message() {
        let err = SyncError::RemoteFailure {
            status: 422,
            message: "Quantity exceeds stock".to_string(),
        };
        assert_eq!(err.user_message("Failed to add item"), "Quantity exceeds stock");
        assert_eq!(err.to_string(), "Quantity exceeds stock");
    }

    #[test]
    fn test_timeout_message_is_stable() {
        let err = SyncError::RequestTimeout;
        assert_eq!(err.user_message("fallback"), "Request timeout");
    }

    #[test]
    fn test_fallback_for_transport_errors() {
        let err = SyncError::NotAuthenticated;
        assert_eq!(err.user_message("Failed to update quantity"), "Failed to update quantity");
    }
}
