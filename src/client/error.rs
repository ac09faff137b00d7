//! Error types for external API client calls.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors reported by an [`IncapsulaClient`](super::IncapsulaClient) implementation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The API answered with a non-zero `res` result code.
    #[error("Incapsula API error (res {res}): {message}")]
    Api { res: i64, message: String },

    /// The request could not be delivered or the connection failed.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ClientError {
    /// Create an API error carrying the remote result code.
    pub fn api(res: i64, message: impl Into<String>) -> Self {
        Self::Api {
            res,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The remote `res` code, if the API produced one.
    pub fn res_code(&self) -> Option<i64> {
        match self {
            ClientError::Api { res, .. } => Some(*res),
            _ => None,
        }
    }
}
