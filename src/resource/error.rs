//! Resource failure types.

use axum::http::StatusCode;
use thiserror::Error;

use crate::http::response::ResponseError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors a resource callback can raise.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Stop the decision graph and answer with `status`.
    #[error("halted with {status}")]
    Halt {
        status: StatusCode,
        /// Optional plain-text body sent with the status.
        message: Option<String>,
    },

    /// The response rejected a mutation.
    #[error("response error: {0}")]
    Response(#[from] ResponseError),

    /// Anything unexpected; answered with 500 and logged, never shown to the client.
    #[error("resource fault: {0}")]
    Fault(BoxError),
}

impl ResourceError {
    pub fn halt(status: StatusCode) -> Self {
        ResourceError::Halt {
            status,
            message: None,
        }
    }

    pub fn halt_with(status: StatusCode, message: impl Into<String>) -> Self {
        ResourceError::Halt {
            status,
            message: Some(message.into()),
        }
    }

    pub fn fault(error: impl Into<BoxError>) -> Self {
        ResourceError::Fault(error.into())
    }
}

/// Result type for resource callbacks.
pub type ResourceResult<T> = Result<T, ResourceError>;
