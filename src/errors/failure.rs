use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::response::ErrorResponse;
use crate::codec::WireFormat;

/// Everything that can go wrong while producing or rendering an error response.
#[derive(Debug, Error)]
pub enum Failure {
    /// A required identifier (error key, entity key) was empty. Programmer error.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The JSON or XML encoder rejected the payload.
    #[error("{format} encoding failed: {reason}")]
    Encoding { format: WireFormat, reason: String },

    /// A structured business failure meant to be rendered to the caller.
    #[error(transparent)]
    Business(Box<ErrorResponse>),
}

impl Failure {
    pub(crate) fn encoding(format: WireFormat, reason: impl ToString) -> Self {
        Self::Encoding {
            format,
            reason: reason.to_string(),
        }
    }

    /// The business response, if this failure carries one.
    pub fn response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Business(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_error_response(self) -> Result<ErrorResponse, Self> {
        match self {
            Self::Business(response) => Ok(*response),
            other => Err(other),
        }
    }
}

impl From<ErrorResponse> for Failure {
    fn from(response: ErrorResponse) -> Self {
        Self::Business(Box::new(response))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self {
            Self::Business(response) => response.into_response(),
            other => {
                // Internals stay in the log; the caller only sees the status.
                error!(error = %other, "Failed to produce error response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
