use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, warn};

use super::container::Entity;
use super::failure::Failure;
use crate::codec::{WireEntity, WireFormat};
use crate::metrics::ERROR_RESPONSES_TOTAL;

pub type Cause = Box<dyn StdError + Send + Sync>;

/// Status code plus optional structured body, ready to be returned from a handler.
///
/// Its `Display` output is the message it was built with, never text derived from
/// the body; `source()` exposes the cause it was built with.
#[derive(Debug)]
pub struct ErrorResponse {
    status: u16,
    entity: Option<Entity>,
    message: Option<String>,
    cause: Option<Cause>,
}

impl ErrorResponse {
    pub fn new(status: u16, entity: Option<Entity>) -> Self {
        Self {
            status,
            entity,
            message: None,
            cause: None,
        }
    }

    pub(crate) fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub(crate) fn with_cause(mut self, cause: Option<Cause>) -> Self {
        self.cause = cause;
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// HTTP status, with codes outside the valid range reported as 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or_else(|_| {
            warn!(status = self.status, "Invalid status code, responding with 500");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn into_entity(self) -> Option<Entity> {
        self.entity
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Render with an explicit wire format. Encoder failures are returned as-is.
    pub fn render(self, format: WireFormat) -> Result<Response, Failure> {
        let status = self.status_code();
        ERROR_RESPONSES_TOTAL
            .with_label_values(&[status.as_str()])
            .inc();

        let Some(entity) = self.entity else {
            debug!(status = status.as_u16(), "Rendering error response without body");
            return Ok(status.into_response());
        };

        let body = entity.encode(format)?;
        debug!(
            status = status.as_u16(),
            format = %format,
            entity = entity.root_name(),
            "Rendering error response"
        );

        Ok((status, [(header::CONTENT_TYPE, format.content_type())], body).into_response())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or_default())
    }
}

impl StdError for ErrorResponse {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        match self.render(WireFormat::Json) {
            Ok(response) => response,
            Err(failure) => failure.into_response(),
        }
    }
}
