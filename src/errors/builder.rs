use axum::http::StatusCode;
use std::fmt;
use tracing::debug;

use super::container::Entity;
use super::failure::Failure;
use super::response::{Cause, ErrorResponse};

type EntityCreator = Box<dyn FnOnce(Option<&str>, u16) -> Result<Entity, Failure> + Send>;

/// Assembles an [`ErrorResponse`] from a message, a status, an optional cause and an
/// optional function producing the body.
///
/// See [`crate::errors::factory`] for the common cases. `build` consumes the builder.
pub struct ErrorResponseBuilder {
    message: Option<String>,
    status: u16,
    entity_creator: Option<EntityCreator>,
    cause: Option<Cause>,
}

impl ErrorResponseBuilder {
    /// `message` becomes the response's `Display` text and is handed to the entity creator.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::without_message()
        }
    }

    /// Builder with no message and status 500.
    pub fn without_message() -> Self {
        Self {
            message: None,
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            entity_creator: None,
            cause: None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn set_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Function producing the response body from the final message and status.
    pub fn set_entity_creator<F>(mut self, creator: F) -> Self
    where
        F: FnOnce(Option<&str>, u16) -> Result<Entity, Failure> + Send + 'static,
    {
        self.entity_creator = Some(Box::new(creator));
        self
    }

    pub fn set_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Append to the message, separated by a space. An unset message becomes `addition`.
    pub fn append_to_message(mut self, addition: impl AsRef<str>) -> Self {
        let addition = addition.as_ref();
        self.message = Some(match self.message.take() {
            Some(message) => format!("{} {}", message, addition),
            None => addition.to_string(),
        });
        self
    }

    /// Produce the response. Only the entity creator can fail, and its error is
    /// returned unchanged.
    pub fn build(self) -> Result<ErrorResponse, Failure> {
        let entity = match self.entity_creator {
            Some(creator) => Some(creator(self.message.as_deref(), self.status)?),
            None => None,
        };

        debug!(
            status = self.status,
            message = self.message.as_deref().unwrap_or_default(),
            has_entity = entity.is_some(),
            has_cause = self.cause.is_some(),
            "Built error response"
        );

        Ok(ErrorResponse::new(self.status, entity)
            .with_message(self.message)
            .with_cause(self.cause))
    }

    /// Build and wrap into a [`Failure`] suitable for `?`.
    pub fn into_failure(self) -> Failure {
        match self.build() {
            Ok(response) => response.into(),
            Err(failure) => failure,
        }
    }
}

impl Default for ErrorResponseBuilder {
    fn default() -> Self {
        Self::without_message()
    }
}

impl fmt::Debug for ErrorResponseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorResponseBuilder")
            .field("message", &self.message)
            .field("status", &self.status)
            .field("entity_creator", &self.entity_creator.is_some())
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorContainer, Errors};
    use std::io;

    #[test]
    fn test_append_to_unset_message() {
        let builder = ErrorResponseBuilder::without_message().append_to_message("extra");
        assert_eq!(builder.message(), Some("extra"));
    }

    #[test]
    fn test_append_to_existing_message() {
        let builder = ErrorResponseBuilder::new("base")
            .append_to_message("one")
            .append_to_message("two");
        assert_eq!(builder.message(), Some("base one two"));
    }

    #[test]
    fn test_build_without_entity() {
        let response = ErrorResponseBuilder::new("nothing to show")
            .set_status(403)
            .build()
            .unwrap();

        assert_eq!(response.status(), 403);
        assert!(response.entity().is_none());
        assert_eq!(response.to_string(), "nothing to show");
    }

    #[test]
    fn test_entity_creator_receives_message_and_status() {
        let response = ErrorResponseBuilder::new("name is required")
            .set_status(400)
            .set_entity_creator(|message, status| {
                Ok(Errors::single(status, "field.required", message.unwrap_or_default())?.into())
            })
            .build()
            .unwrap();

        let Some(Entity::Errors(errors)) = response.entity() else {
            panic!("expected list body");
        };
        assert_eq!(errors.code(), 400);
        assert_eq!(errors.as_slice()[0].description(), Some("name is required"));
    }

    #[test]
    fn test_message_overrides_entity_text() {
        let response = ErrorResponseBuilder::new("visible")
            .set_status(409)
            .set_entity_creator(|_, status| Ok(Errors::single(status, "k", "body text")?.into()))
            .build()
            .unwrap();
        assert_eq!(response.to_string(), "visible");
    }

    #[test]
    fn test_cause_is_chained() {
        let response = ErrorResponseBuilder::new("upstream failed")
            .set_cause(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
            .build()
            .unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(response.cause().unwrap().to_string(), "timed out");
    }

    #[test]
    fn test_creator_failure_propagates_unchanged() {
        let result = ErrorResponseBuilder::new("msg")
            .set_entity_creator(|_, _| Err(Failure::InvalidArgument("boom".to_string())))
            .build();

        match result {
            Err(Failure::InvalidArgument(reason)) => assert_eq!(reason, "boom"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
