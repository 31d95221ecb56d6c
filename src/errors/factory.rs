//! Shortcuts for the common error statuses.
//!
//! Each `error_*` function builds a response with a single-error [`Errors`] body;
//! each `throw_*` function returns that response as `Err`, typed over any `T` so it
//! can end a handler from any expression position:
//!
//! ```
//! use structured_errors::errors::{factory, Failure};
//!
//! fn find_user(id: u64) -> Result<String, Failure> {
//!     if id == 0 {
//!         return factory::throw_not_found("user.missing", "no such user");
//!     }
//!     Ok(format!("user-{}", id))
//! }
//!
//! let failure = find_user(0).unwrap_err();
//! assert_eq!(failure.response().map(|r| r.status()), Some(404));
//! ```

use axum::http::StatusCode;
use std::fmt;

use super::builder::ErrorResponseBuilder;
use super::container::ErrorContainer;
use super::error::coerce_key;
use super::failure::Failure;
use super::list::Errors;
use super::response::{Cause, ErrorResponse};

fn single_error_builder(
    code: u16,
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponseBuilder, Failure> {
    let key = coerce_key(key, "error key")?;
    Ok(ErrorResponseBuilder::new(description)
        .set_status(code)
        .set_entity_creator(move |message, status| {
            Ok(Errors::single(status, key, message.unwrap_or_default())?.into())
        }))
}

fn raise<T>(result: Result<ErrorResponse, Failure>) -> Result<T, Failure> {
    Err(match result {
        Ok(response) => response.into(),
        Err(failure) => failure,
    })
}

/// Response carrying an existing container as its body.
pub fn error_from(errors: Errors) -> ErrorResponse {
    ErrorResponse::new(errors.code(), Some(errors.into()))
}

/// Response with `description` as message and a single-error body.
pub fn error(
    code: u16,
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponse, Failure> {
    single_error_builder(code, key, description)?.build()
}

pub fn error_with_cause(
    code: u16,
    key: impl fmt::Display,
    description: impl Into<String>,
    cause: impl Into<Cause>,
) -> Result<ErrorResponse, Failure> {
    single_error_builder(code, key, description)?
        .set_cause(cause)
        .build()
}

pub fn error_bad_request(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponse, Failure> {
    error(StatusCode::BAD_REQUEST.as_u16(), key, description)
}

pub fn throw_bad_request<T>(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<T, Failure> {
    raise(error_bad_request(key, description))
}

pub fn error_conflict(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponse, Failure> {
    error(StatusCode::CONFLICT.as_u16(), key, description)
}

pub fn throw_conflict<T>(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<T, Failure> {
    raise(error_conflict(key, description))
}

pub fn error_not_found(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponse, Failure> {
    error(StatusCode::NOT_FOUND.as_u16(), key, description)
}

pub fn throw_not_found<T>(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<T, Failure> {
    raise(error_not_found(key, description))
}

pub fn error_forbidden(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponse, Failure> {
    error(StatusCode::FORBIDDEN.as_u16(), key, description)
}

pub fn throw_forbidden<T>(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<T, Failure> {
    raise(error_forbidden(key, description))
}

pub fn error_internal_server_error(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<ErrorResponse, Failure> {
    error(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), key, description)
}

pub fn throw_internal_server_error<T>(
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<T, Failure> {
    raise(error_internal_server_error(key, description))
}

/// Fail with a single-error response unless `condition` holds.
pub fn ensure(
    condition: bool,
    status: StatusCode,
    key: impl fmt::Display,
    description: impl Into<String>,
) -> Result<(), Failure> {
    if condition {
        return Ok(());
    }
    raise(error(status.as_u16(), key, description))
}
