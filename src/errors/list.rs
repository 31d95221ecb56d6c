use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::container::ErrorContainer;
use super::error::Error;
use super::failure::Failure;

/// Container of one or more [`Error`]s reported with a single status code.
///
/// Insertion order is preserved; the first error is usually the primary one.
///
/// ```
/// use structured_errors::errors::{ErrorContainer, Errors};
///
/// let mut errors = Errors::new(400);
/// errors
///     .add_at("field.required", "name is required", "name")?
///     .add_at("field.required", "email is required", "email")?;
///
/// assert!(errors.has_errors());
/// assert_eq!(errors.to_response().status(), 400);
/// # Ok::<(), structured_errors::errors::Failure>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ErrorsRepr")]
pub struct Errors {
    code: u16,
    #[serde(rename = "error", skip_serializing_if = "Vec::is_empty")]
    errors: Vec<Error>,
}

impl Errors {
    /// Empty container.
    pub fn new(code: u16) -> Self {
        Self {
            code,
            errors: Vec::new(),
        }
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self::new(status.as_u16())
    }

    /// Container holding exactly one error.
    pub fn single(
        code: u16,
        key: impl fmt::Display,
        description: impl Into<String>,
    ) -> Result<Self, Failure> {
        let mut errors = Self::new(code);
        errors.add(key, description)?;
        Ok(errors)
    }

    pub fn single_at(
        code: u16,
        key: impl fmt::Display,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, Failure> {
        let mut errors = Self::new(code);
        errors.add_at(key, description, location)?;
        Ok(errors)
    }

    /// Append an error and return the container for further chaining.
    pub fn add(
        &mut self,
        key: impl fmt::Display,
        description: impl Into<String>,
    ) -> Result<&mut Self, Failure> {
        let error = Error::new(key, description)?;
        Ok(self.push(error))
    }

    /// Append an error tied to a field or parameter.
    pub fn add_at(
        &mut self,
        key: impl fmt::Display,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<&mut Self, Failure> {
        let error = Error::new(key, description)?.at(location);
        Ok(self.push(error))
    }

    /// Append an already constructed error.
    pub fn push(&mut self, error: Error) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Overrides the status code. Normal code sets it once at construction.
    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    pub fn as_slice(&self) -> &[Error] {
        &self.errors
    }
}

impl ErrorContainer for Errors {
    fn code(&self) -> u16 {
        self.code
    }

    fn errors(&self) -> Vec<&Error> {
        self.errors.iter().collect()
    }

    fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Error> for Errors {
    fn extend<I: IntoIterator<Item = Error>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoResponse for Errors {
    fn into_response(self) -> Response {
        self.into_failure().into_response()
    }
}

/// Decode shape: accepts the canonical `error` field and the legacy `errors` alias.
#[derive(Deserialize)]
struct ErrorsRepr {
    code: u16,
    #[serde(default)]
    error: Vec<Error>,
    #[serde(default)]
    errors: Vec<Error>,
}

impl From<ErrorsRepr> for Errors {
    fn from(repr: ErrorsRepr) -> Self {
        Self {
            code: repr.code,
            errors: canonical_or_legacy(repr.error, repr.errors),
        }
    }
}

/// The canonical list unless it is empty, in which case the legacy one.
/// Every reader resolves the `error`/`errors` pair this way.
pub(crate) fn canonical_or_legacy<T>(canonical: Vec<T>, legacy: Vec<T>) -> Vec<T> {
    if canonical.is_empty() {
        legacy
    } else {
        canonical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_container_is_empty() {
        let errors = Errors::with_status(StatusCode::BAD_REQUEST);
        assert_eq!(errors.code(), 400);
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut errors = Errors::new(400);
        errors
            .add_at("key1", "desc1", "loc1")
            .unwrap()
            .add("key2", "desc2")
            .unwrap()
            .push(Error::keyed("key3").unwrap());

        let keys: Vec<&str> = errors.iter().map(Error::key).collect();
        assert_eq!(keys, ["key1", "key2", "key3"]);
        assert_eq!(errors.as_slice()[0].location(), Some("loc1"));
    }

    #[test]
    fn test_add_with_empty_key_leaves_container_untouched() {
        let mut errors = Errors::new(400);
        assert!(errors.add("", "nothing").is_err());
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_required_field_scenario() {
        let mut errors = Errors::new(400);
        errors.add_at("field.required", "name is required", "name").unwrap();

        assert!(errors.has_errors());
        assert_eq!(errors.to_response().status(), 400);

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            json!({
                "code": 400,
                "error": [{
                    "key": "field.required",
                    "description": "name is required",
                    "location": "name"
                }]
            })
        );
    }

    #[test]
    fn test_json_reader_accepts_legacy_alias() {
        let legacy = r#"{"code":409,"errors":[{"key":"conflict"}]}"#;
        let errors: Errors = serde_json::from_str(legacy).unwrap();
        assert_eq!(errors, Errors::single(409, "conflict", "ignored").unwrap());
    }

    #[test]
    fn test_json_reader_prefers_canonical_field() {
        let both = r#"{"code":400,"error":[{"key":"a"}],"errors":[{"key":"a"}]}"#;
        let errors: Errors = serde_json::from_str(both).unwrap();
        assert_eq!(errors.error_count(), 1);
    }

    #[test]
    fn test_json_reader_falls_back_when_canonical_is_empty() {
        let both = r#"{"code":400,"error":[],"errors":[{"key":"a","location":"l"}]}"#;
        let errors: Errors = serde_json::from_str(both).unwrap();
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.as_slice()[0].location(), Some("l"));
    }

    #[test]
    fn test_into_response_uses_code() {
        let response = Errors::single(404, "user.missing", "no such user")
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
