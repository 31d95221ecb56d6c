use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::container::ErrorContainer;
use super::error::{coerce_key, Error};
use super::failure::Failure;

/// Errors keyed by the entity they belong to.
///
/// Meant for batch requests where one failed item must not hide which item it was:
///
/// ```
/// use structured_errors::errors::{ErrorContainer, ErrorMap};
///
/// let mut error_map = ErrorMap::new(409);
/// for (order_id, in_stock) in [(1, true), (2, false)] {
///     if !in_stock {
///         error_map.put(order_id, "stock.unavailable", "no stock")?;
///     }
/// }
/// assert_eq!(error_map.get(2).map(|e| e.key()), Some("stock.unavailable"));
/// assert!(error_map.get(1).is_none());
/// # Ok::<(), structured_errors::errors::Failure>(())
/// ```
///
/// Entries are ordered by entity key so a given map always encodes the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ErrorMapRepr")]
pub struct ErrorMap {
    code: u16,
    #[serde(rename = "errorMap", default)]
    entries: BTreeMap<String, Error>,
}

impl ErrorMap {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            entries: BTreeMap::new(),
        }
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self::new(status.as_u16())
    }

    /// Store an error for `entity_key`, replacing any previous one.
    pub fn put(
        &mut self,
        entity_key: impl fmt::Display,
        error_key: impl fmt::Display,
        description: impl Into<String>,
    ) -> Result<&mut Self, Failure> {
        let error = Error::new(error_key, description)?;
        self.put_error(entity_key, error)
    }

    /// Store an error without description.
    pub fn put_key(
        &mut self,
        entity_key: impl fmt::Display,
        error_key: impl fmt::Display,
    ) -> Result<&mut Self, Failure> {
        let error = Error::keyed(error_key)?;
        self.put_error(entity_key, error)
    }

    pub fn put_at(
        &mut self,
        entity_key: impl fmt::Display,
        error_key: impl fmt::Display,
        description: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<&mut Self, Failure> {
        let error = Error::new(error_key, description)?.at(location);
        self.put_error(entity_key, error)
    }

    pub fn put_error(
        &mut self,
        entity_key: impl fmt::Display,
        error: Error,
    ) -> Result<&mut Self, Failure> {
        let entity_key = coerce_key(entity_key, "entity key")?;
        self.entries.insert(entity_key, error);
        Ok(self)
    }

    /// Error recorded for `entity_key`, if any.
    pub fn get(&self, entity_key: impl fmt::Display) -> Option<&Error> {
        self.entries.get(&entity_key.to_string())
    }

    pub fn error_map(&self) -> &BTreeMap<String, Error> {
        &self.entries
    }

    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Error> {
        self.entries.iter()
    }
}

impl ErrorContainer for ErrorMap {
    fn code(&self) -> u16 {
        self.code
    }

    fn errors(&self) -> Vec<&Error> {
        self.entries.values().collect()
    }

    fn error_count(&self) -> usize {
        self.entries.len()
    }
}

impl IntoResponse for ErrorMap {
    fn into_response(self) -> Response {
        self.into_failure().into_response()
    }
}

/// Decode shape; entries go through [`ErrorMap::put_error`] so decoded maps obey
/// the same key rules as built ones.
#[derive(Deserialize)]
struct ErrorMapRepr {
    code: u16,
    #[serde(rename = "errorMap", default)]
    entries: BTreeMap<String, Error>,
}

impl TryFrom<ErrorMapRepr> for ErrorMap {
    type Error = Failure;

    fn try_from(repr: ErrorMapRepr) -> Result<Self, Self::Error> {
        let mut map = ErrorMap::new(repr.code);
        for (entity_key, error) in repr.entries {
            map.put_error(entity_key, error)?;
        }
        Ok(map)
    }
}
