use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::failure::Failure;

/// A single structured error: machine-readable key, optional description and location.
///
/// Two errors are equal when their `key` and `location` match. The description is
/// informational only and takes no part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ErrorRepr")]
pub struct Error {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl Error {
    /// Create an error with a description.
    ///
    /// `key` is converted to a string via its `Display` impl, so enums, numbers
    /// and strings can all be used as error codes. Fails with
    /// [`Failure::InvalidArgument`] if the key renders as an empty string.
    pub fn new(key: impl fmt::Display, description: impl Into<String>) -> Result<Self, Failure> {
        Ok(Self::keyed(key)?.with_description(description))
    }

    /// Create an error that carries only a key.
    pub fn keyed(key: impl fmt::Display) -> Result<Self, Failure> {
        Ok(Self {
            key: coerce_key(key, "error key")?,
            description: None,
            location: None,
        })
    }

    pub(crate) fn from_parts(
        key: impl fmt::Display,
        description: Option<String>,
        location: Option<String>,
    ) -> Result<Self, Failure> {
        Ok(Self {
            key: coerce_key(key, "error key")?,
            description,
            location,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the field or parameter the error refers to.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.location == other.location
    }
}

impl Eq for Error {}

impl Hash for Error {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.location.hash(state);
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        if let Some(description) = &self.description {
            write!(f, ": {}", description)?;
        }
        Ok(())
    }
}

/// Stringify a caller-supplied identifier, rejecting identifiers that render empty.
pub(crate) fn coerce_key(key: impl fmt::Display, what: &str) -> Result<String, Failure> {
    let key = key.to_string();
    if key.is_empty() {
        return Err(Failure::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(key)
}

/// Wire shape accepted on decode; a missing key is rejected rather than defaulted.
#[derive(Deserialize)]
struct ErrorRepr {
    key: Option<String>,
    description: Option<String>,
    location: Option<String>,
}

impl TryFrom<ErrorRepr> for Error {
    type Error = Failure;

    fn try_from(repr: ErrorRepr) -> Result<Self, Self::Error> {
        let key = repr
            .key
            .ok_or_else(|| Failure::InvalidArgument("error key is missing".to_string()))?;
        Self::from_parts(key, repr.description, repr.location)
    }
}
