//! Wire formats for the error payloads.
//!
//! Field names are fixed: a list container is `errors` with a `code` and repeated
//! `error` items, a map container is `errorMap` with a `code` and a nested `errorMap`,
//! and each item carries `key`, `description` and `location`. Readers also accept the
//! legacy `errors` name for the repeated item field; writers never emit it.

pub mod json;
pub mod xml;

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Entity, Error, ErrorMap, Errors, Failure};

/// Encoding used for an error payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    Xml,
}

impl WireFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Pick a format from the `Accept` header, falling back to `default` when the
    /// header is absent, a wildcard, or names neither JSON nor XML.
    pub fn from_accept(headers: &HeaderMap, default: WireFormat) -> WireFormat {
        let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
            return default;
        };

        let mut best: Option<(WireFormat, f32)> = None;
        for range in accept.split(',') {
            let mut parts = range.split(';');
            let media = parts.next().unwrap_or("").trim().to_ascii_lowercase();
            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);

            let format = match media.as_str() {
                "application/json" => WireFormat::Json,
                "application/xml" | "text/xml" => WireFormat::Xml,
                m if m.ends_with("+json") => WireFormat::Json,
                m if m.ends_with("+xml") => WireFormat::Xml,
                _ => continue,
            };

            if quality > 0.0 && best.map_or(true, |(_, q)| quality > q) {
                best = Some((format, quality));
            }
        }

        best.map_or(default, |(format, _)| format)
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(Failure::InvalidArgument(format!(
                "unknown wire format '{}', expected json or xml",
                other
            ))),
        }
    }
}

/// A payload that can be written to and read back from both wire formats.
pub trait WireEntity: Sized {
    fn encode(&self, format: WireFormat) -> Result<String, Failure>;

    fn decode(format: WireFormat, payload: &str) -> Result<Self, Failure>;
}

impl WireEntity for Error {
    fn encode(&self, format: WireFormat) -> Result<String, Failure> {
        match format {
            WireFormat::Json => json::to_string(self),
            WireFormat::Xml => xml::error_to_string(self),
        }
    }

    fn decode(format: WireFormat, payload: &str) -> Result<Self, Failure> {
        match format {
            WireFormat::Json => json::from_str(payload),
            WireFormat::Xml => xml::error_from_str(payload),
        }
    }
}

impl WireEntity for Errors {
    fn encode(&self, format: WireFormat) -> Result<String, Failure> {
        match format {
            WireFormat::Json => json::to_string(self),
            WireFormat::Xml => xml::errors_to_string(self),
        }
    }

    fn decode(format: WireFormat, payload: &str) -> Result<Self, Failure> {
        match format {
            WireFormat::Json => json::from_str(payload),
            WireFormat::Xml => xml::errors_from_str(payload),
        }
    }
}

impl WireEntity for ErrorMap {
    fn encode(&self, format: WireFormat) -> Result<String, Failure> {
        match format {
            WireFormat::Json => json::to_string(self),
            WireFormat::Xml => xml::error_map_to_string(self),
        }
    }

    fn decode(format: WireFormat, payload: &str) -> Result<Self, Failure> {
        match format {
            WireFormat::Json => json::from_str(payload),
            WireFormat::Xml => xml::error_map_from_str(payload),
        }
    }
}

impl WireEntity for Entity {
    fn encode(&self, format: WireFormat) -> Result<String, Failure> {
        match self {
            Self::Errors(errors) => errors.encode(format),
            Self::ErrorMap(map) => map.encode(format),
            Self::Error(error) => error.encode(format),
        }
    }

    /// Detects the payload kind from its shape: the XML root element, or the JSON
    /// object's fields.
    fn decode(format: WireFormat, payload: &str) -> Result<Self, Failure> {
        let root = match format {
            WireFormat::Json => json::root_name(payload)?,
            WireFormat::Xml => xml::root_name(payload)?,
        };
        match root {
            "errors" => Errors::decode(format, payload).map(Entity::Errors),
            "errorMap" => ErrorMap::decode(format, payload).map(Entity::ErrorMap),
            "error" => Error::decode(format, payload).map(Entity::Error),
            other => Err(Failure::encoding(
                format,
                format!("unexpected root element '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_negotiation_defaults() {
        assert_eq!(WireFormat::from_accept(&HeaderMap::new(), WireFormat::Xml), WireFormat::Xml);
        assert_eq!(WireFormat::from_accept(&accept("*/*"), WireFormat::Json), WireFormat::Json);
        assert_eq!(WireFormat::from_accept(&accept("text/html"), WireFormat::Xml), WireFormat::Xml);
    }

    #[test]
    fn test_negotiation_picks_named_format() {
        assert_eq!(
            WireFormat::from_accept(&accept("application/xml"), WireFormat::Json),
            WireFormat::Xml
        );
        assert_eq!(
            WireFormat::from_accept(&accept("text/html, application/problem+json"), WireFormat::Xml),
            WireFormat::Json
        );
    }

    #[test]
    fn test_negotiation_respects_quality() {
        assert_eq!(
            WireFormat::from_accept(
                &accept("application/json;q=0.5, application/xml;q=0.9"),
                WireFormat::Json
            ),
            WireFormat::Xml
        );
        assert_eq!(
            WireFormat::from_accept(&accept("application/xml;q=0"), WireFormat::Json),
            WireFormat::Json
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("XML".parse::<WireFormat>().unwrap(), WireFormat::Xml);
        assert_eq!(" json ".parse::<WireFormat>().unwrap(), WireFormat::Json);
        assert!("yaml".parse::<WireFormat>().is_err());
    }

    #[test]
    fn test_entity_decode_detects_kind() {
        let mut map = ErrorMap::new(409);
        map.put("order-1", "stock.unavailable", "no stock").unwrap();
        let errors = Errors::single(400, "name.invalid", "must not be blank").unwrap();
        let error = Error::keyed("standalone").unwrap();

        for format in [WireFormat::Json, WireFormat::Xml] {
            for entity in [
                Entity::from(map.clone()),
                Entity::from(errors.clone()),
                Entity::from(error.clone()),
            ] {
                let payload = entity.encode(format).unwrap();
                assert_eq!(Entity::decode(format, &payload).unwrap(), entity);
            }
        }
    }
}
