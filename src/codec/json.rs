use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::WireFormat;
use crate::errors::Failure;

pub fn to_string<T: Serialize>(value: &T) -> Result<String, Failure> {
    serde_json::to_string(value).map_err(|e| Failure::encoding(WireFormat::Json, e))
}

pub fn from_str<T: DeserializeOwned>(payload: &str) -> Result<T, Failure> {
    serde_json::from_str(payload).map_err(|e| Failure::encoding(WireFormat::Json, e))
}

/// JSON has no root element; infer the one the XML form would use from the fields.
pub(crate) fn root_name(payload: &str) -> Result<&'static str, Failure> {
    let value: Value = from_str(payload)?;
    let Some(object) = value.as_object() else {
        return Err(Failure::encoding(WireFormat::Json, "expected a JSON object"));
    };

    if object.contains_key("errorMap") {
        Ok("errorMap")
    } else if object.contains_key("key") {
        Ok("error")
    } else if object.contains_key("code") {
        Ok("errors")
    } else {
        Err(Failure::encoding(
            WireFormat::Json,
            "object is neither an error nor an error container",
        ))
    }
}
