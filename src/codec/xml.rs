//! XML binding.
//!
//! ```xml
//! <errors code="400"><error><key>k</key><description>d</description></error></errors>
//! <errorMap code="409"><errorMap><entry><key>order-1</key><value><key>k</key></value></entry></errorMap></errorMap>
//! ```
//!
//! XML has no native map, so map entries use the `entry`/`key`/`value` layout that
//! existing clients already parse.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use super::WireFormat;
use crate::errors::list::canonical_or_legacy;
use crate::errors::{Error, ErrorContainer, ErrorMap, Errors, Failure};

#[derive(Debug, Serialize, Deserialize)]
struct XmlError {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl From<&Error> for XmlError {
    fn from(error: &Error) -> Self {
        Self {
            key: error.key().to_string(),
            description: error.description().map(str::to_string),
            location: error.location().map(str::to_string),
        }
    }
}

impl TryFrom<XmlError> for Error {
    type Error = Failure;

    fn try_from(xml: XmlError) -> Result<Self, Self::Error> {
        Error::from_parts(xml.key, xml.description, xml.location)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlErrors {
    #[serde(rename = "@code")]
    code: u16,
    #[serde(rename = "error", default, skip_serializing_if = "Vec::is_empty")]
    error: Vec<XmlError>,
    // Legacy alias, read only.
    #[serde(rename = "errors", default, skip_serializing)]
    legacy: Vec<XmlError>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlErrorMap {
    #[serde(rename = "@code")]
    code: u16,
    #[serde(rename = "errorMap", default, skip_serializing_if = "Option::is_none")]
    entries: Option<XmlEntries>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct XmlEntries {
    #[serde(default)]
    entry: Vec<XmlEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlEntry {
    key: String,
    value: XmlError,
}

fn encode<T: Serialize>(root: &str, value: &T) -> Result<String, Failure> {
    let xml = quick_xml::se::to_string_with_root(root, value)
        .map_err(|e| Failure::encoding(WireFormat::Xml, e))?;
    Ok(protect_edge_whitespace(&xml))
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// The deserializer trims text nodes, so whitespace at either end of a value is
/// written as character references, which survive trimming. Carriage returns are
/// always written that way because parsers may normalize line endings.
///
/// The serializer writes no indentation, so any whitespace between `>` and `<`
/// belongs to a text value.
fn protect_edge_whitespace(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(open) = rest.find('<') {
        push_text(&mut out, &rest[..open]);
        let close = rest[open..].find('>').map_or(rest.len(), |i| open + i + 1);
        out.push_str(&rest[open..close]);
        rest = &rest[close..];
    }
    push_text(&mut out, rest);
    out
}

fn push_text(out: &mut String, text: &str) {
    let body = text.trim_start_matches(is_xml_space);
    let (leading, body) = text.split_at(text.len() - body.len());
    let (body, trailing) = body.split_at(body.trim_end_matches(is_xml_space).len());

    push_char_refs(out, leading);
    out.push_str(&body.replace('\r', "&#13;"));
    push_char_refs(out, trailing);
}

fn push_char_refs(out: &mut String, whitespace: &str) {
    for c in whitespace.chars() {
        out.push_str(&format!("&#{};", u32::from(c)));
    }
}

fn decode<T: for<'de> Deserialize<'de>>(payload: &str) -> Result<T, Failure> {
    quick_xml::de::from_str(payload).map_err(|e| Failure::encoding(WireFormat::Xml, e))
}

pub fn error_to_string(error: &Error) -> Result<String, Failure> {
    encode("error", &XmlError::from(error))
}

pub fn error_from_str(payload: &str) -> Result<Error, Failure> {
    decode::<XmlError>(payload)?.try_into()
}

pub fn errors_to_string(errors: &Errors) -> Result<String, Failure> {
    let xml = XmlErrors {
        code: errors.code(),
        error: errors.iter().map(XmlError::from).collect(),
        legacy: Vec::new(),
    };
    encode("errors", &xml)
}

pub fn errors_from_str(payload: &str) -> Result<Errors, Failure> {
    let xml: XmlErrors = decode(payload)?;
    let mut errors = Errors::new(xml.code);
    for item in canonical_or_legacy(xml.error, xml.legacy) {
        errors.push(item.try_into()?);
    }
    Ok(errors)
}

pub fn error_map_to_string(map: &ErrorMap) -> Result<String, Failure> {
    let entries = map
        .iter()
        .map(|(key, error)| XmlEntry {
            key: key.clone(),
            value: XmlError::from(error),
        })
        .collect::<Vec<_>>();

    let xml = XmlErrorMap {
        code: map.code(),
        entries: (!entries.is_empty()).then_some(XmlEntries { entry: entries }),
    };
    encode("errorMap", &xml)
}

pub fn error_map_from_str(payload: &str) -> Result<ErrorMap, Failure> {
    let xml: XmlErrorMap = decode(payload)?;

    let mut map = ErrorMap::new(xml.code);
    for entry in xml.entries.unwrap_or_default().entry {
        map.put_error(entry.key, entry.value.try_into()?)?;
    }
    Ok(map)
}

/// Name of the document's root element, skipping the prolog and comments.
pub(crate) fn root_name(payload: &str) -> Result<&'static str, Failure> {
    let mut reader = Reader::from_str(payload);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return match e.local_name().as_ref() {
                    b"errors" => Ok("errors"),
                    b"errorMap" => Ok("errorMap"),
                    b"error" => Ok("error"),
                    other => Err(Failure::encoding(
                        WireFormat::Xml,
                        format!("unexpected root element '{}'", String::from_utf8_lossy(other)),
                    )),
                };
            }
            Ok(Event::Eof) => {
                return Err(Failure::encoding(WireFormat::Xml, "document has no root element"))
            }
            Ok(_) => continue,
            Err(e) => return Err(Failure::encoding(WireFormat::Xml, e)),
        }
    }
}
