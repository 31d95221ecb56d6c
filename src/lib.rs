//! Structured error payloads for HTTP handlers.
//!
//! A business failure becomes a status code plus one or more `key`/`description`/`location`
//! entries, held either as an ordered list ([`errors::Errors`]) or keyed by the entity that
//! failed ([`errors::ErrorMap`]). Both render to JSON or XML with a fixed field-naming
//! contract ([`codec`]) and decode back to equal values.

pub mod api;
pub mod codec;
pub mod config;
pub mod errors;
pub mod metrics;

pub use codec::{WireEntity, WireFormat};
pub use errors::{
    factory, Entity, Error, ErrorContainer, ErrorMap, ErrorResponse, ErrorResponseBuilder, Errors,
    Failure,
};
