//! Structured error payloads and the responses that carry them.

pub mod builder;
pub mod container;
pub mod error;
pub mod factory;
pub mod failure;
pub mod list;
pub mod map;
pub mod response;

pub use builder::ErrorResponseBuilder;
pub use container::{Entity, ErrorContainer};
pub use error::Error;
pub use failure::Failure;
pub use list::Errors;
pub use map::ErrorMap;
pub use response::{Cause, ErrorResponse};
