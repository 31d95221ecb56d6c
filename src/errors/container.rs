use super::error::Error;
use super::failure::Failure;
use super::list::Errors;
use super::map::ErrorMap;
use super::response::ErrorResponse;

/// Read-only view shared by the list and map containers, so one response-building
/// path serves both single-error and batch failures.
pub trait ErrorContainer {
    /// HTTP status code reported with this container.
    fn code(&self) -> u16;

    /// The stored errors. Order follows insertion for [`Errors`] and entity key
    /// order for [`ErrorMap`].
    fn errors(&self) -> Vec<&Error>;

    fn error_count(&self) -> usize {
        self.errors().len()
    }

    /// `false` means the container must not be treated as a failure signal.
    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Response with a copy of this container as body and `code` as status.
    fn to_response(&self) -> ErrorResponse
    where
        Self: Clone + Into<Entity>,
    {
        ErrorResponse::new(self.code(), Some(self.clone().into()))
    }

    /// Consume the container into a failure that can be returned with `?`.
    fn into_failure(self) -> Failure
    where
        Self: Sized + Into<Entity>,
    {
        let code = self.code();
        ErrorResponse::new(code, Some(self.into())).into()
    }
}

/// Body carried by an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Errors(Errors),
    ErrorMap(ErrorMap),
    Error(Error),
}

impl Entity {
    /// Root element name used by both wire formats' documentation and by XML.
    pub fn root_name(&self) -> &'static str {
        match self {
            Self::Errors(_) => "errors",
            Self::ErrorMap(_) => "errorMap",
            Self::Error(_) => "error",
        }
    }
}

impl From<Errors> for Entity {
    fn from(errors: Errors) -> Self {
        Self::Errors(errors)
    }
}

impl From<ErrorMap> for Entity {
    fn from(map: ErrorMap) -> Self {
        Self::ErrorMap(map)
    }
}

impl From<Error> for Entity {
    fn from(error: Error) -> Self {
        Self::Error(error)
    }
}
