use std::error::Error as StdError;
use std::fmt;

use crate::http::HttpError;
use crate::json::{JsonError, Value};
use crate::model::ModelError;

/// The common result type between most library functions.
///
/// The library exposes functions which, for a result type, exposes only one type, rather than the
/// usual 2 (`Result<T, Error>`). This is because all functions that return a result return
/// the crate's [`Error`], so this is implied, and a "simpler" result is used.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A common error enum returned by most of the library's functionality within a custom
/// [`Result`].
///
/// The most common error types, the [`ModelError`] and [`HttpError`] enums, are both wrapped
/// around this in the form of the [`Self::Model`] and [`Self::Http`] variants.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An error while decoding a payload.
    ///
    /// Carries the name of the field that was missing or malformed, and the offending value (or
    /// [`Value::Null`] when the field was absent).
    Decode(&'static str, Value),
    /// An error from the `serde_json` crate.
    Json(JsonError),
    /// An error from the [`model`] module.
    ///
    /// [`model`]: crate::model
    Model(ModelError),
    /// An error from the [`http`] module.
    ///
    /// [`http`]: crate::http
    Http(HttpError),
}

impl Error {
    /// Returns the [`ModelError`] wrapped by this error, if any.
    #[must_use]
    pub fn model_error(&self) -> Option<&ModelError> {
        match self {
            Self::Model(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<JsonError> for Error {
    fn from(e: JsonError) -> Error {
        Error::Json(e)
    }
}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Error {
        Error::Model(e)
    }
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Error {
        Error::Http(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(field, _) => write!(f, "Failed to decode field `{field}`"),
            Self::Json(inner) => fmt::Display::fmt(&inner, f),
            Self::Model(inner) => fmt::Display::fmt(&inner, f),
            Self::Http(inner) => fmt::Display::fmt(&inner, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Json(inner) => Some(inner),
            Self::Model(inner) => Some(inner),
            Self::Http(inner) => Some(inner),
            Self::Decode(..) => None,
        }
    }
}
