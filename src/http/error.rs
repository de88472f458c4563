use std::error::Error as StdError;
use std::fmt;

use reqwest::header::InvalidHeaderValue;
use reqwest::{Error as ReqwestError, Method, Response, StatusCode};
use url::ParseError as UrlError;

/// The error body Discord sends along with unsuccessful responses.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[non_exhaustive]
pub struct DiscordJsonError {
    /// The error code.
    pub code: isize,
    /// The error message.
    pub message: String,
}

/// An unsuccessful response received from Discord.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ErrorResponse {
    pub status_code: StatusCode,
    pub url: String,
    pub method: Method,
    pub error: DiscordJsonError,
}

impl ErrorResponse {
    // We need a freestanding from-function since we cannot implement an async From-trait.
    pub(crate) async fn from_response(r: Response, method: Method) -> Self {
        let status_code = r.status();
        let url = r.url().to_string();

        let error = match r.bytes().await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| DiscordJsonError {
                code: -1,
                message: format!("Could not decode the error response from Discord: {e}"),
            }),
            Err(e) => DiscordJsonError {
                code: -1,
                message: format!("Could not read the error response from Discord: {e}"),
            },
        };

        ErrorResponse {
            status_code,
            url,
            method,
            error,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// When a non-successful status code was received for a request.
    UnsuccessfulRequest(ErrorResponse),
    /// When parsing an URL failed due to invalid input.
    Url(UrlError),
    /// Header value contains invalid input.
    InvalidHeader(InvalidHeaderValue),
    /// Reqwest's Error contain information on why sending a request failed.
    Request(ReqwestError),
}

impl HttpError {
    /// Returns true when the error is caused by an unsuccessful request
    #[must_use]
    pub fn is_unsuccessful_request(&self) -> bool {
        matches!(self, Self::UnsuccessfulRequest(_))
    }

    /// Returns the status code if the error is an unsuccessful request
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::UnsuccessfulRequest(res) => Some(res.status_code),
            _ => None,
        }
    }
}

impl From<ErrorResponse> for HttpError {
    fn from(error: ErrorResponse) -> Self {
        Self::UnsuccessfulRequest(error)
    }
}

impl From<ReqwestError> for HttpError {
    fn from(error: ReqwestError) -> Self {
        Self::Request(error)
    }
}

impl From<UrlError> for HttpError {
    fn from(error: UrlError) -> Self {
        Self::Url(error)
    }
}

impl From<InvalidHeaderValue> for HttpError {
    fn from(error: InvalidHeaderValue) -> Self {
        Self::InvalidHeader(error)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsuccessfulRequest(e) => {
                write!(f, "{} ({} {} -> {})", e.error.message, e.method, e.url, e.status_code)
            },
            Self::Url(_) => f.write_str("Provided URL is incorrect."),
            Self::InvalidHeader(_) => f.write_str("Provided value is an invalid header value."),
            Self::Request(_) => f.write_str("Error while sending HTTP request."),
        }
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Url(inner) => Some(inner),
            Self::Request(inner) => Some(inner),
            Self::InvalidHeader(inner) => Some(inner),
            Self::UnsuccessfulRequest(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_of_unsuccessful_request() {
        let error = HttpError::UnsuccessfulRequest(ErrorResponse {
            status_code: StatusCode::FORBIDDEN,
            url: "https://discord.com/api/v10/channels/1/messages".to_string(),
            method: Method::GET,
            error: DiscordJsonError {
                code: 50001,
                message: "Missing Access".to_string(),
            },
        });

        assert!(error.is_unsuccessful_request());
        assert_eq!(error.status_code(), Some(StatusCode::FORBIDDEN));
        assert_eq!(
            error.to_string(),
            "Missing Access (GET https://discord.com/api/v10/channels/1/messages -> 403 Forbidden)"
        );
    }
}
