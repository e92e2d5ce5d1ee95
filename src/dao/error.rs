//! Error types shared by every scoring API implementation.

use std::{error::Error, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown to users whenever the scoring service cannot be reached.
pub const UNAVAILABLE_MESSAGE: &str = "Sistema indisponível";

/// Convenient result alias returning [`ApiError`] failures.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failures that can occur while talking to the scoring API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build scoring API client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("Sistema indisponível")]
    Unavailable {
        /// API path of the failed request.
        path: String,
        /// Transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// API path of the failed request.
        path: String,
        /// Status code returned by the server.
        status: StatusCode,
        /// Detail extracted from the response body.
        message: String,
    },
    /// A success body did not match the expected schema.
    #[error("failed to decode scoring API response for `{path}`")]
    Decode {
        /// API path whose body failed to decode.
        path: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// A download answered with something that is not a file payload.
    #[error("unexpected content type `{content_type}` for `{path}`")]
    UnexpectedContentType {
        /// API path of the download.
        path: String,
        /// Content type the server announced.
        content_type: String,
    },
    /// Writing a downloaded file to disk failed.
    #[error("failed to write `{}`", .path.display())]
    Write {
        /// Destination file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Construct an unavailable error from any transport failure.
    pub fn unavailable(
        path: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::Unavailable {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Construct a rejection carrying the server's human-readable message.
    pub fn rejected(
        path: impl Into<String>,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        ApiError::Rejected {
            path: path.into(),
            status,
            message: message.into(),
        }
    }

    /// True when the server could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::Unavailable { .. })
    }

    /// HTTP status of a rejection, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
