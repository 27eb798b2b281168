//! Error types shared by the Rocket network crates
//!
//! Two families live here:
//! - [`Error`] for infrastructure problems (bad base URL, client construction,
//!   invalid configuration) that happen outside a single call
//! - [`NetworkException`] for transport faults raised while executing a call.
//!   These never reach callers of a datasource: they are normalized into a
//!   failure value first.

use crate::transport::RequestInfo;
use thiserror::Error;

/// Result type alias for infrastructure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure errors
#[derive(Error, Debug)]
pub enum Error {
    /// Base URL or request path could not be turned into a URL
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        url: String,
        message: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {message}")]
    ClientBuild {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Configuration values are out of range or inconsistent
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Transport faults raised while executing a single call.
///
/// Every variant may carry the [`RequestInfo`] of the request that failed so
/// the fault can be reported with method, URL and headers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkException {
    /// The connectivity gate reported the device offline; nothing was sent
    #[error("Network not connected!")]
    NoConnection { request: Option<RequestInfo> },

    /// The transport gave up waiting for the server
    #[error("Request timed out: {message}")]
    Timeout {
        message: String,
        request: Option<RequestInfo>,
    },

    /// The host name could not be resolved
    #[error("Unknown host: {message}")]
    UnknownHost {
        message: String,
        request: Option<RequestInfo>,
    },

    /// Any other I/O fault
    #[error("{message}")]
    Io {
        message: String,
        request: Option<RequestInfo>,
    },

    /// The caller cancelled the call before a response arrived
    #[error("Request cancelled")]
    Cancelled { request: Option<RequestInfo> },
}

impl NetworkException {
    /// Offline fault without request context
    pub fn no_connection() -> Self {
        NetworkException::NoConnection { request: None }
    }

    /// Timeout fault without request context
    pub fn timeout(message: impl Into<String>) -> Self {
        NetworkException::Timeout {
            message: message.into(),
            request: None,
        }
    }

    /// Unknown host fault without request context
    pub fn unknown_host(message: impl Into<String>) -> Self {
        NetworkException::UnknownHost {
            message: message.into(),
            request: None,
        }
    }

    /// Generic I/O fault without request context
    pub fn io(message: impl Into<String>) -> Self {
        NetworkException::Io {
            message: message.into(),
            request: None,
        }
    }

    /// Cancellation without request context
    pub fn cancelled() -> Self {
        NetworkException::Cancelled { request: None }
    }

    /// Attach the request that was being executed
    pub fn with_request(self, info: RequestInfo) -> Self {
        let request = Some(info);
        match self {
            NetworkException::NoConnection { .. } => NetworkException::NoConnection { request },
            NetworkException::Timeout { message, .. } => {
                NetworkException::Timeout { message, request }
            }
            NetworkException::UnknownHost { message, .. } => {
                NetworkException::UnknownHost { message, request }
            }
            NetworkException::Io { message, .. } => NetworkException::Io { message, request },
            NetworkException::Cancelled { .. } => NetworkException::Cancelled { request },
        }
    }

    /// Request context, when known
    pub fn request(&self) -> Option<&RequestInfo> {
        match self {
            NetworkException::NoConnection { request }
            | NetworkException::Timeout { request, .. }
            | NetworkException::UnknownHost { request, .. }
            | NetworkException::Io { request, .. }
            | NetworkException::Cancelled { request } => request.as_ref(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::ClientBuild {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
