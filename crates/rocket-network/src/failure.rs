//! Closed failure taxonomy exposed to callers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Every way a datasource call can fail
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetworkFailure {
    /// The server (or an I/O fault) produced an error with a code and payload
    #[error("Server failure [{}]: {}", .code.as_deref().unwrap_or("none"), display_data(.data))]
    ServerFailure {
        code: Option<String>,
        data: Option<Value>,
    },

    #[error("Request timed out")]
    Timeout,

    #[error("Unknown host")]
    UnknownHost,

    /// A body could not be decoded
    #[error("Invalid JSON format: {}", .0.as_deref().unwrap_or("unknown"))]
    JsonFormat(Option<String>),

    #[error("No internet connection")]
    NoInternetConnection,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Untrusted connection")]
    Untrusted,

    #[error("Too many requests ({0})")]
    TooManyRequests(u16),

    #[error("Network connection failure")]
    NetworkConnection,
}

impl NetworkFailure {
    /// Server failure with a string payload
    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        NetworkFailure::ServerFailure {
            code: Some(code.into()),
            data: Some(Value::String(message.into())),
        }
    }

    /// Code of a server failure
    pub fn code(&self) -> Option<&str> {
        match self {
            NetworkFailure::ServerFailure { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Payload of a server failure
    pub fn data(&self) -> Option<&Value> {
        match self {
            NetworkFailure::ServerFailure { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

/// Render a payload the way it reads in a message: strings unquoted
pub(crate) fn display_data(data: &Option<Value>) -> String {
    match data {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "null".to_string(),
    }
}
