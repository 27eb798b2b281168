//! Error body parsing strategies
//!
//! A datasource holds one [`ErrorParser`]. Backends that do not share an
//! error schema plug in their own parser instead of subclassing anything.

use crate::codes::JSON_FORMAT;
use crate::envelope::{EnvelopeResponse, ErrorEnvelope};
use crate::failure::NetworkFailure;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Turns an unsuccessful HTTP response into an envelope or a failure
pub trait ErrorParser: Send + Sync {
    /// Enveloped path: build an envelope from status, message and raw body.
    ///
    /// The default keeps the status as code and the message as data without
    /// looking at the body.
    fn parse_error_type(
        &self,
        code: u16,
        message: &str,
        body: Option<&str>,
    ) -> Box<dyn EnvelopeResponse> {
        Box::new(ErrorEnvelope::from_status(code, message, body))
    }

    /// Generic path: build the failure directly.
    ///
    /// The default is a server failure carrying `"<message>:<body>"`.
    fn parse_generic_error_type(
        &self,
        code: u16,
        message: &str,
        body: Option<&str>,
    ) -> NetworkFailure {
        NetworkFailure::ServerFailure {
            code: Some(code.to_string()),
            data: Some(Value::String(format!("{}:{}", message, body.unwrap_or("null")))),
        }
    }
}

/// Parser with the default behaviour for both seams
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorParser;

impl ErrorParser for DefaultErrorParser {}

/// `{"code": "...", "message": "..."}`; the message may be missing or null
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleError {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of a [`ComplexError`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
    #[serde(default)]
    pub stack: Vec<String>,
}

/// `{"code": "...", "data": {"message": "...", "stack": [...]}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexError {
    pub code: String,
    pub data: ErrorDetail,
}

/// Parser for backends answering either a simple `{code, message}` error or
/// a complex `{code, data: {message, stack}}` one.
///
/// A blank body falls back to the status code and message. A body matching
/// neither shape becomes a `JSON_FORMAT` envelope carrying the decoder error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeMessageErrorParser;

impl CodeMessageErrorParser {
    /// The complex shape is tried first: a simple error with an optional
    /// message would also accept `{code, data}` and drop the payload.
    fn parse_body(body: &str) -> Result<ErrorEnvelope, serde_json::Error> {
        if let Ok(complex) = serde_json::from_str::<ComplexError>(body) {
            let data = serde_json::to_value(&complex.data)?;
            return Ok(ErrorEnvelope {
                code: Some(complex.code),
                data: Some(data),
                body: Some(body.to_string()),
            });
        }

        let simple: SimpleError = serde_json::from_str(body)?;
        Ok(ErrorEnvelope {
            code: Some(simple.code),
            data: simple.message.map(Value::String),
            body: Some(body.to_string()),
        })
    }
}

impl ErrorParser for CodeMessageErrorParser {
    fn parse_error_type(
        &self,
        code: u16,
        message: &str,
        body: Option<&str>,
    ) -> Box<dyn EnvelopeResponse> {
        let text = match body.filter(|b| !b.trim().is_empty()) {
            Some(text) => text,
            None => return Box::new(ErrorEnvelope::from_status(code, message, body)),
        };

        match Self::parse_body(text) {
            Ok(envelope) => Box::new(envelope),
            Err(e) => {
                tracing::debug!(status = code, error = %e, "Error body matches no known shape");
                Box::new(ErrorEnvelope {
                    code: Some(JSON_FORMAT.to_string()),
                    data: Some(Value::String(e.to_string())),
                    body: Some(text.to_string()),
                })
            }
        }
    }
}
