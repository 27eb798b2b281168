//! Envelope responses
//!
//! Some backends answer HTTP 200 with an error embedded in the body. Response
//! types that carry such an indicator implement [`EnvelopeResponse`] so the
//! classifier can ask them whether the call really succeeded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A body that carries its own success/error indicator
pub trait EnvelopeResponse {
    /// Defaults to "no error code means success"
    fn is_success(&self) -> bool {
        self.error_code().is_none()
    }

    fn error_code(&self) -> Option<String> {
        None
    }

    fn error_data(&self) -> Option<Value> {
        None
    }

    /// Raw error body the envelope was built from
    fn error_body(&self) -> Option<String> {
        None
    }
}

impl<E: EnvelopeResponse + ?Sized> EnvelopeResponse for Box<E> {
    fn is_success(&self) -> bool {
        (**self).is_success()
    }

    fn error_code(&self) -> Option<String> {
        (**self).error_code()
    }

    fn error_data(&self) -> Option<Value> {
        (**self).error_data()
    }

    fn error_body(&self) -> Option<String> {
        (**self).error_body()
    }
}

/// Envelope for bodies with no meaningful payload (e.g. `{}` on create)
impl EnvelopeResponse for Value {
    fn is_success(&self) -> bool {
        true
    }
}

/// Error envelope built by the pipeline itself. Never successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: Option<String>,
    pub data: Option<Value>,
    pub body: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code: Some(code.into()),
            data,
            body: None,
        }
    }

    /// Envelope with a plain text payload
    pub fn with_message(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Some(Value::String(message.into())))
    }

    /// HTTP status as code, status message as data
    pub fn from_status(status: u16, message: &str, body: Option<&str>) -> Self {
        Self {
            code: Some(status.to_string()),
            data: Some(Value::String(message.to_string())),
            body: body.map(str::to_string),
        }
    }
}

impl EnvelopeResponse for ErrorEnvelope {
    fn is_success(&self) -> bool {
        false
    }

    fn error_code(&self) -> Option<String> {
        self.code.clone()
    }

    fn error_data(&self) -> Option<Value> {
        self.data.clone()
    }

    fn error_body(&self) -> Option<String> {
        self.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ListResponse {
        code: Option<String>,
    }

    impl EnvelopeResponse for ListResponse {
        fn error_code(&self) -> Option<String> {
            self.code.clone()
        }
    }

    #[test]
    fn test_default_success_follows_error_code() {
        assert!(ListResponse { code: None }.is_success());
        assert!(!ListResponse {
            code: Some("ERR-001".to_string())
        }
        .is_success());
        assert_eq!(ListResponse { code: None }.error_data(), None);
        assert_eq!(ListResponse { code: None }.error_body(), None);
    }

    #[test]
    fn test_error_envelope_is_never_successful() {
        let envelope = ErrorEnvelope {
            code: None,
            data: None,
            body: None,
        };
        assert!(!envelope.is_success());

        let envelope = ErrorEnvelope::from_status(400, "Bad Request", Some("{}"));
        assert_eq!(envelope.error_code().as_deref(), Some("400"));
        assert_eq!(envelope.error_data(), Some(Value::String("Bad Request".to_string())));
        assert_eq!(envelope.error_body().as_deref(), Some("{}"));
    }

    #[test]
    fn test_boxed_envelope_delegates() {
        let boxed: Box<dyn EnvelopeResponse> =
            Box::new(ErrorEnvelope::with_message("-402", "slow"));
        assert!(!boxed.is_success());
        assert_eq!(boxed.error_code().as_deref(), Some("-402"));
    }
}
