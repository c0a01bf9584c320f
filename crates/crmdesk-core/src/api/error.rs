use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message surfaced when a request was sent but no response came back.
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please try again.";

/// Message surfaced when a request could not be built or sent at all.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed. Please try again.";

/// Maximum length for error response bodies in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Normalized error returned by every `HttpClient` call.
///
/// Callers never see raw transport errors: a server rejection carries the
/// server's payload, and everything else collapses to a fixed message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", rejected_message(.status, .payload))]
    Rejected {
        status: StatusCode,
        payload: ErrorPayload,
    },

    #[error("No response from server. Please try again.")]
    NoResponse(#[source] reqwest::Error),

    #[error("Request failed. Please try again.")]
    RequestSetup(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Rejected {
            status,
            payload: ErrorPayload::from_body(body),
        }
    }

    /// Map a reqwest failure to the no-response / request-setup split.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::RequestSetup(err.to_string())
        } else {
            ApiError::NoResponse(err)
        }
    }

    /// User-facing message, the same text `Display` produces.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Rejected { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

fn rejected_message(status: &StatusCode, payload: &ErrorPayload) -> String {
    match payload.message() {
        Some(message) => message.to_string(),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

/// Body of a non-2xx response, kept as the server sent it.
///
/// JSON bodies are stored parsed; anything else is kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload(Value);

impl ErrorPayload {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self(value),
            Err(_) => Self(Value::String(body.to_string())),
        }
    }

    /// The `message` field of a JSON object body, or a non-empty text body.
    pub fn message(&self) -> Option<&str> {
        match &self.0 {
            Value::Object(map) => map.get("message").and_then(Value::as_str),
            Value::String(text) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_server_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid credentials"}"#,
        );
        assert_eq!(err.message(), "Invalid credentials");
        assert!(err.is_unauthorized());
        assert_eq!(
            err.payload().and_then(|p| p.field("message")),
            Some(&Value::String("Invalid credentials".to_string()))
        );
    }

    #[test]
    fn test_rejected_keeps_extra_payload_fields() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Email taken","field":"email"}"#,
        );
        let payload = err.payload().unwrap();
        assert_eq!(payload.field("field"), Some(&Value::String("email".to_string())));
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_rejected_text_body_passes_through() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.message(), "upstream down");
        assert_eq!(
            err.payload().unwrap().as_value(),
            &Value::String("upstream down".to_string())
        );
    }

    #[test]
    fn test_rejected_without_message_falls_back_to_status() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.message(), "Request failed with status 500");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"nope"}"#);
        assert_eq!(err.message(), "Request failed with status 404");
    }

    #[test]
    fn test_fixed_messages() {
        let err = ApiError::RequestSetup("relative URL without a base".to_string());
        assert_eq!(err.message(), REQUEST_FAILED_MESSAGE);
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }
}
