//! Client error types.
//!
//! Every failure a screen can observe is folded into [`ClientError`]. The
//! variants follow the taxonomy the UI cares about: transport problems,
//! authentication (401), field-level validation, server faults, plus the
//! local failure modes (storage, decoding, cancellation).

use std::collections::BTreeMap;

use reqwest::StatusCode;
use thiserror::Error;

/// Field name to list of messages, as returned by the backend on 400.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Errors produced by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend rejected the credentials or token (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The authenticated user lacks permission (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused the payload (HTTP 400/422).
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: FieldErrors,
    },

    /// A form failed local validation before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The backend failed (HTTP 5xx).
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// An operation that needs a session was called without one.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The owning scope was cancelled before the request finished.
    #[error("Request cancelled")]
    Cancelled,

    /// Response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Persistent session storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Build an error from a non-success status and its raw body.
    ///
    /// DRF answers either `{"detail": "..."}` or a map of field errors; both
    /// shapes are understood, anything else is kept as text.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(detail_message)
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("no response body")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let fields = parsed.as_ref().map(field_errors).unwrap_or_default();
                ClientError::Validation { message, fields }
            }
            s if s.is_server_error() => ClientError::Server {
                status: s.as_u16(),
                message,
            },
            s => ClientError::Status {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// True for the failures that mean the stored session is no longer valid.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_) | ClientError::NotAuthenticated)
    }

    /// Human-readable text suitable for a one-shot notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Unauthorized(_) | ClientError::NotAuthenticated => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ClientError::Forbidden(_) => "You do not have access to this action.".to_string(),
            ClientError::NotFound(_) => "The requested item was not found.".to_string(),
            ClientError::Validation { message, fields } => {
                if fields.is_empty() {
                    message.clone()
                } else {
                    fields
                        .iter()
                        .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
                        .collect::<Vec<_>>()
                        .join("; ")
                }
            }
            ClientError::InvalidInput(msg) => msg.clone(),
            ClientError::Server { .. } => {
                "The server failed to process the request. Try again later.".to_string()
            }
            ClientError::Status { status, message } => format!("{} ({})", message, status),
            ClientError::Cancelled => "The request was cancelled.".to_string(),
            ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ClientError::Storage(msg) => format!("Could not access local session storage: {}", msg),
            ClientError::Config(msg) => msg.clone(),
        }
    }
}

fn detail_message(value: &serde_json::Value) -> Option<String> {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
        .or_else(|| {
            value
                .get("non_field_errors")
                .and_then(|v| v.as_array())
                .and_then(|items| items.first())
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            value
                .as_object()
                .filter(|map| !map.is_empty())
                .map(|_| "Please correct the highlighted fields.".to_string())
        })
}

fn field_errors(value: &serde_json::Value) -> FieldErrors {
    let Some(map) = value.as_object() else {
        return FieldErrors::new();
    };

    map.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "detail" | "message" | "error" | "code"))
        .filter_map(|(key, val)| {
            let messages: Vec<String> = match val {
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                serde_json::Value::String(s) => vec![s.clone()],
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| (key.clone(), messages))
        })
        .collect()
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ClientError::from_status(status, "")
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<serde_yaml::Error> for ClientError {
    fn from(e: serde_yaml::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        ClientError::InvalidInput(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_uses_detail() {
        let err = ClientError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Given token not valid for any token type"}"#,
        );
        assert!(matches!(err, ClientError::Unauthorized(ref m) if m.contains("token not valid")));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn test_validation_collects_field_errors() {
        let err = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"email": ["Enter a valid email address."], "username": "taken"}"#,
        );
        match err {
            ClientError::Validation { fields, .. } => {
                assert_eq!(fields["email"], vec!["Enter a valid email address."]);
                assert_eq!(fields["username"], vec!["taken"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validation_user_message_lists_fields() {
        let err = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"name": ["This field is required."]}"#,
        );
        assert_eq!(err.user_message(), "name: This field is required.");
    }

    #[test]
    fn test_server_error_from_plain_body() {
        let err = ClientError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ClientError::Server { status: 502, ref message } if message == "upstream down"));
    }

    #[test]
    fn test_empty_body_falls_back_to_reason() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Not found: Not Found");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ClientError = io_err.into();
        assert!(matches!(err, ClientError::Storage(_)));
    }
}
