//! Error taxonomy for the client. Auth flows need to distinguish bad
//! credentials, expired sessions, and field-level validation failures so the
//! calling form can render the right message; everything else is transport
//! noise surfaced with a sanitized body.

use std::fmt;
use thiserror::Error;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum Error {
    /// Login rejected by the server. Never retried.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The bearer token is missing, invalid, or could not be refreshed.
    #[error("unauthorized")]
    Unauthorized,
    /// The server rejected the input; carries field-level messages.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("configuration error: {0}")]
    Config(String),
    /// Non-success HTTP status outside the auth taxonomy.
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Parse(String),
    #[error("unable to reach the server: {0}")]
    Network(#[from] reqwest::Error),
}

/// Field-level validation messages, for inline display next to form inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Offending field name, when the server identified one.
    pub field: Option<String>,
    pub message: String,
}

impl ValidationErrors {
    /// Single message not tied to a specific field.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: None,
                message: message.into(),
            }],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.fields {
            if !first {
                write!(formatter, "; ")?;
            }
            first = false;
            match &error.field {
                Some(field) => write!(formatter, "{field}: {}", error.message)?,
                None => write!(formatter, "{}", error.message)?,
            }
        }
        if first {
            write!(formatter, "invalid input")?;
        }
        Ok(())
    }
}

/// Maps a non-success response to an [`Error`].
///
/// The backend reports errors as `{"detail": "..."}` or, for validation
/// failures, `{"detail": [{"loc": [...], "msg": "..."}]}`.
pub(crate) fn error_from_response(status: u16, body: &str) -> Error {
    match status {
        401 => Error::Unauthorized,
        422 => match parse_validation_detail(body) {
            Some(errors) => Error::Validation(errors),
            None => Error::Http {
                status,
                message: detail_message(body),
            },
        },
        _ => Error::Http {
            status,
            message: detail_message(body),
        },
    }
}

/// Extracts the `detail` string from an error body, falling back to the
/// sanitized raw body.
fn detail_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| sanitize_body(body))
}

/// Parses a validation `detail` array into per-field messages.
fn parse_validation_detail(body: &str) -> Option<ValidationErrors> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;

    if let Some(message) = detail.as_str() {
        return Some(ValidationErrors::message(message));
    }

    let entries = detail.as_array()?;
    let fields = entries
        .iter()
        .filter_map(|entry| {
            let message = entry.get("msg")?.as_str()?.to_string();
            // loc is ["body", "<field>", ...]; the last segment names the field.
            let field = entry
                .get("loc")
                .and_then(serde_json::Value::as_array)
                .and_then(|loc| loc.last())
                .and_then(serde_json::Value::as_str)
                .filter(|segment| *segment != "body")
                .map(str::to_string);
            Some(FieldError { field, message })
        })
        .collect::<Vec<_>>();

    if fields.is_empty() {
        None
    } else {
        Some(ValidationErrors { fields })
    }
}

/// Trims and truncates raw error bodies before they reach callers.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_401_to_unauthorized() {
        let err = error_from_response(401, r#"{"detail":"Could not validate credentials"}"#);
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn parses_validation_detail_array() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error.email"},
            {"loc":["body","password"],"msg":"Password must be at least 8 characters","type":"value_error"}
        ]}"#;
        let Error::Validation(errors) = error_from_response(422, body) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.fields.len(), 2);
        assert_eq!(errors.fields[0].field.as_deref(), Some("email"));
        assert_eq!(
            errors.fields[1].message,
            "Password must be at least 8 characters"
        );
    }

    #[test]
    fn surfaces_string_detail_on_plain_errors() {
        let err = error_from_response(400, r#"{"detail":"Email already registered"}"#);
        match err {
            Error::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Email already registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sanitizes_non_json_bodies() {
        let long_body = "x".repeat(500);
        let err = error_from_response(500, &long_body);
        match err {
            Error::Http { message, .. } => assert_eq!(message.len(), 200),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_body_gets_placeholder() {
        let err = error_from_response(502, "   ");
        match err {
            Error::Http { message, .. } => assert_eq!(message, "Request failed."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validation_errors_display_joins_fields() {
        let errors = ValidationErrors {
            fields: vec![
                FieldError {
                    field: Some("name".to_string()),
                    message: "too short".to_string(),
                },
                FieldError {
                    field: None,
                    message: "bad input".to_string(),
                },
            ],
        };
        assert_eq!(errors.to_string(), "name: too short; bad input");
    }
}
