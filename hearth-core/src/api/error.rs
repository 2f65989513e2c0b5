use serde_json::Value;
use thiserror::Error;

/// How a caller should react to a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The session is gone; sign in again.
    Unauthorized,
    /// A connected service needs its OAuth grant renewed.
    Reconnect,
    Other,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("{message} (status {status})")]
    Status {
        status: u16,
        message: String,
        data: Value,
    },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True when the message asks the user to reconnect a service or reports
    /// an expired token.
    pub fn needs_reconnect(&self) -> bool {
        let message = self.to_string().to_lowercase();
        message.contains("reconnect") || message.contains("token expired")
    }

    pub fn class(&self) -> ErrorClass {
        if self.is_unauthorized() {
            ErrorClass::Unauthorized
        } else if self.needs_reconnect() {
            ErrorClass::Reconnect
        } else {
            ErrorClass::Other
        }
    }
}

/// Human-readable message for an error response body.
///
/// Looks at `detail`, `error` and `message` in that order, then at the first
/// field error of a validation payload, and finally falls back to the status
/// line.
pub fn error_message(status: u16, reason: Option<&str>, data: &Value) -> String {
    for key in ["detail", "error", "message"] {
        if let Some(text) = data.get(key).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    if let Some(fields) = data.as_object() {
        let first = fields.iter().find_map(|(field, value)| {
            let text = match value {
                Value::String(text) => Some(text.as_str()),
                Value::Array(items) => items.first().and_then(Value::as_str),
                _ => None,
            }?;
            Some(format!("{field}: {text}"))
        });
        if let Some(first) = first {
            return first;
        }
    }
    if let Some(text) = data.as_str().filter(|text| !text.trim().is_empty()) {
        return text.trim().to_string();
    }
    match reason {
        Some(reason) => format!("HTTP {status} {reason}"),
        None => format!("HTTP {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(status: u16, message: &str) -> ApiError {
        ApiError::Status {
            status,
            message: message.to_string(),
            data: Value::Null,
        }
    }

    #[test]
    fn unauthorized_wins_over_message() {
        let err = status_error(401, "Token expired");
        assert!(err.is_unauthorized());
        assert!(err.needs_reconnect());
        assert_eq!(err.class(), ErrorClass::Unauthorized);
    }

    #[test]
    fn reconnect_matches_case_insensitively() {
        assert_eq!(
            status_error(400, "Please RECONNECT your OneDrive account").class(),
            ErrorClass::Reconnect
        );
        assert_eq!(
            status_error(400, "Access token expired for outlook").class(),
            ErrorClass::Reconnect
        );
        assert_eq!(status_error(500, "server exploded").class(), ErrorClass::Other);
    }

    #[test]
    fn message_prefers_detail_then_field_errors() {
        assert_eq!(
            error_message(403, Some("Forbidden"), &json!({"detail": "Not a member"})),
            "Not a member"
        );
        assert_eq!(
            error_message(400, Some("Bad Request"), &json!({"email": ["Enter a valid email."]})),
            "email: Enter a valid email."
        );
        assert_eq!(
            error_message(502, Some("Bad Gateway"), &Value::Null),
            "HTTP 502 Bad Gateway"
        );
    }
}
