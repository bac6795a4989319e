use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field-level validation failure reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: Option<String>,
}

/// Failures talking to the identity service.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The upstream rejected the presented credentials (401/403).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Signup was rejected with enumerated field-level errors.
    #[error("validation failed: {message}")]
    Validation {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },

    /// The upstream answered with an unexpected status.
    #[error("upstream returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The upstream could not be reached (connect, timeout, protocol).
    #[error("identity service unavailable")]
    Unavailable(#[from] reqwest::Error),
}

impl IdentityError {
    /// The HTTP status to relay to the caller, where one exists.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            IdentityError::InvalidCredentials => Some(401),
            IdentityError::Validation { status, .. } => Some(*status),
            IdentityError::Upstream { status, .. } => Some(*status),
            IdentityError::Unavailable(_) => None,
        }
    }
}

/// Error payload shape used by the identity service (RFC 7807-ish).
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UpstreamErrorBody {
    pub detail: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl UpstreamErrorBody {
    pub fn message_or(&self, fallback: &str) -> String {
        self.detail
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_problem_detail_with_field_errors() {
        let body: UpstreamErrorBody = serde_json::from_str(
            r#"{
                "detail": "Signup failed",
                "status": 400,
                "errors": [
                    {"field": "username", "message": "already taken", "code": "duplicate"},
                    {"field": "password", "message": "too short", "code": null}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(body.message_or("fallback"), "Signup failed");
        assert_eq!(body.errors.len(), 2);
        assert_eq!(body.errors[0].field, "username");
        assert_eq!(body.errors[0].code.as_deref(), Some("duplicate"));
        assert_eq!(body.errors[1].code, None);
    }

    #[test]
    fn message_falls_back_when_body_is_empty() {
        let body = UpstreamErrorBody::default();
        assert_eq!(body.message_or("authentication failed"), "authentication failed");
    }

    #[test]
    fn upstream_status_is_exposed_for_relay() {
        assert_eq!(IdentityError::InvalidCredentials.upstream_status(), Some(401));
        let validation = IdentityError::Validation {
            status: 400,
            message: "bad".to_string(),
            errors: Vec::new(),
        };
        assert_eq!(validation.upstream_status(), Some(400));
    }
}
