//! Response mapping for gateway and upstream failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use dashgate_identity::IdentityError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map an identity-service failure onto the caller's response.
///
/// Credential and validation errors keep their structure and the original
/// upstream status; unreachable upstreams become a 502-class answer.
pub fn identity_error_response(err: IdentityError) -> Response {
    match err {
        IdentityError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "Invalid credentials")
        }
        IdentityError::Validation {
            status,
            message,
            errors,
        } => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST);
            (
                status,
                Json(serde_json::json!({
                    "success": false,
                    "message": message,
                    "errors": errors,
                })),
            )
                .into_response()
        }
        IdentityError::Upstream { status, message } => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            json_error(status, "upstream_error", message)
        }
        IdentityError::Unavailable(err) => {
            tracing::error!(error = %err, "identity service unreachable");
            json_error(
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                "identity service unavailable",
            )
        }
    }
}
