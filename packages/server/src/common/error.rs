//! Domain error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures the auth core surfaces to the HTTP boundary.
///
/// Delivery-channel failures never appear here: the dispatcher absorbs
/// them and only reports which channel ultimately carried the message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input: bad phone format, missing required field, bad PIN format.
    #[error("{0}")]
    Validation(String),

    /// The referenced account genuinely does not exist (login path).
    /// Distinct from auth failure so clients can prompt "sign up instead".
    #[error("{0}")]
    NotFound(String),

    /// Rejected OTP or PIN. The message stays generic toward the client;
    /// the precise cause is only logged.
    #[error("{0}")]
    AuthFailed(String),

    /// Missing or invalid access token.
    #[error("{0}")]
    Unauthorized(String),

    /// Rejected refresh token, including tokens whose identity was deleted.
    #[error("{0}")]
    RefreshRejected(String),

    /// Infrastructure failure: database unreachable, signing failure.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::AuthFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::RefreshRejected(_) => StatusCode::FORBIDDEN,
            AuthError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::Upstream(err) => {
                tracing::error!(error = %err, "request failed with upstream error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AuthError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::NotFound("missing".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::AuthFailed("wrong".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::RefreshRejected("stale".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::Upstream(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_detail_is_not_leaked() {
        let response = AuthError::Upstream(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
