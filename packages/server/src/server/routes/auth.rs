//! REST handlers for the auth endpoints.
//!
//! Handlers stay thin: extract, delegate to `AuthService`, let
//! `AuthError` pick the wire status.

use axum::{extract::Extension, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::common::AuthError;
use crate::domains::auth::session::{
    AuthSession, RefreshRequest, RefreshResponse, RegisterRequest, SendOtpRequest,
    SendOtpResponse, UserCheck, VerifyOtpRequest,
};
use crate::domains::user::UserProfile;
use crate::server::app::AppState;

pub async fn send_otp_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, AuthError> {
    Ok(Json(state.auth.send_otp(&request.phone).await?))
}

/// Sign-up verification: creates the identity for new phones.
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    Ok(Json(state.auth.verify_and_login(request, false).await?))
}

/// Login: requires a pre-existing identity.
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    Ok(Json(state.auth.verify_and_login(request, true).await?))
}

pub async fn refresh_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AuthError> {
    if request.refresh_token.is_empty() {
        return Err(AuthError::Unauthorized("Refresh token required".to_string()));
    }
    Ok(Json(state.auth.refresh(&request.refresh_token).await?))
}

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthSession>, AuthError> {
    Ok(Json(state.auth.register(request).await?))
}

pub async fn check_user_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<UserCheck>, AuthError> {
    Ok(Json(state.auth.check_user(&request.phone).await?))
}

/// Stateless logout: tokens stay valid until expiry (no revocation list).
pub async fn logout_handler() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}

pub async fn profile_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, AuthError> {
    let token = bearer_token(&headers).ok_or_else(|| {
        AuthError::Unauthorized("Authorization token required".to_string())
    })?;
    let claims = state
        .auth
        .tokens()
        .verify_access_token(token)
        .map_err(|_| AuthError::Unauthorized("Invalid token".to_string()))?;
    Ok(Json(state.auth.profile(claims.user_id).await?))
}

/// Pull the token out of the Authorization header, with or without the
/// "Bearer " prefix.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_handles_prefix_and_raw() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        let mut raw = HeaderMap::new();
        raw.insert("authorization", "abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&raw), Some("abc.def.ghi"));

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
