//! Session issuance: the service tying OTP verification to identity
//! resolution and token minting.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::common::AuthError;
use crate::domains::user::{KycUpsert, NewUser, User, UserDirectory, UserProfile};

use super::dispatch::Dispatcher;
use super::generator::generate_otp;
use super::jwt::TokenService;
use super::phone::canonicalize_phone;
use super::pin;
use super::store::OtpStore;
use super::verify::{verify_otp, VerifyOutcome};

/// OTP validity window in seconds.
pub const OTP_TTL_SECS: i64 = 300;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub message: String,
    pub delivery_method: String,
    pub is_console_fallback: bool,
}

/// Body shared by the sign-up verification and login endpoints; the
/// profile fields only matter on the sign-up path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: String,
    pub pin: Option<String>,
    pub name: Option<String>,
    pub name_hindi: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub phone: String,
    pub full_name: String,
    pub email: String,
    pub pin: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Successful verification/login/registration response.
///
/// `token` duplicates `access_token` for older clients that predate the
/// refresh flow.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCheck {
    pub exists: bool,
    pub has_pin: bool,
    pub user_type: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

/// The auth core behind every endpoint. Constructed once at startup and
/// injected into handlers; the store, dispatcher and directory seams take
/// test doubles.
pub struct AuthService {
    store: Arc<dyn OtpStore>,
    dispatcher: Dispatcher,
    directory: Arc<dyn UserDirectory>,
    tokens: TokenService,
    development_mode: bool,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn OtpStore>,
        dispatcher: Dispatcher,
        directory: Arc<dyn UserDirectory>,
        tokens: TokenService,
        development_mode: bool,
    ) -> Self {
        Self {
            store,
            dispatcher,
            directory,
            tokens,
            development_mode,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Issue a fresh OTP and push it through the delivery chain.
    ///
    /// Overwrites any previous record for the phone, so re-requesting an
    /// OTP invalidates the old code.
    pub async fn send_otp(&self, raw_phone: &str) -> Result<SendOtpResponse, AuthError> {
        let phone = canonicalize_phone(raw_phone)?;
        let code = generate_otp();

        self.store
            .put(&phone, &code, Duration::seconds(OTP_TTL_SECS))
            .await;
        // Opportunistic cleanup; expiry is also enforced lazily on verify.
        self.store.sweep_expired().await;

        if self.development_mode {
            debug!(phone, code, "issued OTP");
        }

        let message = format!(
            "Your Samriddhi OTP is: {code}. Valid for 5 minutes. Do not share with anyone."
        );
        let outcome = self.dispatcher.send(&phone, &message, &code).await;

        if outcome.is_console_fallback() {
            warn!(phone, "all delivery channels unavailable, OTP surfaced on console only");
            Ok(SendOtpResponse {
                message: "OTP generated but delivery services are temporarily unavailable. \
                          In production, configure backup SMS service."
                    .to_string(),
                delivery_method: outcome.method.label().to_string(),
                is_console_fallback: true,
            })
        } else {
            Ok(SendOtpResponse {
                message: format!("OTP sent successfully via {}", outcome.method.label()),
                delivery_method: outcome.method.label().to_string(),
                is_console_fallback: false,
            })
        }
    }

    /// Verify an OTP and establish a session.
    ///
    /// Login requires a pre-existing identity and, when a PIN is on file,
    /// a matching PIN. Sign-up verification creates the identity on first
    /// contact (display name required) and is idempotent for known phones.
    pub async fn verify_and_login(
        &self,
        request: VerifyOtpRequest,
        is_login: bool,
    ) -> Result<AuthSession, AuthError> {
        if request.otp.trim().is_empty() {
            return Err(AuthError::Validation(
                "Phone and OTP are required".to_string(),
            ));
        }
        let phone = canonicalize_phone(&request.phone)?;

        match verify_otp(self.store.as_ref(), &phone, request.otp.trim()).await {
            VerifyOutcome::Verified => {}
            VerifyOutcome::Failed(cause) => {
                debug!(phone, ?cause, "OTP verification failed");
                return Err(AuthError::AuthFailed(cause.user_message().to_string()));
            }
        }

        let existing = self.directory.find_by_phone(&phone).await?;

        let user = if is_login {
            let user = existing.ok_or_else(|| {
                AuthError::NotFound("Account not found. Please sign up first.".to_string())
            })?;
            self.check_pin(&user, request.pin.as_deref())?;
            user
        } else {
            match existing {
                Some(user) => user,
                None => {
                    let name = request
                        .name
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .ok_or_else(|| {
                            AuthError::Validation("Name is required for new users".to_string())
                        })?;
                    let user = self
                        .directory
                        .create(NewUser {
                            phone: phone.clone(),
                            name: name.to_string(),
                            name_hindi: request.name_hindi.clone(),
                            user_type: request.user_type.clone(),
                        })
                        .await?;
                    info!(user_id = %user.id, "created identity on first verification");
                    user
                }
            }
        };

        let message = if is_login {
            "Login successful"
        } else {
            "Verification successful"
        };
        self.issue_session(&user, message)
    }

    /// PIN gate for the login path: a PIN on file must be matched; an
    /// account without one stays OTP-only.
    fn check_pin(&self, user: &User, supplied: Option<&str>) -> Result<(), AuthError> {
        match (&user.pin_hash, supplied) {
            (Some(hash), Some(supplied_pin)) => {
                if pin::verify_pin(supplied_pin, hash)? {
                    Ok(())
                } else {
                    Err(AuthError::AuthFailed("Invalid PIN".to_string()))
                }
            }
            (Some(_), None) => Err(AuthError::AuthFailed("PIN is required".to_string())),
            (None, _) => Ok(()),
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is neither rotated nor invalidated; it
    /// stays valid until its own expiry. A token whose identity no longer
    /// exists is treated as an invalidated credential.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AuthError> {
        let claims = self
            .tokens
            .verify_refresh_token(refresh_token)
            .map_err(|e| {
                debug!(error = %e, "refresh token rejected");
                AuthError::RefreshRejected("Invalid or expired refresh token".to_string())
            })?;

        let user = self
            .directory
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| AuthError::RefreshRejected("Invalid refresh token".to_string()))?;

        let access_token = self.tokens.create_access_token(user.id, &user.phone)?;
        Ok(RefreshResponse { access_token })
    }

    /// KYC-completion upsert: updates or creates the identity, hashes the
    /// PIN when supplied, and returns a fresh token pair.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, AuthError> {
        if request.full_name.trim().is_empty() || request.email.trim().is_empty() {
            return Err(AuthError::Validation(
                "Phone, name and email are required".to_string(),
            ));
        }
        let phone = canonicalize_phone(&request.phone)?;

        let pin_hash = match request.pin.as_deref() {
            Some(supplied_pin) => Some(pin::hash_pin(supplied_pin)?),
            None => None,
        };

        let user = self
            .directory
            .complete_kyc(KycUpsert {
                phone,
                full_name: request.full_name.trim().to_string(),
                email: request.email.trim().to_string(),
                pin_hash,
                user_type: request.user_type.clone(),
            })
            .await?;

        info!(user_id = %user.id, "registration completed");
        self.issue_session(&user, "Registration successful")
    }

    /// Used by clients to decide whether to prompt for a PIN before OTP
    /// verification.
    pub async fn check_user(&self, raw_phone: &str) -> Result<UserCheck, AuthError> {
        let phone = canonicalize_phone(raw_phone)?;
        let user = self.directory.find_by_phone(&phone).await?;
        Ok(UserCheck {
            exists: user.is_some(),
            has_pin: user.as_ref().map(User::has_pin).unwrap_or(false),
            user_type: user.map(|u| u.user_type),
        })
    }

    /// Resolve the identity behind a verified access token, minus
    /// sensitive fields.
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        let user = self
            .directory
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;
        Ok(UserProfile::from(&user))
    }

    fn issue_session(&self, user: &User, message: &str) -> Result<AuthSession, AuthError> {
        let access_token = self.tokens.create_access_token(user.id, &user.phone)?;
        let refresh_token = self.tokens.create_refresh_token(user.id)?;
        Ok(AuthSession {
            message: message.to_string(),
            user: UserProfile::from(user),
            token: access_token.clone(),
            access_token,
            refresh_token,
            user_type: user.user_type.clone(),
        })
    }
}
