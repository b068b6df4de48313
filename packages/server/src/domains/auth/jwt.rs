use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub phone: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims carried by a refresh token. Deliberately thin: only the user
/// id, so a refresh token alone cannot stand in for an access claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Mints and verifies the token pair.
///
/// Access and refresh tokens are signed with distinct secrets, so a
/// compromised refresh token cannot forge access claims directly.
/// Tokens are stateless: verification is signature + expiry only.
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Access token: {user_id, phone}, valid 24 hours.
    pub fn create_access_token(&self, user_id: Uuid, phone: &str) -> Result<String> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id,
            phone: phone.to_string(),
            exp: (now + Duration::hours(ACCESS_TOKEN_TTL_HOURS)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.access_encoding).map_err(Into::into)
    }

    /// Refresh token: {user_id}, valid 7 days.
    pub fn create_refresh_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = RefreshClaims {
            user_id,
            exp: (now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.refresh_encoding).map_err(Into::into)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(Into::into)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
