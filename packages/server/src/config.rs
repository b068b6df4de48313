use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables.
///
/// Signing secrets are required and their absence is fatal at startup.
/// Delivery-channel credentials are optional: a channel whose credentials
/// are missing is silently left out of the dispatch chain.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,
    pub twilio_whatsapp_number: Option<String>,
    pub green_api_id: Option<String>,
    pub green_api_token: Option<String>,
    pub fast2sms_api_key: Option<String>,
    /// Upper bound on a single channel delivery attempt, in seconds.
    pub delivery_timeout_secs: u64,
    /// Development mode makes issued OTP codes visible in the logs.
    pub development_mode: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET")
                .context("JWT_REFRESH_SECRET must be set")?,
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").ok(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").ok(),
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER").ok(),
            twilio_whatsapp_number: env::var("TWILIO_WHATSAPP_NUMBER").ok(),
            green_api_id: env::var("GREEN_API_ID").ok(),
            green_api_token: env::var("GREEN_API_TOKEN").ok(),
            fast2sms_api_key: env::var("FAST2SMS_API_KEY").ok(),
            delivery_timeout_secs: env::var("DELIVERY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DELIVERY_TIMEOUT_SECS must be a valid number")?,
            development_mode: env::var("APP_ENV")
                .map(|v| v == "development")
                .unwrap_or(false),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
