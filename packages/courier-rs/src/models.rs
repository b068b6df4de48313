//! Wire models for the delivery provider APIs.

use serde::Deserialize;

/// Twilio Messages API response (the fields we care about).
#[derive(Debug, Deserialize)]
pub struct TwilioMessageResponse {
    pub sid: String,
    pub status: String,
}

/// Green API sendMessage response.
#[derive(Debug, Deserialize)]
pub struct GreenApiSendResponse {
    #[serde(rename = "idMessage")]
    pub id_message: Option<String>,
}

/// Fast2SMS bulkV2 response. `return` is their accepted flag.
#[derive(Debug, Deserialize)]
pub struct Fast2SmsResponse {
    #[serde(rename = "return")]
    pub accepted: bool,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}
