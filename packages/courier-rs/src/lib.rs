//! HTTP clients for the OTP delivery providers.
//!
//! Each client wraps one provider API (Twilio Messages, Green API
//! WhatsApp, Fast2SMS) behind a small typed surface. Clients hold their
//! own `reqwest::Client` and credentials; callers decide ordering and
//! fallback between providers.

use std::collections::HashMap;

use reqwest::Client;
use thiserror::Error;

pub mod models;

use crate::models::{Fast2SmsResponse, GreenApiSendResponse, TwilioMessageResponse};

/// Failure modes shared by all providers.
///
/// `QuotaExceeded` is split out because callers treat an exhausted plan
/// differently from a transient failure when logging.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("provider message quota exhausted")]
    QuotaExceeded,

    #[error("{provider} rejected the message: {detail}")]
    Provider {
        provider: &'static str,
        detail: String,
    },

    #[error("request to {provider} failed")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

// =============================================================================
// Twilio (SMS and WhatsApp via the Messages API)
// =============================================================================

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
}

#[derive(Debug, Clone)]
pub struct TwilioClient {
    options: TwilioOptions,
    http: Client,
}

impl TwilioClient {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    /// Send a message through the Twilio Messages API.
    ///
    /// `from`/`to` may carry the `whatsapp:` prefix for WhatsApp traffic.
    pub async fn send_message(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<TwilioMessageResponse, CourierError> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.options.account_sid
        );

        let mut form: HashMap<&str, &str> = HashMap::new();
        form.insert("From", from);
        form.insert("To", to);
        form.insert("Body", body);

        let response = self
            .http
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|source| CourierError::Http {
                provider: "twilio",
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CourierError::Provider {
                provider: "twilio",
                detail: format!("{status}: {detail}"),
            });
        }

        response
            .json::<TwilioMessageResponse>()
            .await
            .map_err(|source| CourierError::Http {
                provider: "twilio",
                source,
            })
    }

    pub async fn send_sms(&self, from: &str, to: &str, body: &str) -> Result<(), CourierError> {
        self.send_message(from, to, body).await.map(|_| ())
    }

    pub async fn send_whatsapp(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<(), CourierError> {
        self.send_message(&format!("whatsapp:{from}"), &format!("whatsapp:{to}"), body)
            .await
            .map(|_| ())
    }
}

// =============================================================================
// Green API (WhatsApp Business)
// =============================================================================

#[derive(Debug, Clone)]
pub struct GreenApiOptions {
    pub instance_id: String,
    pub api_token: String,
}

#[derive(Debug, Clone)]
pub struct GreenApiClient {
    options: GreenApiOptions,
    http: Client,
}

impl GreenApiClient {
    pub fn new(options: GreenApiOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    pub async fn send_message(&self, phone: &str, message: &str) -> Result<(), CourierError> {
        let url = format!(
            "https://7105.api.greenapi.com/waInstance{}/sendMessage/{}",
            self.options.instance_id, self.options.api_token
        );
        let payload = serde_json::json!({
            "chatId": whatsapp_chat_id(phone),
            "message": message,
        });

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| CourierError::Http {
                provider: "green-api",
                source,
            })?;

        let status = response.status();
        // Green API signals an exhausted message quota with status 466.
        if status.as_u16() == 466 {
            return Err(CourierError::QuotaExceeded);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CourierError::Provider {
                provider: "green-api",
                detail: format!("{status}: {detail}"),
            });
        }

        let body = response
            .json::<GreenApiSendResponse>()
            .await
            .map_err(|source| CourierError::Http {
                provider: "green-api",
                source,
            })?;

        if body.id_message.is_none() {
            return Err(CourierError::Provider {
                provider: "green-api",
                detail: "no message id in response".to_string(),
            });
        }
        Ok(())
    }
}

/// Green API addresses chats as `<digits>@c.us`.
fn whatsapp_chat_id(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{digits}@c.us")
}

// =============================================================================
// Fast2SMS (regional Indian SMS, OTP route)
// =============================================================================

#[derive(Debug, Clone)]
pub struct Fast2SmsClient {
    api_key: String,
    http: Client,
}

impl Fast2SmsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
        }
    }

    /// Deliver an OTP code over the Fast2SMS OTP route.
    ///
    /// Fast2SMS expects a bare 10-digit local number, so the country code
    /// is stripped before the call.
    pub async fn send_otp(&self, phone: &str, code: &str) -> Result<(), CourierError> {
        let number = local_indian_number(phone);

        let response = self
            .http
            .get("https://www.fast2sms.com/dev/bulkV2")
            .query(&[
                ("authorization", self.api_key.as_str()),
                ("variables_values", code),
                ("route", "otp"),
                ("numbers", &number),
            ])
            .send()
            .await
            .map_err(|source| CourierError::Http {
                provider: "fast2sms",
                source,
            })?;

        let body = response
            .json::<Fast2SmsResponse>()
            .await
            .map_err(|source| CourierError::Http {
                provider: "fast2sms",
                source,
            })?;

        if !body.accepted {
            return Err(CourierError::Provider {
                provider: "fast2sms",
                detail: body
                    .message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "request not accepted".to_string()),
            });
        }
        Ok(())
    }
}

fn local_indian_number(phone: &str) -> String {
    phone
        .strip_prefix("+91")
        .or_else(|| phone.strip_prefix('+'))
        .unwrap_or(phone)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_strips_plus_and_separators() {
        assert_eq!(whatsapp_chat_id("+91 99999-99999"), "919999999999@c.us");
        assert_eq!(whatsapp_chat_id("+12025550123"), "12025550123@c.us");
    }

    #[test]
    fn local_number_drops_country_code() {
        assert_eq!(local_indian_number("+919999999999"), "9999999999");
        assert_eq!(local_indian_number("+15555551234"), "15555551234");
        assert_eq!(local_indian_number("9999999999"), "9999999999");
    }

    #[test]
    fn quota_error_is_distinguishable() {
        let err = CourierError::QuotaExceeded;
        assert!(matches!(err, CourierError::QuotaExceeded));
        assert!(err.to_string().contains("quota"));
    }
}
