//! Concrete delivery channels over the courier provider clients.

use std::sync::Arc;

use async_trait::async_trait;
use courier::{
    CourierError, Fast2SmsClient, GreenApiClient, GreenApiOptions, TwilioClient, TwilioOptions,
};
use tracing::info;

use super::dispatch::{DeliveryChannel, DeliveryMethod};
use crate::config::Config;

pub struct GreenApiChannel {
    client: GreenApiClient,
}

#[async_trait]
impl DeliveryChannel for GreenApiChannel {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::GreenApiWhatsApp
    }

    async fn attempt(&self, phone: &str, message: &str, _code: &str) -> Result<(), CourierError> {
        self.client.send_message(phone, message).await
    }
}

pub struct TwilioSmsChannel {
    client: TwilioClient,
    from: String,
}

#[async_trait]
impl DeliveryChannel for TwilioSmsChannel {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::TwilioSms
    }

    async fn attempt(&self, phone: &str, message: &str, _code: &str) -> Result<(), CourierError> {
        self.client.send_sms(&self.from, phone, message).await
    }
}

pub struct TwilioWhatsAppChannel {
    client: TwilioClient,
    from: String,
}

#[async_trait]
impl DeliveryChannel for TwilioWhatsAppChannel {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::TwilioWhatsApp
    }

    async fn attempt(&self, phone: &str, message: &str, _code: &str) -> Result<(), CourierError> {
        self.client.send_whatsapp(&self.from, phone, message).await
    }
}

pub struct Fast2SmsChannel {
    client: Fast2SmsClient,
}

#[async_trait]
impl DeliveryChannel for Fast2SmsChannel {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Fast2Sms
    }

    async fn attempt(&self, phone: &str, _message: &str, code: &str) -> Result<(), CourierError> {
        self.client.send_otp(phone, code).await
    }
}

/// Guaranteed-success terminator: "delivers" by logging the code.
///
/// Keeps the send-OTP request from ever hard-failing; operators see the
/// degraded state through the console-fallback flag on the outcome.
pub struct ConsoleChannel;

#[async_trait]
impl DeliveryChannel for ConsoleChannel {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::ConsoleFallback
    }

    async fn attempt(&self, phone: &str, _message: &str, code: &str) -> Result<(), CourierError> {
        info!(phone, code, "OTP console delivery");
        Ok(())
    }
}

/// Build the delivery chain from configuration, in priority order.
///
/// A channel whose credentials are absent is skipped entirely - a
/// configuration decision, not a runtime failure. The console channel
/// always terminates the chain.
pub fn channels_from_config(config: &Config) -> Vec<Arc<dyn DeliveryChannel>> {
    let mut channels: Vec<Arc<dyn DeliveryChannel>> = Vec::new();

    if let (Some(instance_id), Some(api_token)) = (&config.green_api_id, &config.green_api_token) {
        channels.push(Arc::new(GreenApiChannel {
            client: GreenApiClient::new(GreenApiOptions {
                instance_id: instance_id.clone(),
                api_token: api_token.clone(),
            }),
        }));
    }

    let twilio = match (&config.twilio_account_sid, &config.twilio_auth_token) {
        (Some(account_sid), Some(auth_token)) => Some(TwilioClient::new(TwilioOptions {
            account_sid: account_sid.clone(),
            auth_token: auth_token.clone(),
        })),
        _ => None,
    };

    if let (Some(client), Some(from)) = (&twilio, &config.twilio_phone_number) {
        channels.push(Arc::new(TwilioSmsChannel {
            client: client.clone(),
            from: from.clone(),
        }));
    }

    if let (Some(client), Some(from)) = (&twilio, &config.twilio_whatsapp_number) {
        channels.push(Arc::new(TwilioWhatsAppChannel {
            client: client.clone(),
            from: from.clone(),
        }));
    }

    if let Some(api_key) = &config.fast2sms_api_key {
        channels.push(Arc::new(Fast2SmsChannel {
            client: Fast2SmsClient::new(api_key.clone()),
        }));
    }

    channels.push(Arc::new(ConsoleChannel));
    channels
}
