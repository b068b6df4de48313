//! Multi-channel OTP delivery with ordered fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use courier::CourierError;
use tokio::time::timeout;
use tracing::{info, warn};

/// Identifies which transport carried (or would have carried) the OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    GreenApiWhatsApp,
    TwilioSms,
    TwilioWhatsApp,
    Fast2Sms,
    ConsoleFallback,
}

impl DeliveryMethod {
    pub fn label(self) -> &'static str {
        match self {
            DeliveryMethod::GreenApiWhatsApp => "WhatsApp (Green API)",
            DeliveryMethod::TwilioSms => "SMS (Twilio)",
            DeliveryMethod::TwilioWhatsApp => "WhatsApp (Twilio)",
            DeliveryMethod::Fast2Sms => "SMS (Fast2SMS)",
            DeliveryMethod::ConsoleFallback => "Console (Development Mode)",
        }
    }
}

/// One OTP transport.
///
/// Channels are only constructed when their credentials are present, so
/// `attempt` never has to re-check configuration. Any error is absorbed
/// by the dispatcher and downgraded to "try the next channel".
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn method(&self) -> DeliveryMethod;
    async fn attempt(&self, phone: &str, message: &str, code: &str) -> Result<(), CourierError>;
}

/// Which channel ultimately delivered. Transient, used only for response
/// messaging and logs.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryOutcome {
    pub method: DeliveryMethod,
}

impl DeliveryOutcome {
    /// True when every real channel failed or none was configured.
    /// Signals degraded service to operators without failing the request.
    pub fn is_console_fallback(&self) -> bool {
        self.method == DeliveryMethod::ConsoleFallback
    }
}

/// Walks the delivery chain in priority order until a channel succeeds.
///
/// Every attempt is bounded by `attempt_timeout` so a hanging provider
/// call degrades into "try the next channel" instead of stalling the
/// request. The chain built from configuration always ends in the console
/// channel, which cannot fail, so `send` is infallible.
pub struct Dispatcher {
    channels: Vec<Arc<dyn DeliveryChannel>>,
    attempt_timeout: Duration,
}

impl Dispatcher {
    pub fn new(channels: Vec<Arc<dyn DeliveryChannel>>, attempt_timeout: Duration) -> Self {
        Self {
            channels,
            attempt_timeout,
        }
    }

    pub async fn send(&self, phone: &str, message: &str, code: &str) -> DeliveryOutcome {
        for channel in &self.channels {
            let method = channel.method();
            match timeout(self.attempt_timeout, channel.attempt(phone, message, code)).await {
                Ok(Ok(())) => {
                    info!(method = method.label(), "OTP delivered");
                    return DeliveryOutcome { method };
                }
                Ok(Err(CourierError::QuotaExceeded)) => {
                    warn!(
                        method = method.label(),
                        "channel quota exhausted, trying next channel"
                    );
                }
                Ok(Err(err)) => {
                    warn!(
                        method = method.label(),
                        error = %err,
                        "channel delivery failed, trying next channel"
                    );
                }
                Err(_) => {
                    warn!(
                        method = method.label(),
                        timeout_secs = self.attempt_timeout.as_secs(),
                        "channel attempt timed out, trying next channel"
                    );
                }
            }
        }

        // Reached only if a chain was built without the console terminator.
        info!(phone, code, "no channel delivered, OTP surfaced on console");
        DeliveryOutcome {
            method: DeliveryMethod::ConsoleFallback,
        }
    }
}
