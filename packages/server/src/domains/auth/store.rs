//! Ephemeral OTP storage.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

/// A live OTP issued to one phone number.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Ephemeral phone -> OTP mapping, one live record per phone.
///
/// `put` overwrites any existing record (last writer wins), which is how
/// re-requesting an OTP invalidates the previous code. No persistence is
/// promised: a process restart legitimately drops every outstanding OTP.
///
/// External key-value stores with native TTL can implement this trait for
/// multi-instance deployments; `delete_if_matches` maps to a CAS delete.
#[async_trait]
pub trait OtpStore: Send + Sync {
    async fn put(&self, phone: &str, code: &str, ttl: Duration);
    async fn get(&self, phone: &str) -> Option<OtpRecord>;
    async fn delete(&self, phone: &str);
    /// Atomically delete the record only if its code still matches.
    ///
    /// Returns false when the record is gone or was overwritten by a
    /// newer `put`, so a stale verification can never consume a code it
    /// did not match.
    async fn delete_if_matches(&self, phone: &str, code: &str) -> bool;
    /// Drop every record whose expiry has passed.
    async fn sweep_expired(&self);
}

/// In-process store for single-instance deployments.
#[derive(Default)]
pub struct InMemoryOtpStore {
    records: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, phone: &str, code: &str, ttl: Duration) {
        let record = OtpRecord {
            code: code.to_string(),
            expires_at: Utc::now() + ttl,
        };
        self.records.lock().await.insert(phone.to_string(), record);
    }

    async fn get(&self, phone: &str) -> Option<OtpRecord> {
        self.records.lock().await.get(phone).cloned()
    }

    async fn delete(&self, phone: &str) {
        self.records.lock().await.remove(phone);
    }

    async fn delete_if_matches(&self, phone: &str, code: &str) -> bool {
        let mut records = self.records.lock().await;
        match records.get(phone) {
            Some(record) if record.code == code => {
                records.remove(phone);
                true
            }
            _ => false,
        }
    }

    async fn sweep_expired(&self) {
        let now = Utc::now();
        self.records
            .lock()
            .await
            .retain(|_, record| !record.is_expired(now));
    }
}
