//! OTP verification against the store.

use chrono::Utc;
use tracing::debug;

use super::store::OtpStore;

/// Internal cause of a verification failure.
///
/// The wire message for `NotFound` uses the expiry wording so callers
/// cannot probe whether a code was ever issued for a phone; the precise
/// cause stays available here for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    NotFound,
    Expired,
    Mismatch,
}

impl VerifyFailure {
    pub fn user_message(self) -> &'static str {
        match self {
            VerifyFailure::NotFound => "OTP expired or not found",
            VerifyFailure::Expired => "OTP expired",
            VerifyFailure::Mismatch => "Invalid OTP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Failed(VerifyFailure),
}

/// Check a submitted code against the store.
///
/// Expired and matched records are consumed; a mismatch leaves the record
/// intact so the user can retry within the window. Every removal goes
/// through `delete_if_matches` so a verification that raced with a fresh
/// `put` cannot delete the newer code, on the expiry path as much as on
/// the consume path.
pub async fn verify_otp(store: &dyn OtpStore, phone: &str, submitted: &str) -> VerifyOutcome {
    let Some(record) = store.get(phone).await else {
        debug!(phone, "no OTP record for phone");
        return VerifyOutcome::Failed(VerifyFailure::NotFound);
    };

    if record.is_expired(Utc::now()) {
        store.delete_if_matches(phone, &record.code).await;
        debug!(phone, "OTP record expired");
        return VerifyOutcome::Failed(VerifyFailure::Expired);
    }

    if record.code != submitted {
        debug!(phone, "OTP code mismatch, record retained");
        return VerifyOutcome::Failed(VerifyFailure::Mismatch);
    }

    if store.delete_if_matches(phone, submitted).await {
        VerifyOutcome::Verified
    } else {
        // A newer code was issued between lookup and consume.
        VerifyOutcome::Failed(VerifyFailure::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::store::InMemoryOtpStore;
    use chrono::Duration;

    const PHONE: &str = "+919999999999";

    #[tokio::test]
    async fn correct_code_verifies_once() {
        let store = InMemoryOtpStore::new();
        store.put(PHONE, "482913", Duration::minutes(5)).await;

        assert_eq!(
            verify_otp(&store, PHONE, "482913").await,
            VerifyOutcome::Verified
        );
        // Consumed: replay with the same code must fail.
        assert_eq!(
            verify_otp(&store, PHONE, "482913").await,
            VerifyOutcome::Failed(VerifyFailure::NotFound)
        );
    }

    #[tokio::test]
    async fn wrong_code_retains_record_for_retry() {
        let store = InMemoryOtpStore::new();
        store.put(PHONE, "482913", Duration::minutes(5)).await;

        assert_eq!(
            verify_otp(&store, PHONE, "000000").await,
            VerifyOutcome::Failed(VerifyFailure::Mismatch)
        );
        assert_eq!(
            verify_otp(&store, PHONE, "482913").await,
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn expired_code_fails_and_clears_record() {
        let store = InMemoryOtpStore::new();
        store.put(PHONE, "482913", Duration::seconds(-1)).await;

        assert_eq!(
            verify_otp(&store, PHONE, "482913").await,
            VerifyOutcome::Failed(VerifyFailure::Expired)
        );
        assert!(store.get(PHONE).await.is_none());
    }

    #[tokio::test]
    async fn unknown_phone_fails_without_leaking_cause() {
        let store = InMemoryOtpStore::new();
        let outcome = verify_otp(&store, PHONE, "482913").await;
        assert_eq!(outcome, VerifyOutcome::Failed(VerifyFailure::NotFound));
        assert_eq!(
            VerifyFailure::NotFound.user_message(),
            "OTP expired or not found"
        );
    }

    /// Hands the caller an expired record while slipping a fresh code
    /// into the underlying store, reproducing a re-issue that lands
    /// between a stale verifier's lookup and its cleanup delete.
    struct ReissueDuringGet {
        inner: InMemoryOtpStore,
        raced: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl OtpStore for ReissueDuringGet {
        async fn put(&self, phone: &str, code: &str, ttl: Duration) {
            self.inner.put(phone, code, ttl).await;
        }

        async fn get(&self, phone: &str) -> Option<crate::domains::auth::store::OtpRecord> {
            use std::sync::atomic::Ordering;
            if !self.raced.swap(true, Ordering::SeqCst) {
                self.inner.put(phone, "654321", Duration::minutes(5)).await;
                return Some(crate::domains::auth::store::OtpRecord {
                    code: "111111".to_string(),
                    expires_at: Utc::now() - Duration::seconds(1),
                });
            }
            self.inner.get(phone).await
        }

        async fn delete(&self, phone: &str) {
            self.inner.delete(phone).await;
        }

        async fn delete_if_matches(&self, phone: &str, code: &str) -> bool {
            self.inner.delete_if_matches(phone, code).await
        }

        async fn sweep_expired(&self) {
            self.inner.sweep_expired().await;
        }
    }

    #[tokio::test]
    async fn expiry_cleanup_spares_concurrently_reissued_code() {
        let store = ReissueDuringGet {
            inner: InMemoryOtpStore::new(),
            raced: std::sync::atomic::AtomicBool::new(false),
        };

        // Stale verify sees the expired code; its cleanup must not touch
        // the fresh record issued in the meantime.
        assert_eq!(
            verify_otp(&store, PHONE, "111111").await,
            VerifyOutcome::Failed(VerifyFailure::Expired)
        );
        assert_eq!(
            verify_otp(&store, PHONE, "654321").await,
            VerifyOutcome::Verified
        );
    }

    #[tokio::test]
    async fn reissued_code_invalidates_previous_one() {
        let store = InMemoryOtpStore::new();
        store.put(PHONE, "111111", Duration::minutes(5)).await;
        store.put(PHONE, "222222", Duration::minutes(5)).await;

        assert_eq!(
            verify_otp(&store, PHONE, "111111").await,
            VerifyOutcome::Failed(VerifyFailure::Mismatch)
        );
        assert_eq!(
            verify_otp(&store, PHONE, "222222").await,
            VerifyOutcome::Verified
        );
    }
}
