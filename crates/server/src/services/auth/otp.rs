//! One-time login codes.
//!
//! Codes are kept in memory, keyed by email. The cache evicts entries shortly
//! after they expire, so the store never grows with abandoned codes.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use moka::ops::compute::Op;
use rand::Rng;

use local_crust_core::Email;

use super::AuthError;

/// How long a code stays valid.
pub const OTP_VALIDITY: Duration = Duration::minutes(5);

/// Extra time an expired code is kept so it can be reported as expired
/// rather than missing.
const EVICTION_GRACE: StdDuration = StdDuration::from_secs(60);

#[derive(Debug, Clone)]
struct OtpEntry {
    code: String,
    expires_at: DateTime<Utc>,
}

/// In-memory store of issued codes.
#[derive(Clone)]
pub struct OtpStore {
    codes: Cache<Email, OtpEntry>,
}

impl Default for OtpStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpStore {
    #[must_use]
    pub fn new() -> Self {
        let ttl = OTP_VALIDITY
            .to_std()
            .unwrap_or(StdDuration::from_secs(300))
            + EVICTION_GRACE;
        Self {
            codes: Cache::builder().max_capacity(10_000).time_to_live(ttl).build(),
        }
    }

    /// Issue a fresh code for `email`, replacing any earlier one.
    pub async fn issue(&self, email: &Email) -> String {
        let code = generate_code();
        self.insert_at(email, &code, Utc::now()).await;
        code
    }

    async fn insert_at(&self, email: &Email, code: &str, now: DateTime<Utc>) {
        self.codes
            .insert(
                email.clone(),
                OtpEntry {
                    code: code.to_string(),
                    expires_at: now + OTP_VALIDITY,
                },
            )
            .await;
    }

    /// Drop the outstanding code for `email`, if any.
    pub async fn revoke(&self, email: &Email) {
        self.codes.invalidate(email).await;
    }

    /// Check a submitted code. A matching code is consumed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OtpMissing` if no code is outstanding,
    /// `AuthError::OtpExpired` if it has lapsed (the code is discarded), and
    /// `AuthError::OtpMismatch` if it does not match (the code is kept).
    pub async fn verify(&self, email: &Email, code: &str) -> Result<(), AuthError> {
        self.verify_at(email, code, Utc::now()).await
    }

    async fn verify_at(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        // Check and removal happen under the entry lock, so one code
        // cannot be redeemed by two concurrent requests.
        let mut outcome = Err(AuthError::OtpMissing);
        self.codes
            .entry(email.clone())
            .and_compute_with(|current| {
                let op = match current.map(|entry| entry.into_value()) {
                    None => Op::Nop,
                    Some(entry) if now > entry.expires_at => {
                        outcome = Err(AuthError::OtpExpired);
                        Op::Remove
                    }
                    Some(entry) if entry.code != code.trim() => {
                        outcome = Err(AuthError::OtpMismatch);
                        Op::Nop
                    }
                    Some(_) => {
                        outcome = Ok(());
                        Op::Remove
                    }
                };
                std::future::ready(op)
            })
            .await;
        outcome
    }
}

impl std::fmt::Debug for OtpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpStore")
            .field("outstanding", &self.codes.entry_count())
            .finish()
    }
}

/// Generate a 6-digit code.
#[must_use]
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::parse("baker@example.com").unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_generate_code_format() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_code_verifies_once() {
        let store = OtpStore::new();
        let code = store.issue(&email()).await;

        assert!(store.verify(&email(), &code).await.is_ok());
        assert!(matches!(
            store.verify(&email(), &code).await,
            Err(AuthError::OtpMissing)
        ));
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_entry() {
        let store = OtpStore::new();
        store.insert_at(&email(), "123456", Utc::now()).await;

        assert!(matches!(
            store.verify(&email(), "654321").await,
            Err(AuthError::OtpMismatch)
        ));
        assert!(store.verify(&email(), "123456").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_code_rejected_and_discarded() {
        let store = OtpStore::new();
        let issued = Utc::now() - OTP_VALIDITY - Duration::seconds(1);
        store.insert_at(&email(), "123456", issued).await;

        assert!(matches!(
            store.verify(&email(), "123456").await,
            Err(AuthError::OtpExpired)
        ));
        assert!(matches!(
            store.verify(&email(), "123456").await,
            Err(AuthError::OtpMissing)
        ));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let store = OtpStore::new();
        assert!(matches!(
            store.verify(&email(), "123456").await,
            Err(AuthError::OtpMissing)
        ));
    }

    #[tokio::test]
    async fn test_revoked_code_is_gone() {
        let store = OtpStore::new();
        let code = store.issue(&email()).await;
        store.revoke(&email()).await;

        assert!(matches!(
            store.verify(&email(), &code).await,
            Err(AuthError::OtpMissing)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemption_succeeds_once() {
        let store = OtpStore::new();
        for _ in 0..50 {
            let code = store.issue(&email()).await;
            let attempts: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let code = code.clone();
                    tokio::spawn(async move { store.verify(&email(), &code).await.is_ok() })
                })
                .collect();

            let mut redeemed = 0;
            for attempt in attempts {
                if attempt.await.unwrap_or(false) {
                    redeemed += 1;
                }
            }
            assert_eq!(redeemed, 1);
        }
    }

    #[tokio::test]
    async fn test_reissue_replaces_code() {
        let store = OtpStore::new();
        store.insert_at(&email(), "111111", Utc::now()).await;
        store.insert_at(&email(), "222222", Utc::now()).await;

        assert!(matches!(
            store.verify_at(&email(), "111111", Utc::now()).await,
            Err(AuthError::OtpMismatch)
        ));
        assert!(store.verify(&email(), "222222").await.is_ok());
    }
}
