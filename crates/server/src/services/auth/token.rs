//! Signed session tokens.
//!
//! Tokens are compact HS256 JWTs. The payload is tagged by `user_type` so a
//! customer, baker or admin token can never be mistaken for another kind.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use local_crust_core::{AdminId, AdminRole, UserId, UserType};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of customer and baker tokens.
pub const USER_TOKEN_TTL: Duration = Duration::days(7);

/// Lifetime of admin tokens.
pub const ADMIN_TOKEN_TTL: Duration = Duration::days(1);

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// Token payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "user_type", rename_all = "snake_case")]
pub enum Claims {
    Customer { user_id: UserId, exp: i64 },
    Baker { user_id: UserId, exp: i64 },
    Admin { admin_id: AdminId, role: AdminRole, exp: i64 },
}

impl Claims {
    /// Claims for a marketplace account, valid for [`USER_TOKEN_TTL`].
    #[must_use]
    pub fn for_user(user_id: UserId, user_type: UserType, now: DateTime<Utc>) -> Self {
        let exp = (now + USER_TOKEN_TTL).timestamp();
        match user_type {
            UserType::Customer => Self::Customer { user_id, exp },
            UserType::Baker => Self::Baker { user_id, exp },
        }
    }

    /// Claims for a back-office account, valid for [`ADMIN_TOKEN_TTL`].
    #[must_use]
    pub fn for_admin(admin_id: AdminId, role: AdminRole, now: DateTime<Utc>) -> Self {
        Self::Admin {
            admin_id,
            role,
            exp: (now + ADMIN_TOKEN_TTL).timestamp(),
        }
    }

    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        match self {
            Self::Customer { exp, .. } | Self::Baker { exp, .. } | Self::Admin { exp, .. } => *exp,
        }
    }

    /// The marketplace account this token belongs to, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Customer { user_id, .. } | Self::Baker { user_id, .. } => Some(*user_id),
            Self::Admin { .. } => None,
        }
    }
}

/// Issues and checks tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
}

impl TokenSigner {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"))
    }

    /// Encode and sign claims.
    #[must_use]
    pub fn sign(&self, claims: &Claims) -> String {
        let header = URL_SAFE_NO_PAD.encode(HEADER);
        // Serializing a plain enum of integers and strings cannot fail.
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap_or_default());
        let signing_input = format!("{header}.{payload}");

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{signing_input}.{signature}")
    }

    /// Check the signature and expiry of a token at `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the token cannot be decoded,
    /// `TokenError::BadSignature` if it was not signed with this secret, and
    /// `TokenError::Expired` once its expiry has passed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        if payload.contains('.') {
            return Err(TokenError::Malformed);
        }

        let header_json = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header_json).map_err(|_| TokenError::Malformed)?;
        if header.get("alg").and_then(serde_json::Value::as_str) != Some("HS256") {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.expires_at() <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Check a token against the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::verify_at`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> TokenSigner {
        TokenSigner::new(SecretString::from(secret.to_string()))
    }

    #[test]
    fn test_user_token_round_trip() {
        let now = Utc::now();
        let signer = signer("k3y-for-tests-only-9f8a7b6c5d4e3f2a1b0c");
        let claims = Claims::for_user(UserId::new(12), UserType::Baker, now);

        let token = signer.sign(&claims);
        let verified = signer.verify_at(&token, now).unwrap();

        assert_eq!(verified, claims);
        assert_eq!(verified.user_id(), Some(UserId::new(12)));
        assert!(matches!(verified, Claims::Baker { .. }));
    }

    #[test]
    fn test_admin_token_round_trip() {
        let now = Utc::now();
        let signer = signer("k3y-for-tests-only-9f8a7b6c5d4e3f2a1b0c");
        let claims = Claims::for_admin(AdminId::new(1), AdminRole::SuperAdmin, now);

        let verified = signer.verify_at(&signer.sign(&claims), now).unwrap();
        assert_eq!(verified, claims);
        assert_eq!(verified.user_id(), None);
    }

    #[test]
    fn test_payload_is_tagged_by_user_type() {
        let claims = Claims::Customer {
            user_id: UserId::new(3),
            exp: 100,
        };
        let json = serde_json::to_value(claims).unwrap();
        assert_eq!(json["user_type"], "customer");
        assert_eq!(json["user_id"], 3);
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let signer = signer("k3y-for-tests-only-9f8a7b6c5d4e3f2a1b0c");
        let token = signer.sign(&Claims::for_user(UserId::new(1), UserType::Customer, now));

        let later = now + USER_TOKEN_TTL + Duration::seconds(1);
        assert_eq!(signer.verify_at(&token, later), Err(TokenError::Expired));

        let admin = signer.sign(&Claims::for_admin(AdminId::new(1), AdminRole::Admin, now));
        let next_day = now + ADMIN_TOKEN_TTL;
        assert_eq!(signer.verify_at(&admin, next_day), Err(TokenError::Expired));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let now = Utc::now();
        let token = signer("first-secret-aaaaaaaaaaaaaaaaaaaaaaaa")
            .sign(&Claims::for_user(UserId::new(1), UserType::Customer, now));

        assert_eq!(
            signer("second-secret-bbbbbbbbbbbbbbbbbbbbbbbbb").verify_at(&token, now),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = Utc::now();
        let signer = signer("k3y-for-tests-only-9f8a7b6c5d4e3f2a1b0c");
        let token = signer.sign(&Claims::for_user(UserId::new(1), UserType::Customer, now));

        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims::for_user(UserId::new(2), UserType::Baker, now)).unwrap(),
        );
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        assert_eq!(signer.verify_at(&forged, now), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let signer = signer("k3y-for-tests-only-9f8a7b6c5d4e3f2a1b0c");
        let now = Utc::now();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.??.##"] {
            assert_eq!(signer.verify_at(token, now), Err(TokenError::Malformed));
        }
    }
}
