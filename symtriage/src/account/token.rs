//! Self-contained signed bearer tokens.
//!
//! A token is `base64url(claims JSON) . base64url(HMAC-SHA256 signature)`,
//! verifiable from the signing key alone, with no store lookup.

use crate::errors::AccountError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: 30 minutes.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 60;

/// Claims carried inside a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The subject username.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// The credential returned on successful login.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
}

/// Issues and verifies signed tokens.
#[derive(Debug, Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    /// Creates a signer with the default 30-minute lifetime.
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Sets the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issues a token for a username.
    #[must_use]
    pub fn issue(&self, username: &str) -> AccessToken {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        // TokenClaims has no non-serializable fields.
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));

        AccessToken {
            access_token: format!("{payload}.{signature}"),
            token_type: "bearer",
        }
    }

    /// Verifies a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` for any malformed,
    /// tampered, or expired token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AccountError> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or(AccountError::InvalidCredentials)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AccountError::InvalidCredentials)?;
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AccountError::InvalidCredentials)?;

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AccountError::InvalidCredentials)?;
        let claims: TokenClaims = serde_json::from_slice(&claims_bytes)
            .map_err(|_| AccountError::InvalidCredentials)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(claims)
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    #[allow(clippy::expect_used)]
    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }
}
