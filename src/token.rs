//! Signed capability tokens granting overlay access to one channel.
//!
//! A token is `header.payload.signature` with base64url (unpadded) segments:
//! a fixed HS256 header, a JSON payload carrying `{sub, iat, exp}`, and an
//! HMAC-SHA256 signature over the first two segments. Tokens are stateless:
//! nothing is persisted server-side, and a token dies at its `exp` instant.
//!
//! Verification is strict: there is no permissive mode that accepts an
//! unverified bearer string. Signature comparison uses the `hmac` crate's
//! constant-time `verify_slice`.

use std::fmt::{Display, Formatter};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Fixed JOSE-style header for every issued token.
const HEADER_JSON: &[u8] = br#"{"alg":"HS256","typ":"JWT"}"#;

/// Issued tokens never live shorter than this, regardless of the request.
const MIN_TTL_SECONDS: i64 = 60;

/// Claims carried in a capability token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Streamer display name the token was issued for.
    pub sub: String,
    /// Issue time, unix seconds.
    pub iat: i64,
    /// Expiry time, unix seconds.
    pub exp: i64,
}

/// Why a token failed verification. All variants are terminal for the
/// request; the caller must not retry with the same token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    /// Token does not split into exactly three non-empty segments, or the
    /// payload segment does not decode to valid claims.
    Malformed,
    /// Recomputed signature does not match the signature segment.
    BadSignature,
    /// Signature is valid but `exp` has passed.
    Expired,
}

impl Display for VerifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed token"),
            Self::BadSignature => write!(f, "bad signature"),
            Self::Expired => write!(f, "token expired"),
        }
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

/// Issues and verifies capability tokens with a server-held secret.
///
/// Pure function of input + secret + clock; holds no mutable state and is
/// cheap to share behind an `Arc`.
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    /// Create a codec from the signing secret.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the secret is empty.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(AppError::Config("signing secret must not be empty".into()));
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|err| AppError::Config(format!("invalid signing secret: {err}")))?;
        Ok(Self { mac })
    }

    /// Issue a token for `subject` valid for `ttl_seconds` from now.
    ///
    /// The TTL is clamped to at least 60 seconds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the claims fail to serialize.
    pub fn issue(&self, subject: &str, ttl_seconds: i64) -> Result<String> {
        self.issue_at(subject, ttl_seconds, Utc::now().timestamp())
    }

    /// Issue a token as of the given unix-seconds instant.
    ///
    /// Deterministic for identical inputs; exposed so tests can pin the
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the claims fail to serialize.
    pub fn issue_at(&self, subject: &str, ttl_seconds: i64, now: i64) -> Result<String> {
        let claims = TokenClaims {
            sub: subject.trim().to_owned(),
            iat: now,
            exp: now + ttl_seconds.max(MIN_TTL_SECONDS),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|err| AppError::Config(format!("token claims encode failed: {err}")))?;

        let header = URL_SAFE_NO_PAD.encode(HEADER_JSON);
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&header, &payload));
        Ok(format!("{header}.{payload}.{signature}"))
    }

    /// Verify a token against the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the token is malformed, tampered, or
    /// past its expiry.
    pub fn verify(&self, token: &str) -> std::result::Result<TokenClaims, VerifyError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as of the given unix-seconds instant.
    ///
    /// The signature is checked before the payload is decoded, so a
    /// tampered payload reports `BadSignature` rather than `Malformed`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError`] when the token is malformed, tampered, or
    /// past its expiry.
    pub fn verify_at(
        &self,
        token: &str,
        now: i64,
    ) -> std::result::Result<TokenClaims, VerifyError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(VerifyError::Malformed);
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(VerifyError::Malformed);
        }

        let expected = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| VerifyError::BadSignature)?;
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| VerifyError::BadSignature)?;

        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| VerifyError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&raw).map_err(|_| VerifyError::Malformed)?;

        if claims.exp < now {
            return Err(VerifyError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, header: &str, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}
