//! Stateless signed tokens binding a deferred redirect to one click attempt.
//!
//! A token is `base64url(payload) . base64url(mac16)` where the payload is an
//! optional length-prefixed click id followed by a fixed 12-byte block of
//! 4-byte big-endian expiry and 8 random bytes. The MAC covers
//! `code || "|" || payload`, so the code is authenticated without being
//! carried in the token: a token replayed against any other code fails
//! verification.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// 4-byte expiry + 8-byte nonce.
const FIXED_BLOCK_LEN: usize = 12;
/// MAC truncation length.
const SIGNATURE_LEN: usize = 16;

/// Errors from token issuance and validation.
///
/// Validation failures are a single opaque variant: callers never learn
/// whether a token was malformed, forged, or merely expired.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
    #[error("redirect token secret is not configured")]
    MissingSecret,
    #[error("click id too long for token payload")]
    ClickIdTooLong,
}

/// HMAC issuance/validation of short-lived, code-scoped redirect tokens.
///
/// Pure functions over a process-held secret; no shared mutable state.
pub struct RedirectTokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl RedirectTokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Mints a token for `code`, optionally carrying a click id.
    pub fn issue(&self, code: &str, click_id: &str) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut payload = Vec::with_capacity(1 + click_id.len() + FIXED_BLOCK_LEN);
        if !click_id.is_empty() {
            let id = click_id.as_bytes();
            let len = u8::try_from(id.len()).map_err(|_| TokenError::ClickIdTooLong)?;
            payload.push(len);
            payload.extend_from_slice(id);
        }

        let expiry = Utc::now().timestamp() + self.ttl.as_secs() as i64;
        let expiry = u32::try_from(expiry).map_err(|_| TokenError::Invalid)?;
        payload.extend_from_slice(&expiry.to_be_bytes());

        let mut nonce = [0u8; 8];
        rand::rng().fill_bytes(&mut nonce);
        payload.extend_from_slice(&nonce);

        let tag = self.sign(code, &payload);
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(&tag[..SIGNATURE_LEN])
        ))
    }

    /// Verifies a token against `code` and returns the embedded click id, if
    /// any.
    ///
    /// Signature comparison is constant-time; expiry is checked only after
    /// the MAC verifies so a forger learns nothing from timing.
    pub fn validate(&self, code: &str, token: &str) -> Result<Option<String>, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let (payload_part, sig_part) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| TokenError::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| TokenError::Invalid)?;
        if signature.len() != SIGNATURE_LEN {
            return Err(TokenError::Invalid);
        }

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::MissingSecret)?;
        mac.update(code.as_bytes());
        mac.update(b"|");
        mac.update(&payload);
        mac.verify_truncated_left(&signature)
            .map_err(|_| TokenError::Invalid)?;

        let (click_id, fixed) = if payload.len() == FIXED_BLOCK_LEN {
            (None, payload.as_slice())
        } else {
            if payload.is_empty() {
                return Err(TokenError::Invalid);
            }
            let id_len = payload[0] as usize;
            if payload.len() != 1 + id_len + FIXED_BLOCK_LEN {
                return Err(TokenError::Invalid);
            }
            let id = std::str::from_utf8(&payload[1..1 + id_len])
                .map_err(|_| TokenError::Invalid)?;
            (Some(id.to_string()), &payload[1 + id_len..])
        };

        let mut expiry_bytes = [0u8; 4];
        expiry_bytes.copy_from_slice(&fixed[..4]);
        let expiry = u32::from_be_bytes(expiry_bytes);
        if Utc::now().timestamp() > i64::from(expiry) {
            return Err(TokenError::Invalid);
        }

        Ok(click_id)
    }

    fn sign(&self, code: &str, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(code.as_bytes());
        mac.update(b"|");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}
