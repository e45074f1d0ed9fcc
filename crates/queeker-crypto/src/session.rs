//! Signed session tokens.
//!
//! Wire format: `base64url(claims_json) "." hex(mac)` where
//! `mac = BLAKE3::keyed_hash(K, claims_json)` and
//! `K = BLAKE3::derive_key("Queeker v1 session-token", secret)`.
//!
//! Tokens carry no encryption: claims are readable by the holder, only their
//! integrity and expiry are protected.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use queeker_types::{ActorId, Timestamp};

use crate::blake3::{self, contexts};
use crate::{CryptoError, Result};

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// Default session lifetime (30 days).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Shared secret used to sign and verify session tokens.
///
/// Only the derived MAC key is kept; it is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionSecret {
    mac_key: [u8; 32],
}

impl SessionSecret {
    /// Derive the signing key from raw secret bytes.
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CryptoError::InvalidSecret {
                min: MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }
        Ok(Self {
            mac_key: blake3::derive_key(contexts::SESSION_TOKEN_KEY, secret),
        })
    }

    fn mac(&self, message: &[u8]) -> [u8; 32] {
        blake3::keyed_hash(&self.mac_key, message)
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret(..)")
    }
}

/// Claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Actor id.
    pub sub: ActorId,
    /// Issued at.
    pub iat: Timestamp,
    /// Expires at (exclusive).
    pub exp: Timestamp,
}

impl SessionClaims {
    pub fn new(actor: ActorId, issued_at: Timestamp, ttl_secs: u64) -> Self {
        Self {
            sub: actor,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        }
    }
}

/// Sign claims into a token string.
pub fn issue(claims: &SessionClaims, secret: &SessionSecret) -> Result<String> {
    let payload =
        serde_json::to_vec(claims).map_err(|e| CryptoError::Serialization(e.to_string()))?;
    let mac = secret.mac(&payload);
    Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), hex::encode(mac)))
}

/// Verify a token's MAC and expiry and return its claims.
///
/// # Errors
///
/// - [`CryptoError::MalformedToken`] if the token cannot be decoded
/// - [`CryptoError::SignatureVerification`] if the MAC does not match
/// - [`CryptoError::Expired`] if `now >= exp`
pub fn verify(token: &str, secret: &SessionSecret, now: Timestamp) -> Result<SessionClaims> {
    let (payload_b64, mac_hex) = token
        .trim()
        .split_once('.')
        .ok_or_else(|| CryptoError::MalformedToken("missing separator".into()))?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|e| CryptoError::MalformedToken(format!("payload: {e}")))?;

    let mut mac = [0u8; 32];
    hex::decode_to_slice(mac_hex, &mut mac)
        .map_err(|e| CryptoError::MalformedToken(format!("mac: {e}")))?;

    if !blake3::mac_eq(&secret.mac(&payload), &mac) {
        return Err(CryptoError::SignatureVerification);
    }

    let claims: SessionClaims = serde_json::from_slice(&payload)
        .map_err(|e| CryptoError::MalformedToken(format!("claims: {e}")))?;

    if now >= claims.exp {
        return Err(CryptoError::Expired {
            expired_at: claims.exp,
        });
    }

    Ok(claims)
}
