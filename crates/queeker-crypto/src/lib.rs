//! # queeker-crypto
//!
//! Cryptographic primitives for Queeker sessions.
//!
//! ## Modules
//!
//! - [`blake3`] — Domain-separated BLAKE3 hashing and keyed MACs
//! - [`session`] — Signed, expiring session tokens (sign/verify codec)

pub mod blake3;
pub mod session;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// MAC verification failed.
    #[error("signature verification failed")]
    SignatureVerification,

    /// Token is past its expiry time.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: u64 },

    /// Token does not have the `payload.mac` shape or fails to decode.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Secret is unusable (empty or too short).
    #[error("invalid secret: expected at least {min} bytes, got {actual}")]
    InvalidSecret { min: usize, actual: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
