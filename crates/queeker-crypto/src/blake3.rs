//! Domain-separated BLAKE3 primitives.
//!
//! Keys are derived with [`derive_key`] under a registered context string and
//! used with [`keyed_hash`] as a MAC.

/// Registered BLAKE3 context strings.
pub mod contexts {
    pub const SESSION_TOKEN_KEY: &str = "Queeker v1 session-token";

    pub const ALL_CONTEXTS: &[&str] = &[SESSION_TOKEN_KEY];
}

/// Derive a key using BLAKE3's built-in key derivation mode.
///
/// The context string must be one of [`contexts::ALL_CONTEXTS`].
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; 32] {
    debug_assert!(contexts::ALL_CONTEXTS.contains(&context));
    ::blake3::derive_key(context, key_material)
}

/// Compute a keyed BLAKE3 hash (MAC).
pub fn keyed_hash(key: &[u8; 32], message: &[u8]) -> [u8; 32] {
    *::blake3::keyed_hash(key, message).as_bytes()
}

/// Constant-time MAC comparison.
pub fn mac_eq(expected: &[u8; 32], actual: &[u8; 32]) -> bool {
    ::blake3::Hash::from(*expected) == ::blake3::Hash::from(*actual)
}
