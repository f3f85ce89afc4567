//! Lobby entry passwords.
//!
//! Plaintext only ever lives inside [`Password`], whose `Debug` output is
//! redacted. Lobbies store a [`PasswordHash`]: a random salt plus the
//! SHA-256 digest of `salt || password`, both hex-encoded.

use std::fmt;

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Plaintext password supplied with a create or join command.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wraps a plaintext password.
    #[must_use]
    pub fn new(plain: impl Into<String>) -> Self {
        Self(plain.into())
    }

    /// Returns `true` for the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Salted one-way digest of a lobby password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Hashes `password` under a fresh random salt.
    #[must_use]
    pub fn generate(password: &Password) -> Self {
        let salt = hex::encode(uuid::Uuid::new_v4().as_bytes());
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    /// Returns `true` if `candidate` hashes to the stored digest.
    #[must_use]
    pub fn verify(&self, candidate: &Password) -> bool {
        digest(&self.salt, candidate) == self.digest
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

fn digest(salt: &str, password: &Password) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.expose());
    hex::encode(hasher.finalize())
}
