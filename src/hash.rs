//! 32-byte collision-resistant digest.
//!
//! Every tree value, node, and published root is a `Hash`. The concrete digest is
//! SHA-256; `merge` is plain concatenation, and the hex codec is the canonical
//! wire/storage representation (it is what ends up in the `nodes`/`state` SQL
//! tables).

use sha2::{Digest, Sha256};
use thiserror::Error;

/// A 32-byte digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; 32]);

/// Errors decoding a `Hash` from its hex representation.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("invalid hex: {0}")]
    Decode(#[from] hex::FromHexError),
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

impl Hash {
    /// Wrap a raw 32-byte digest.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Concatenate `self` and `other`, most-significant first. This is the
    /// preimage fed to `hash()` when combining sibling hashes.
    pub fn merge(&self, other: &Hash) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.0);
        out[32..].copy_from_slice(&other.0);
        out
    }

    /// Lowercase hex encoding, used as the table key for roots and as the
    /// `nodes.value` / `state.root` column value.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a lowercase (or mixed-case) hex string back into a `Hash`.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(s)?;
        let len = bytes.len();
        let array: [u8; 32] = bytes.try_into().map_err(|_| HashError::Length(len))?;
        Ok(Self(array))
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash({})", self.hex())
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// Compute the digest of arbitrary input.
pub fn hash(bytes: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    Hash(out)
}
