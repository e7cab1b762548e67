//! Content digests for change tracking.
//!
//! A digest is the SHA-256 hash of an entity's canonical JSON encoding. Two
//! values with identical field contents always hash the same; any change to
//! a serialized field changes the digest.

use crate::{Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Size of a content digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Fixed-size hash over an entity's serialized field values.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; DIGEST_SIZE]);

impl ContentDigest {
    /// Hashes raw bytes.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Hashes the compact JSON encoding of `value`.
    ///
    /// Struct fields serialize in declaration order, so the encoding is
    /// deterministic for any type without unordered maps.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::of_bytes(&bytes))
    }

    /// Wraps an existing digest.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Lowercase hex encoding.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentDigest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidDigest(e.to_string()))?;
        let bytes: [u8; DIGEST_SIZE] = bytes.try_into().map_err(|b: Vec<u8>| {
            Error::InvalidDigest(format!("expected {DIGEST_SIZE} bytes, got {}", b.len()))
        })?;
        Ok(Self(bytes))
    }
}
