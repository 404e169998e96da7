//! The content-addressed identity primitive used throughout the domain model:
//! remote config payloads, connection-settings blobs, and available-components
//! sets are all identified by the [`Hash`] of their canonical bytes.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::format;

/// A fixed-width digest with a total ordering, suitable for use as a sorted-key
/// backend key suffix or a document-store index field.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash([u8; 32]);

impl Hash {
    /// Hash the canonicalised bytes of any serialisable value.
    pub fn of<T: Serialize>(value: &T) -> Self {
        let bytes = format::canonicalize(value).expect("serializing domain values cannot fail");
        Self::of_bytes(&bytes)
    }

    /// Hash raw bytes directly (used for already-canonical payloads such as a
    /// remote config body the agent will compare byte-for-byte).
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        if s.len() != 64 {
            return Err(HashParseError::WrongLength(s.len()));
        }
        let mut out = [0u8; 32];
        for (i, chunk) in out.iter_mut().enumerate() {
            let byte_str = &s[i * 2..i * 2 + 2];
            *chunk = u8::from_str_radix(byte_str, 16).map_err(|_| HashParseError::NotHex)?;
        }
        Ok(Self(out))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HashParseError {
    #[error("hash must be 64 hex characters, got {0}")]
    WrongLength(usize),
    #[error("hash contains non-hex characters")]
    NotHex,
}

impl TryFrom<String> for Hash {
    type Error = HashParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Hash> for String {
    fn from(value: Hash) -> Self {
        value.to_hex()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_payloads_produce_equal_hashes() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(Hash::of(&a), Hash::of(&b));
    }

    #[test]
    fn hex_round_trips() {
        let h = Hash::of_bytes(b"hello world");
        let s = h.to_hex();
        assert_eq!(Hash::from_hex(&s).unwrap(), h);
    }

    #[test]
    fn orders_totally() {
        let a = Hash::of_bytes(b"a");
        let b = Hash::of_bytes(b"b");
        assert!(a < b || b < a || a == b);
    }
}
