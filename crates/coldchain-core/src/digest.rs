//! # Message Digests: Keccak-256
//!
//! Defines `MessageDigest`, the 32-byte keccak-256 hash over which
//! attestation signatures are produced and checked.
//!
//! Keccak-256 here is the pre-standard Keccak padding used by Ethereum, not
//! NIST SHA3-256. The two produce different output for the same input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::FormatError;
use crate::identity::decode_prefixed_hex;

/// A 32-byte keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageDigest([u8; 32]);

impl MessageDigest {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, `0x` prefix optional.
    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let bytes = decode_prefixed_hex(s)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| FormatError::InvalidLength {
                what: "digest",
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

/// Compute the keccak-256 digest of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> MessageDigest {
    let hash = Keccak256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    MessageDigest(bytes)
}

impl FromStr for MessageDigest {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageDigest({})", self.to_hex())
    }
}

impl Serialize for MessageDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MessageDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
