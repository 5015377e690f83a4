//! # Identifier Newtypes
//!
//! Newtype wrappers for the three identifier spaces of the ledger:
//!
//! - `Address`: a 20-byte participant identity, derived from a secp256k1
//!   public key the same way Ethereum accounts are.
//! - `BatchId`: dense, 0-based vaccine batch sequence number.
//! - `CertificateId`: dense, 0-based certificate sequence number shared by
//!   all batches.
//!
//! Type-level distinction prevents passing a batch id where a certificate
//! id is expected. Each id space is independently monotonic from 0.
//!
//! ## Serde
//!
//! - `Address` serializes as an EIP-55 checksummed `0x` hex string and
//!   deserializes from any-case hex with or without the `0x` prefix.
//! - `BatchId` and `CertificateId` serialize as bare integers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::keccak256;
use crate::error::FormatError;

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte participant identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an address from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FormatError> {
        let arr: [u8; ADDRESS_LEN] =
            bytes.try_into().map_err(|_| FormatError::InvalidLength {
                what: "address",
                expected: ADDRESS_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Return the raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Parse from hex. The `0x` prefix is optional and letter case is ignored,
    /// so both lowercase and checksummed forms are accepted.
    pub fn from_hex(s: &str) -> Result<Self, FormatError> {
        let bytes = decode_prefixed_hex(s)?;
        Self::from_slice(&bytes)
    }

    /// Render as lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Render in EIP-55 mixed-case checksum form.
    ///
    /// Each hex letter is uppercased when the matching nibble of
    /// `keccak256(lowercase_hex)` is 8 or greater.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let hash = hash.as_bytes();

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Sequence number of a vaccine batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

/// Sequence number of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(u64);

impl BatchId {
    /// Wrap a raw sequence number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw sequence number.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl CertificateId {
    /// Wrap a raw sequence number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw sequence number.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BatchId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u64> for CertificateId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Decode hex with an optional `0x` / `0X` prefix.
pub fn decode_prefixed_hex(s: &str) -> Result<Vec<u8>, FormatError> {
    let trimmed = s.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(body).map_err(|e| FormatError::HexDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test vectors from EIP-55.
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_matches_eip55_vectors() {
        for expected in CHECKSUMMED {
            let addr = Address::from_hex(&expected.to_lowercase()).unwrap();
            assert_eq!(addr.to_checksum(), expected);
        }
    }

    #[test]
    fn test_display_is_checksummed() {
        let addr = Address::from_hex(CHECKSUMMED[0]).unwrap();
        assert_eq!(addr.to_string(), CHECKSUMMED[0]);
        assert_eq!(addr.to_hex(), CHECKSUMMED[0].to_lowercase());
    }

    #[test]
    fn test_parse_without_prefix() {
        let with = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let without = Address::from_hex("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Address::from_hex("0x1234"),
            Err(FormatError::InvalidLength { actual: 2, .. })
        ));
        assert!(matches!(
            Address::from_hex("0xzz"),
            Err(FormatError::HexDecode(_))
        ));
        assert!(Address::from_hex("").is_err());
    }

    #[test]
    fn test_address_serde_uses_checksum() {
        let addr = Address::from_hex(CHECKSUMMED[1]).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED[1]));
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_ids_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&BatchId::new(4)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&CertificateId::new(9)).unwrap(), "9");
        let parsed: BatchId = serde_json::from_str("12").unwrap();
        assert_eq!(parsed.value(), 12);
    }

    #[test]
    fn test_id_ordering() {
        assert!(BatchId::new(0) < BatchId::new(1));
        assert!(CertificateId::new(2) > CertificateId::new(1));
    }
}
