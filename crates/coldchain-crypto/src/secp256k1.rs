//! # secp256k1 Signing and Signer Recovery
//!
//! Key pairs, recoverable ECDSA signatures, and address recovery using the
//! Ethereum personal-message convention.
//!
//! ## Security Invariant
//!
//! - Signing always applies the personal-message prefix, so a certificate
//!   signature can never double as a signature over a raw 32-byte hash.
//! - Signatures are produced with RFC 6979 deterministic nonces and low-S
//!   normalization. Recovery rejects high-S input.
//! - `Secp256k1KeyPair` does not implement `Serialize`, and its `Debug`
//!   output never shows key material.

use coldchain_core::{
    decode_prefixed_hex, keccak256, Address, FormatError, MessageDigest, SignatureBytes,
};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::error::CryptoError;

/// Length of a recoverable signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// Prefix prepended to a message before hashing for a personal signature.
const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Hash an arbitrary message the way `eth_sign` / `personal_sign` do:
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`.
pub fn personal_message_hash(message: &[u8]) -> MessageDigest {
    let mut data = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 4 + message.len());
    data.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// The hash actually signed for a 32-byte attestation digest.
pub fn personal_message_digest(digest: &MessageDigest) -> MessageDigest {
    personal_message_hash(digest.as_bytes())
}

// ---------------------------------------------------------------------------
// Key pair
// ---------------------------------------------------------------------------

/// A secp256k1 key pair used to sign attestation digests.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte secret scalar.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidSecretKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Create a key pair from a hex secret, `0x` prefix optional.
    pub fn from_secret_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let bytes = decode_prefixed_hex(hex_str)?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| FormatError::InvalidLength {
                what: "secret key",
                expected: 32,
                actual: bytes.len(),
            })?;
        Self::from_secret_bytes(&arr)
    }

    /// The address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Sign an attestation digest.
    ///
    /// The personal-message prefix is applied first, so the result verifies
    /// with [`recover_signer`] against the same `digest`. The trailing byte is
    /// `27 + recovery_id`.
    pub fn sign_digest(&self, digest: &MessageDigest) -> Result<SignatureBytes, CryptoError> {
        let prehash = personal_message_digest(digest);
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(prehash.as_bytes())
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(&sig.to_bytes());
        bytes.push(27 + recid.to_byte());
        Ok(SignatureBytes::new(bytes))
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secp256k1KeyPair({}, <private>)", self.address())
    }
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Derive the 20-byte address of a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

/// Recover the address that signed `digest` under the personal-message
/// convention.
pub fn recover_signer(digest: &MessageDigest, signature: &[u8]) -> Result<Address, CryptoError> {
    recover_prehashed(&personal_message_digest(digest), signature)
}

/// Recover the address that signed an already-prefixed hash.
pub fn recover_prehashed(prehash: &MessageDigest, signature: &[u8]) -> Result<Address, CryptoError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignatureLength(signature.len()));
    }

    let v = signature[64];
    let recid = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        other => return Err(CryptoError::InvalidRecoveryId(other)),
    };
    let recid = RecoveryId::from_byte(recid).ok_or(CryptoError::InvalidRecoveryId(v))?;

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
    if sig.normalize_s().is_some() {
        return Err(CryptoError::HighS);
    }

    let key = VerifyingKey::recover_from_prehash(prehash.as_bytes(), &sig, recid)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(address_from_verifying_key(&key))
}
