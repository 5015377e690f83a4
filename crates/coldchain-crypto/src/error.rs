//! # Cryptographic Error Types
//!
//! Structured errors for key handling and signer recovery. Verification
//! never surfaces these: [`crate::verifier::SignatureVerifier`] maps every
//! failure to `false`.

use coldchain_core::FormatError;
use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Recoverable signatures are exactly 65 bytes.
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// The trailing `v` byte is not 0, 1, 27 or 28.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// `r` or `s` is zero or not below the curve order.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// `s` is in the upper half of the curve order.
    #[error("non-canonical signature: s is in the upper half of the curve order")]
    HighS,

    /// No public key could be recovered from the signature.
    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),

    /// Secret key bytes are not a valid secp256k1 scalar.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// The signer rejected the digest.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Hex or length error while parsing key material.
    #[error(transparent)]
    Format(#[from] FormatError),
}
