//! # coldchain-crypto: Cryptographic Primitives
//!
//! Provides the signature scheme behind certificate attestations:
//!
//! - **secp256k1** key pairs and recoverable ECDSA signatures, with the
//!   Ethereum personal-message prefix applied before signing.
//! - **Signer recovery**: derive the 20-byte `Address` that produced a
//!   signature over a digest.
//! - **`SignatureVerifier`**: the seam the ledger calls to decide whether a
//!   stored signature belongs to a claimed signer.
//!
//! ## Scheme
//!
//! ```text
//! signed_hash = keccak256("\x19Ethereum Signed Message:\n32" || digest)
//! signature   = r (32) || s (32) || v (1)      v ∈ {0, 1, 27, 28}
//! address     = keccak256(uncompressed_pubkey[1..])[12..]
//! ```
//!
//! High-S signatures are rejected (EIP-2).
//!
//! ## Crate Policy
//!
//! - Depends only on `coldchain-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   keys and real recovery.
//! - Private keys are never serialized or logged.

pub mod error;
pub mod secp256k1;
pub mod verifier;

pub use error::CryptoError;
pub use secp256k1::{
    address_from_verifying_key, personal_message_digest, personal_message_hash,
    recover_prehashed, recover_signer, Secp256k1KeyPair, SIGNATURE_LEN,
};
pub use verifier::{verify, RecoveringVerifier, SignatureVerifier};
