//! # Signature Verifier
//!
//! The seam between the ledger and the signature scheme. The ledger never
//! inspects signature bytes itself; it asks a `SignatureVerifier` whether a
//! signature over a digest belongs to a claimed signer.
//!
//! Verification is total: any malformed input answers `false`.

use coldchain_core::{Address, MessageDigest};

use crate::secp256k1::recover_signer;

/// Decides whether a signature over a digest was produced by a claimed signer.
pub trait SignatureVerifier: Send + Sync {
    /// `true` iff `signature` over `digest` recovers to `claimed_signer`.
    fn verify(&self, digest: &MessageDigest, claimed_signer: &Address, signature: &[u8]) -> bool;
}

/// Recovers the signer from a secp256k1 personal-message signature and
/// compares it to the claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveringVerifier;

impl SignatureVerifier for RecoveringVerifier {
    fn verify(&self, digest: &MessageDigest, claimed_signer: &Address, signature: &[u8]) -> bool {
        verify(digest, claimed_signer, signature)
    }
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, digest: &MessageDigest, claimed_signer: &Address, signature: &[u8]) -> bool {
        (**self).verify(digest, claimed_signer, signature)
    }
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for std::sync::Arc<V> {
    fn verify(&self, digest: &MessageDigest, claimed_signer: &Address, signature: &[u8]) -> bool {
        (**self).verify(digest, claimed_signer, signature)
    }
}

/// Verify with signer recovery. See [`RecoveringVerifier`].
pub fn verify(digest: &MessageDigest, claimed_signer: &Address, signature: &[u8]) -> bool {
    match recover_signer(digest, signature) {
        Ok(recovered) => recovered == *claimed_signer,
        Err(error) => {
            tracing::debug!(
                digest = %digest,
                claimed_signer = %claimed_signer,
                %error,
                "signer recovery failed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secp256k1::Secp256k1KeyPair;
    use coldchain_core::keccak256;

    #[test]
    fn test_matching_signer() {
        let kp = Secp256k1KeyPair::generate();
        let digest = keccak256(b"certificate");
        let sig = kp.sign_digest(&digest).unwrap();
        assert!(RecoveringVerifier.verify(&digest, &kp.address(), sig.as_bytes()));
    }

    #[test]
    fn test_foreign_signer() {
        let signer = Secp256k1KeyPair::generate();
        let other = Secp256k1KeyPair::generate();
        let digest = keccak256(b"certificate");
        let sig = signer.sign_digest(&digest).unwrap();
        assert!(!verify(&digest, &other.address(), sig.as_bytes()));
    }

    #[test]
    fn test_malformed_input_is_false() {
        let addr = Address::from_bytes([7; 20]);
        let digest = keccak256(b"x");
        assert!(!verify(&digest, &addr, &[]));
        assert!(!verify(&digest, &addr, &[0xff; 65]));
        assert!(!verify(&digest, &addr, &[1; 70]));
    }

    #[test]
    fn test_single_byte_change_in_r_or_s_is_false() {
        let kp = Secp256k1KeyPair::generate();
        let digest = keccak256(b"certificate");
        let sig = kp.sign_digest(&digest).unwrap();
        for index in [0, 17, 31, 32, 48, 63] {
            let mut altered = sig.as_bytes().to_vec();
            altered[index] ^= 0x01;
            assert!(
                !verify(&digest, &kp.address(), &altered),
                "byte {index} altered but signature still matched"
            );
        }
    }

    #[test]
    fn test_verifier_through_arc_and_reference() {
        let kp = Secp256k1KeyPair::generate();
        let digest = keccak256(b"shared");
        let sig = kp.sign_digest(&digest).unwrap();
        let shared: std::sync::Arc<dyn SignatureVerifier> = std::sync::Arc::new(RecoveringVerifier);
        assert!(shared.verify(&digest, &kp.address(), sig.as_bytes()));
        let by_ref = &RecoveringVerifier;
        assert!(by_ref.verify(&digest, &kp.address(), sig.as_bytes()));
    }
}
