//! # Canonical Attestation Message
//!
//! This module defines `AttestationMessage`, the sole construction path for
//! the text an issuer signs when certifying a vaccine batch.
//!
//! ## Format
//!
//! ```text
//! {IssuerLabel} ({issuer}) has certified vaccine batch #{batch_id} for {ProverLabel} ({prover}).
//! ```
//!
//! - Addresses are rendered in EIP-55 checksum form with the `0x` prefix.
//! - `batch_id` is decimal with no padding.
//! - The labels carry the status context and come from
//!   [`CertificateStatus::party_labels`]:
//!
//! | Status                   | Issuer label | Prover label              |
//! |--------------------------|--------------|---------------------------|
//! | MANUFACTURED             | Inspector    | Manufacturer              |
//! | DELIVERING_INTERNATIONAL | Inspector    | International Distributor |
//! | STORED                   | Inspector    | Storage Facility          |
//! | DELIVERING_LOCAL         | Inspector    | Local Distributor         |
//! | DELIVERED                | Immunizer    | Recipient                 |
//!
//! The digest is `keccak256(utf8(message))`.
//!
//! ## Stability
//!
//! Signature verification is byte-exact over this digest. Changing a label,
//! the address casing, or the punctuation invalidates every signature
//! produced against the previous format.

use std::fmt;

use crate::digest::{keccak256, MessageDigest};
use crate::domain::CertificateStatus;
use crate::identity::{Address, BatchId};

/// Canonical text of a certificate attestation.
///
/// The inner string is private; the only constructor is
/// [`AttestationMessage::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttestationMessage(String);

impl AttestationMessage {
    /// Build the canonical message for an attestation.
    pub fn new(
        issuer: &Address,
        prover: &Address,
        batch_id: BatchId,
        status: CertificateStatus,
    ) -> Self {
        let (issuer_label, prover_label) = status.party_labels();
        Self(format!(
            "{issuer_label} ({}) has certified vaccine batch #{batch_id} for {prover_label} ({}).",
            issuer.to_checksum(),
            prover.to_checksum(),
        ))
    }

    /// The message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The UTF-8 bytes that are hashed.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// keccak-256 digest of the message bytes.
    pub fn digest(&self) -> MessageDigest {
        keccak256(self.as_bytes())
    }
}

impl fmt::Display for AttestationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<[u8]> for AttestationMessage {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspector() -> Address {
        Address::from_hex("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap()
    }

    fn manufacturer() -> Address {
        Address::from_hex("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359").unwrap()
    }

    #[test]
    fn test_manufactured_message_text() {
        let msg = AttestationMessage::new(
            &inspector(),
            &manufacturer(),
            BatchId::new(0),
            CertificateStatus::Manufactured,
        );
        assert_eq!(
            msg.as_str(),
            "Inspector (0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed) has certified vaccine batch #0 \
             for Manufacturer (0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359)."
        );
    }

    #[test]
    fn test_delivered_message_uses_immunizer_labels() {
        let msg = AttestationMessage::new(
            &inspector(),
            &manufacturer(),
            BatchId::new(12),
            CertificateStatus::Delivered,
        );
        assert!(msg.as_str().starts_with("Immunizer (0x5aAeb"));
        assert!(msg.as_str().contains("batch #12 for Recipient (0xfB69"));
    }

    #[test]
    fn test_digest_is_keccak_of_text() {
        let msg = AttestationMessage::new(
            &inspector(),
            &manufacturer(),
            BatchId::new(3),
            CertificateStatus::Stored,
        );
        assert_eq!(msg.digest(), keccak256(msg.as_str().as_bytes()));
    }

    #[test]
    fn test_every_field_changes_digest() {
        let base = AttestationMessage::new(
            &inspector(),
            &manufacturer(),
            BatchId::new(1),
            CertificateStatus::Stored,
        )
        .digest();
        let variants = [
            AttestationMessage::new(&manufacturer(), &manufacturer(), BatchId::new(1), CertificateStatus::Stored),
            AttestationMessage::new(&inspector(), &inspector(), BatchId::new(1), CertificateStatus::Stored),
            AttestationMessage::new(&inspector(), &manufacturer(), BatchId::new(2), CertificateStatus::Stored),
            AttestationMessage::new(&inspector(), &manufacturer(), BatchId::new(1), CertificateStatus::DeliveringLocal),
        ];
        for v in variants {
            assert_ne!(v.digest(), base, "{v}");
        }
    }
}
