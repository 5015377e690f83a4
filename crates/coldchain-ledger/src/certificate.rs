//! # Certificates
//!
//! A certificate is an immutable attestation by an ISSUER that a PROVER
//! handled a vaccine batch at a given custody stage. Issuer and prover are
//! stored as copies of their entity records at issuance time.

use coldchain_core::{
    AttestationMessage, BatchId, CertificateId, CertificateStatus, LedgerError, RecordKind,
    SignatureBytes,
};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// An issued certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Dense id, shared across all batches.
    pub id: CertificateId,
    /// The attesting entity (mode ISSUER).
    pub issuer: Entity,
    /// The attested entity (mode PROVER).
    pub prover: Entity,
    /// The custody stage being attested.
    pub status: CertificateStatus,
    /// The batch the attestation is about.
    pub vaccine_batch_id: BatchId,
    /// The signature as submitted. Not validated for shape.
    pub signature: SignatureBytes,
}

impl Certificate {
    /// The canonical message the issuer was expected to sign.
    pub fn attestation_message(&self) -> AttestationMessage {
        AttestationMessage::new(
            &self.issuer.id,
            &self.prover.id,
            self.vaccine_batch_id,
            self.status,
        )
    }
}

/// Dense table of certificates.
#[derive(Debug, Clone, Default)]
pub struct CertificateStore {
    certificates: Vec<Certificate>,
}

impl CertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next certificate will receive.
    pub fn next_id(&self) -> CertificateId {
        CertificateId::new(self.certificates.len() as u64)
    }

    /// Append a certificate whose id is [`Self::next_id`].
    pub(crate) fn push(&mut self, certificate: Certificate) {
        debug_assert_eq!(certificate.id, self.next_id());
        self.certificates.push(certificate);
    }

    /// Look up a certificate.
    pub fn get(&self, id: CertificateId) -> Result<&Certificate, LedgerError> {
        usize::try_from(id.value())
            .ok()
            .and_then(|idx| self.certificates.get(idx))
            .ok_or_else(|| LedgerError::not_found(RecordKind::Certificate, id))
    }

    /// Certificates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldchain_core::{Address, Mode};

    fn sample(id: u64) -> Certificate {
        Certificate {
            id: CertificateId::new(id),
            issuer: Entity::new(Address::from_bytes([1; 20]), Mode::Issuer),
            prover: Entity::new(Address::from_bytes([2; 20]), Mode::Prover),
            status: CertificateStatus::Stored,
            vaccine_batch_id: BatchId::new(3),
            signature: SignatureBytes::from([9u8; 4]),
        }
    }

    #[test]
    fn push_and_get() {
        let mut store = CertificateStore::new();
        store.push(sample(0));
        store.push(sample(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(CertificateId::new(1)).unwrap().id, CertificateId::new(1));
        assert!(store.get(CertificateId::new(2)).is_err());
    }

    #[test]
    fn attestation_message_uses_status_labels() {
        let msg = sample(0).attestation_message();
        assert!(msg.as_str().starts_with("Inspector (0x"));
        assert!(msg.as_str().contains("vaccine batch #3 for Storage Facility (0x"));
    }

    #[test]
    fn serialized_form() {
        let json = serde_json::to_value(sample(0)).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["status"], "STORED");
        assert_eq!(json["vaccine_batch_id"], 3);
        assert_eq!(json["signature"], "0x09090909");
        assert_eq!(json["issuer"]["mode"], "ISSUER");
    }
}
