//! # Shared Ledger Handle
//!
//! A cloneable handle to one ledger behind `Arc<parking_lot::RwLock<_>>`.
//! Mutations take the write lock, so concurrent writers are serialized and
//! ids stay dense. Queries take the read lock and return owned values, so no
//! lock guard escapes the handle.

use std::sync::Arc;

use coldchain_core::{
    Address, AttestationMessage, BatchId, CertificateId, CertificateStatus, LedgerError,
    MessageDigest, Mode, SignatureBytes,
};
use coldchain_crypto::{RecoveringVerifier, SignatureVerifier};
use parking_lot::RwLock;

use crate::batch::VaccineBatch;
use crate::certificate::Certificate;
use crate::entity::Entity;
use crate::event::RecordedEvent;
use crate::ledger::CertificateLedger;
use crate::snapshot::LedgerSnapshot;

/// Thread-safe handle to a [`CertificateLedger`].
pub struct SharedLedger<V: SignatureVerifier = RecoveringVerifier> {
    inner: Arc<RwLock<CertificateLedger<V>>>,
}

impl<V: SignatureVerifier> Clone for SharedLedger<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedLedger<RecoveringVerifier> {
    fn default() -> Self {
        Self::new(CertificateLedger::new())
    }
}

impl<V: SignatureVerifier> SharedLedger<V> {
    /// Wrap a ledger.
    pub fn new(ledger: CertificateLedger<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn add_entity(&self, id: Address, mode: Mode) -> Result<Entity, LedgerError> {
        self.inner.write().add_entity(id, mode)
    }

    pub fn add_vaccine_batch(
        &self,
        brand: impl Into<String>,
        manufacturer: Address,
    ) -> Result<BatchId, LedgerError> {
        self.inner.write().add_vaccine_batch(brand, manufacturer)
    }

    pub fn issue_certificate(
        &self,
        issuer: &Address,
        prover: &Address,
        status: CertificateStatus,
        batch_id: BatchId,
        signature: impl Into<SignatureBytes>,
    ) -> Result<CertificateId, LedgerError> {
        self.inner
            .write()
            .issue_certificate(issuer, prover, status, batch_id, signature)
    }

    pub fn get_entity(&self, id: &Address) -> Result<Entity, LedgerError> {
        self.inner.read().get_entity(id)
    }

    pub fn get_batch(&self, id: BatchId) -> Result<VaccineBatch, LedgerError> {
        self.inner.read().get_batch(id).cloned()
    }

    pub fn get_certificate(&self, id: CertificateId) -> Result<Certificate, LedgerError> {
        self.inner.read().get_certificate(id).cloned()
    }

    pub fn is_matching_signature(
        &self,
        digest: &MessageDigest,
        certificate_id: CertificateId,
        claimed_signer: &Address,
    ) -> Result<bool, LedgerError> {
        self.inner
            .read()
            .is_matching_signature(digest, certificate_id, claimed_signer)
    }

    pub fn verify_certificate(&self, certificate_id: CertificateId) -> Result<bool, LedgerError> {
        self.inner.read().verify_certificate(certificate_id)
    }

    pub fn attestation_message(
        &self,
        certificate_id: CertificateId,
    ) -> Result<AttestationMessage, LedgerError> {
        self.inner.read().attestation_message(certificate_id)
    }

    pub fn certificate_history(&self, batch_id: BatchId) -> Result<Vec<Certificate>, LedgerError> {
        let ledger = self.inner.read();
        let history = ledger.certificate_history(batch_id)?;
        Ok(history.into_iter().cloned().collect())
    }

    pub fn latest_status(
        &self,
        batch_id: BatchId,
    ) -> Result<Option<CertificateStatus>, LedgerError> {
        self.inner.read().latest_status(batch_id)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.read().snapshot()
    }

    pub fn take_events(&self) -> Vec<RecordedEvent> {
        self.inner.write().take_events()
    }

    /// Run a read-only closure against the ledger under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&CertificateLedger<V>) -> R) -> R {
        f(&self.inner.read())
    }
}
