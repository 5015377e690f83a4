//! # Certificate Ledger
//!
//! Orchestrates the entity, batch and certificate tables.
//!
//! ## Issuance
//!
//! `issue_certificate` runs in two phases. The validation phase resolves the
//! issuer, prover and batch, checks roles, applies the configured status
//! ordering and checks the signature. Nothing is written until every check
//! has passed. The write phase then appends to the batch history, stores the
//! certificate and records the event.
//!
//! ## Signature Handling
//!
//! The issuer's signature is checked against the canonical attestation
//! digest. Under [`SignatureCheck::Advisory`] a mismatch is logged at warn
//! level and the certificate is still recorded. Callers that care ask
//! [`CertificateLedger::is_matching_signature`] or
//! [`CertificateLedger::verify_certificate`] later.

use coldchain_core::{
    Address, AttestationMessage, BatchId, CertificateId, CertificateStatus, LedgerError,
    MessageDigest, Mode, SignatureBytes,
};
use coldchain_crypto::{RecoveringVerifier, SignatureVerifier};
use tracing::{info, warn};

use crate::batch::{VaccineBatch, VaccineBatchRegistry};
use crate::certificate::{Certificate, CertificateStore};
use crate::config::{LedgerConfig, SignatureCheck, StatusOrder};
use crate::entity::{Entity, EntityRegistry};
use crate::event::{EventLog, LedgerEvent, RecordedEvent};

/// The certification ledger.
#[derive(Debug)]
pub struct CertificateLedger<V: SignatureVerifier = RecoveringVerifier> {
    pub(crate) config: LedgerConfig,
    pub(crate) verifier: V,
    pub(crate) entities: EntityRegistry,
    pub(crate) batches: VaccineBatchRegistry,
    pub(crate) certificates: CertificateStore,
    pub(crate) events: EventLog,
}

impl CertificateLedger<RecoveringVerifier> {
    /// An empty ledger with default configuration.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// An empty ledger with the given configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self::with_verifier(config, RecoveringVerifier)
    }
}

impl Default for CertificateLedger<RecoveringVerifier> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: SignatureVerifier> CertificateLedger<V> {
    /// An empty ledger using a custom signature verifier.
    pub fn with_verifier(config: LedgerConfig, verifier: V) -> Self {
        Self {
            config,
            verifier,
            entities: EntityRegistry::new(),
            batches: VaccineBatchRegistry::new(),
            certificates: CertificateStore::new(),
            events: EventLog::new(),
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Register a participant.
    pub fn add_entity(&mut self, id: Address, mode: Mode) -> Result<Entity, LedgerError> {
        let entity = self.entities.add(id, mode)?;
        self.events.record(LedgerEvent::EntityAdded { id, mode });
        info!(entity = %id, mode = %mode, "entity added");
        Ok(entity)
    }

    /// Look up a registered participant.
    pub fn get_entity(&self, id: &Address) -> Result<Entity, LedgerError> {
        self.entities.get(id)
    }

    /// Registered entities in address order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    // ── Vaccine batches ──────────────────────────────────────────────

    /// Register a batch made by a PROVER.
    pub fn add_vaccine_batch(
        &mut self,
        brand: impl Into<String>,
        manufacturer: Address,
    ) -> Result<BatchId, LedgerError> {
        let brand = brand.into();
        let id = self.batches.add(&self.entities, brand.as_str(), manufacturer)?;
        self.events
            .record(LedgerEvent::VaccineBatchAdded { id, manufacturer });
        info!(batch_id = %id, %brand, manufacturer = %manufacturer, "vaccine batch added");
        Ok(id)
    }

    /// Look up a batch by id.
    pub fn get_batch(&self, id: BatchId) -> Result<&VaccineBatch, LedgerError> {
        self.batches.get(id)
    }

    /// Batches in id order.
    pub fn batches(&self) -> impl Iterator<Item = &VaccineBatch> {
        self.batches.iter()
    }

    // ── Certificates ─────────────────────────────────────────────────

    /// Issue a certificate for `batch_id` at `status`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the issuer, prover or batch is not registered.
    /// - `RoleViolation` unless the issuer is an ISSUER and the prover a
    ///   PROVER.
    /// - `OutOfOrderStatus` under [`StatusOrder::Sequential`].
    /// - `SignatureMismatch` under [`SignatureCheck::Required`].
    pub fn issue_certificate(
        &mut self,
        issuer: &Address,
        prover: &Address,
        status: CertificateStatus,
        batch_id: BatchId,
        signature: impl Into<SignatureBytes>,
    ) -> Result<CertificateId, LedgerError> {
        let signature = signature.into();

        let issuer = self.entities.get(issuer)?;
        let prover = self.entities.get(prover)?;
        require_mode("issuer", &issuer, Mode::Issuer)?;
        require_mode("prover", &prover, Mode::Prover)?;

        let batch = self.batches.get(batch_id)?;
        if self.config.status_order == StatusOrder::Sequential {
            let previous = self.latest_status_of(batch);
            if !status.may_follow(previous) {
                return Err(LedgerError::OutOfOrderStatus {
                    batch_id,
                    previous,
                    attempted: status,
                });
            }
        }

        let digest = AttestationMessage::new(&issuer.id, &prover.id, batch_id, status).digest();
        let signature_matches = self
            .verifier
            .verify(&digest, &issuer.id, signature.as_bytes());
        if !signature_matches {
            match self.config.signature_check {
                SignatureCheck::Required => {
                    return Err(LedgerError::SignatureMismatch {
                        issuer: issuer.id,
                        batch_id,
                    });
                }
                SignatureCheck::Advisory => {
                    warn!(
                        issuer = %issuer.id,
                        batch_id = %batch_id,
                        status = %status,
                        digest = %digest,
                        "certificate signature does not match issuer; recording anyway"
                    );
                }
            }
        }

        let id = self.certificates.next_id();
        self.batches.append_certificate(batch_id, id)?;
        self.certificates.push(Certificate {
            id,
            issuer,
            prover,
            status,
            vaccine_batch_id: batch_id,
            signature,
        });
        self.events.record(LedgerEvent::CertificateIssued {
            issuer: issuer.id,
            prover: prover.id,
            certificate_id: id,
        });
        info!(
            certificate_id = %id,
            batch_id = %batch_id,
            status = %status,
            issuer = %issuer.id,
            prover = %prover.id,
            signature_matches,
            "certificate issued"
        );
        Ok(id)
    }

    /// Look up a certificate by id.
    pub fn get_certificate(&self, id: CertificateId) -> Result<&Certificate, LedgerError> {
        self.certificates.get(id)
    }

    /// Certificates in id order.
    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> {
        self.certificates.iter()
    }

    /// Whether the stored signature of `certificate_id` over `digest` was
    /// produced by `claimed_signer`.
    ///
    /// The digest is caller-supplied and is not checked against the
    /// certificate's own contents.
    pub fn is_matching_signature(
        &self,
        digest: &MessageDigest,
        certificate_id: CertificateId,
        claimed_signer: &Address,
    ) -> Result<bool, LedgerError> {
        let certificate = self.certificates.get(certificate_id)?;
        Ok(self
            .verifier
            .verify(digest, claimed_signer, certificate.signature.as_bytes()))
    }

    /// The canonical message a stored certificate's issuer was expected to
    /// sign.
    pub fn attestation_message(
        &self,
        certificate_id: CertificateId,
    ) -> Result<AttestationMessage, LedgerError> {
        Ok(self.certificates.get(certificate_id)?.attestation_message())
    }

    /// Check a stored certificate's signature against its own canonical
    /// digest and issuer.
    pub fn verify_certificate(&self, certificate_id: CertificateId) -> Result<bool, LedgerError> {
        let certificate = self.certificates.get(certificate_id)?;
        let digest = certificate.attestation_message().digest();
        Ok(self.verifier.verify(
            &digest,
            &certificate.issuer.id,
            certificate.signature.as_bytes(),
        ))
    }

    /// A batch's certificates in issuance order.
    pub fn certificate_history(&self, batch_id: BatchId) -> Result<Vec<&Certificate>, LedgerError> {
        let batch = self.batches.get(batch_id)?;
        batch
            .certificate_ids
            .iter()
            .map(|id| self.certificates.get(*id))
            .collect()
    }

    /// Status of the batch's most recent certificate, if any.
    pub fn latest_status(
        &self,
        batch_id: BatchId,
    ) -> Result<Option<CertificateStatus>, LedgerError> {
        let batch = self.batches.get(batch_id)?;
        Ok(self.latest_status_of(batch))
    }

    fn latest_status_of(&self, batch: &VaccineBatch) -> Option<CertificateStatus> {
        batch
            .certificate_ids
            .last()
            .and_then(|id| self.certificates.get(*id).ok())
            .map(|c| c.status)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Pending events, oldest first.
    pub fn events(&self) -> &[RecordedEvent] {
        self.events.events()
    }

    /// Drain pending events.
    pub fn take_events(&mut self) -> Vec<RecordedEvent> {
        self.events.take()
    }
}

fn require_mode(party: &'static str, entity: &Entity, expected: Mode) -> Result<(), LedgerError> {
    if entity.mode == expected {
        Ok(())
    } else {
        Err(LedgerError::RoleViolation {
            party,
            id: entity.id,
            expected,
            actual: entity.mode,
        })
    }
}
