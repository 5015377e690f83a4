//! # Ledger Snapshots
//!
//! A snapshot is the three ledger tables as plain data, suitable for
//! serializing to JSON. The event log is not included.
//!
//! ## Security Invariant
//!
//! [`CertificateLedger::restore`] never trusts a snapshot. Before rebuilding
//! a ledger it checks:
//!
//! - entity addresses are unique;
//! - batch and certificate ids are dense and match their position;
//! - every manufacturer is a registered PROVER;
//! - every certificate's issuer and prover copies equal the registered
//!   records and hold the ISSUER and PROVER modes;
//! - every certificate references an existing batch;
//! - each batch's certificate list is exactly the ids of the certificates
//!   referencing it, in ascending order.
//!
//! Any violation fails with `LedgerError::InvalidSnapshot`.

use coldchain_core::{CertificateId, LedgerError, Mode};
use coldchain_crypto::SignatureVerifier;
use serde::{Deserialize, Serialize};

use crate::batch::{VaccineBatch, VaccineBatchRegistry};
use crate::certificate::{Certificate, CertificateStore};
use crate::config::LedgerConfig;
use crate::entity::{Entity, EntityRegistry};
use crate::event::EventLog;
use crate::ledger::CertificateLedger;

/// The persisted form of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSnapshot {
    pub entities: Vec<Entity>,
    pub batches: Vec<VaccineBatch>,
    pub certificates: Vec<Certificate>,
}

fn invalid(reason: impl Into<String>) -> LedgerError {
    LedgerError::InvalidSnapshot(reason.into())
}

impl<V: SignatureVerifier> CertificateLedger<V> {
    /// Export the tables.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            entities: self.entities.iter().copied().collect(),
            batches: self.batches.iter().cloned().collect(),
            certificates: self.certificates.iter().cloned().collect(),
        }
    }

    /// Rebuild a ledger from a snapshot after validating it.
    pub fn restore(
        config: LedgerConfig,
        verifier: V,
        snapshot: LedgerSnapshot,
    ) -> Result<Self, LedgerError> {
        let LedgerSnapshot {
            entities: entity_rows,
            batches: batch_rows,
            certificates: certificate_rows,
        } = snapshot;

        let mut entities = EntityRegistry::new();
        for entity in &entity_rows {
            entities
                .add(entity.id, entity.mode)
                .map_err(|_| invalid(format!("duplicate entity {}", entity.id)))?;
        }

        let mut expected_ids: Vec<Vec<CertificateId>> = vec![Vec::new(); batch_rows.len()];
        for (position, cert) in certificate_rows.iter().enumerate() {
            if cert.id.value() != position as u64 {
                return Err(invalid(format!(
                    "certificate at position {position} has id {}",
                    cert.id
                )));
            }
            check_party(&entities, &cert.issuer, Mode::Issuer, "issuer", cert.id)?;
            check_party(&entities, &cert.prover, Mode::Prover, "prover", cert.id)?;
            let slot = usize::try_from(cert.vaccine_batch_id.value())
                .ok()
                .and_then(|idx| expected_ids.get_mut(idx))
                .ok_or_else(|| {
                    invalid(format!(
                        "certificate {} references unknown batch {}",
                        cert.id, cert.vaccine_batch_id
                    ))
                })?;
            slot.push(cert.id);
        }

        let mut batches = VaccineBatchRegistry::new();
        for (position, batch) in batch_rows.into_iter().enumerate() {
            if batch.id.value() != position as u64 {
                return Err(invalid(format!(
                    "batch at position {position} has id {}",
                    batch.id
                )));
            }
            match entities.get(&batch.manufacturer) {
                Ok(e) if e.mode == Mode::Prover => {}
                Ok(e) => {
                    return Err(invalid(format!(
                        "batch {} manufacturer {} has mode {}",
                        batch.id, batch.manufacturer, e.mode
                    )))
                }
                Err(_) => {
                    return Err(invalid(format!(
                        "batch {} manufacturer {} is not registered",
                        batch.id, batch.manufacturer
                    )))
                }
            }
            if batch.certificate_ids != expected_ids[position] {
                return Err(invalid(format!(
                    "batch {} certificate list does not match certificate table",
                    batch.id
                )));
            }
            batches.push_restored(batch);
        }

        let mut certificates = CertificateStore::new();
        for cert in certificate_rows {
            certificates.push(cert);
        }

        tracing::info!(
            entities = entities.len(),
            batches = batches.len(),
            certificates = certificates.len(),
            "ledger restored from snapshot"
        );

        Ok(Self {
            config,
            verifier,
            entities,
            batches,
            certificates,
            events: EventLog::new(),
        })
    }
}

fn check_party(
    entities: &EntityRegistry,
    party: &Entity,
    expected: Mode,
    role: &str,
    certificate_id: CertificateId,
) -> Result<(), LedgerError> {
    let registered = entities.get(&party.id).map_err(|_| {
        invalid(format!(
            "certificate {certificate_id} {role} {} is not registered",
            party.id
        ))
    })?;
    if registered != *party {
        return Err(invalid(format!(
            "certificate {certificate_id} {role} copy differs from registry"
        )));
    }
    if party.mode != expected {
        return Err(invalid(format!(
            "certificate {certificate_id} {role} has mode {}, expected {expected}",
            party.mode
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldchain_core::{Address, BatchId, CertificateStatus, SignatureBytes};
    use coldchain_crypto::RecoveringVerifier;

    const INSPECTOR: Address = Address::from_bytes([0x11; 20]);
    const MAKER: Address = Address::from_bytes([0x22; 20]);

    fn populated() -> CertificateLedger {
        let mut ledger = CertificateLedger::new();
        ledger.add_entity(INSPECTOR, Mode::Issuer).unwrap();
        ledger.add_entity(MAKER, Mode::Prover).unwrap();
        let a = ledger.add_vaccine_batch("A", MAKER).unwrap();
        let b = ledger.add_vaccine_batch("B", MAKER).unwrap();
        for batch in [a, b, a] {
            ledger
                .issue_certificate(
                    &INSPECTOR,
                    &MAKER,
                    CertificateStatus::Manufactured,
                    batch,
                    SignatureBytes::from([1u8, 2, 3]),
                )
                .unwrap();
        }
        ledger
    }

    fn restore(snapshot: LedgerSnapshot) -> Result<CertificateLedger, LedgerError> {
        CertificateLedger::restore(LedgerConfig::default(), RecoveringVerifier, snapshot)
    }

    #[test]
    fn restore_reproduces_tables() {
        let snap = populated().snapshot();
        let restored = restore(snap.clone()).unwrap();
        assert_eq!(restored.snapshot(), snap);
        assert!(restored.events().is_empty());
    }

    #[test]
    fn empty_snapshot_restores() {
        let restored = restore(LedgerSnapshot::default()).unwrap();
        assert_eq!(restored.entities().count(), 0);
    }

    #[test]
    fn duplicate_entity_rejected() {
        let mut snap = populated().snapshot();
        snap.entities.push(snap.entities[0]);
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }

    #[test]
    fn sparse_batch_ids_rejected() {
        let mut snap = populated().snapshot();
        snap.batches[1].id = BatchId::new(5);
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }

    #[test]
    fn reordered_certificates_rejected() {
        let mut snap = populated().snapshot();
        snap.certificates.swap(0, 1);
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }

    #[test]
    fn altered_party_copy_rejected() {
        let mut snap = populated().snapshot();
        snap.certificates[0].issuer.mode = Mode::Verifier;
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }

    #[test]
    fn batch_history_mismatch_rejected() {
        let mut snap = populated().snapshot();
        snap.batches[0].certificate_ids.pop();
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }

    #[test]
    fn certificate_for_missing_batch_rejected() {
        let mut snap = populated().snapshot();
        snap.certificates[2].vaccine_batch_id = BatchId::new(7);
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }

    #[test]
    fn manufacturer_must_be_prover() {
        let mut snap = populated().snapshot();
        snap.batches[1].manufacturer = INSPECTOR;
        assert!(matches!(restore(snap), Err(LedgerError::InvalidSnapshot(_))));
    }
}
