//! # Vaccine Batch Registry
//!
//! Batches are stored in a dense table indexed by `BatchId`. A batch's
//! manufacturer must be a registered PROVER at creation time. The
//! certificate list only ever grows, in issuance order.

use coldchain_core::{Address, BatchId, CertificateId, LedgerError, Mode, RecordKind};
use serde::{Deserialize, Serialize};

use crate::entity::EntityRegistry;

/// A vaccine batch and its certificate history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineBatch {
    /// Dense id, equal to the batch's position in the table.
    pub id: BatchId,
    /// Free-form brand name.
    pub brand: String,
    /// The PROVER that manufactured the batch.
    pub manufacturer: Address,
    /// Certificates issued against this batch, oldest first.
    pub certificate_ids: Vec<CertificateId>,
}

/// Dense table of vaccine batches.
#[derive(Debug, Clone, Default)]
pub struct VaccineBatchRegistry {
    batches: Vec<VaccineBatch>,
}

impl VaccineBatchRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next batch will receive.
    pub fn next_id(&self) -> BatchId {
        BatchId::new(self.batches.len() as u64)
    }

    /// Register a batch made by `manufacturer`.
    pub fn add(
        &mut self,
        entities: &EntityRegistry,
        brand: impl Into<String>,
        manufacturer: Address,
    ) -> Result<BatchId, LedgerError> {
        let entity = entities
            .get(&manufacturer)
            .map_err(|_| LedgerError::UnknownManufacturer { id: manufacturer })?;
        if entity.mode != Mode::Prover {
            return Err(LedgerError::WrongMode {
                id: manufacturer,
                expected: Mode::Prover,
                actual: entity.mode,
            });
        }

        let id = self.next_id();
        self.batches.push(VaccineBatch {
            id,
            brand: brand.into(),
            manufacturer,
            certificate_ids: Vec::new(),
        });
        Ok(id)
    }

    /// Look up a batch.
    pub fn get(&self, id: BatchId) -> Result<&VaccineBatch, LedgerError> {
        usize::try_from(id.value())
            .ok()
            .and_then(|idx| self.batches.get(idx))
            .ok_or_else(|| LedgerError::not_found(RecordKind::VaccineBatch, id))
    }

    /// Append a certificate id to a batch's history.
    ///
    /// The ledger resolves the batch before calling this, so a missing batch
    /// here means the tables are out of step.
    pub(crate) fn append_certificate(
        &mut self,
        batch_id: BatchId,
        certificate_id: CertificateId,
    ) -> Result<(), LedgerError> {
        let batch = usize::try_from(batch_id.value())
            .ok()
            .and_then(|idx| self.batches.get_mut(idx));
        match batch {
            Some(batch) => {
                batch.certificate_ids.push(certificate_id);
                Ok(())
            }
            None => {
                tracing::error!(
                    batch_id = %batch_id,
                    certificate_id = %certificate_id,
                    "certificate appended to a batch that does not exist"
                );
                Err(LedgerError::not_found(RecordKind::VaccineBatch, batch_id))
            }
        }
    }

    /// Insert a batch restored from a snapshot. The caller has validated it.
    pub(crate) fn push_restored(&mut self, batch: VaccineBatch) {
        self.batches.push(batch);
    }

    /// Batches in id order.
    pub fn iter(&self) -> impl Iterator<Item = &VaccineBatch> {
        self.batches.iter()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
