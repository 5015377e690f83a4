//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared by the ledger crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every rejected ledger call maps to exactly one `LedgerError` variant and
//!   leaves ledger state unchanged.
//! - Role errors carry the offending identity together with the expected and
//!   actual mode.
//! - A signature that does not match is not an error. Verification queries
//!   return `false` instead.

use thiserror::Error;

use crate::domain::{CertificateStatus, Mode};
use crate::identity::{Address, BatchId};

/// The table a missing record was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The entity registry.
    Entity,
    /// The vaccine batch registry.
    VaccineBatch,
    /// The certificate store.
    Certificate,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Entity => "entity",
            Self::VaccineBatch => "vaccine batch",
            Self::Certificate => "certificate",
        };
        f.write_str(s)
    }
}

/// Errors returned by ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A referenced entity, batch, or certificate does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Which table was searched.
        kind: RecordKind,
        /// The identifier that was looked up, rendered for display.
        id: String,
    },

    /// An entity with this address is already registered.
    #[error("entity already registered: {id}")]
    DuplicateEntity {
        /// The address that was registered twice.
        id: Address,
    },

    /// A mode value outside ISSUER / PROVER / VERIFIER.
    #[error("invalid mode: {0:?}")]
    InvalidMode(String),

    /// A status value outside the five custody statuses.
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),

    /// A certificate party does not hold the mode its position requires.
    #[error("{party} {id} has mode {actual}, expected {expected}")]
    RoleViolation {
        /// Which side of the certificate was rejected ("issuer" or "prover").
        party: &'static str,
        /// The rejected entity.
        id: Address,
        /// The mode required for this position.
        expected: Mode,
        /// The mode the entity was registered with.
        actual: Mode,
    },

    /// A vaccine batch names a manufacturer that is not registered.
    #[error("unknown manufacturer: {id}")]
    UnknownManufacturer {
        /// The unregistered manufacturer address.
        id: Address,
    },

    /// A vaccine batch names a manufacturer with the wrong mode.
    #[error("manufacturer {id} has mode {actual}, expected {expected}")]
    WrongMode {
        /// The manufacturer address.
        id: Address,
        /// The required mode (PROVER).
        expected: Mode,
        /// The mode the entity was registered with.
        actual: Mode,
    },

    /// Sequential status ordering is enabled and the status does not follow
    /// the batch's latest certificate.
    #[error("batch {batch_id}: status {attempted} cannot follow {}", describe_previous(.previous))]
    OutOfOrderStatus {
        /// The batch being certified.
        batch_id: BatchId,
        /// The batch's latest recorded status, if any.
        previous: Option<CertificateStatus>,
        /// The status that was submitted.
        attempted: CertificateStatus,
    },

    /// Signature checking is required and the signature does not recover to
    /// the issuer.
    #[error("signature does not match issuer {issuer} for batch {batch_id}")]
    SignatureMismatch {
        /// The claimed issuer.
        issuer: Address,
        /// The batch being certified.
        batch_id: BatchId,
    },

    /// A persisted snapshot violates a ledger invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

fn describe_previous(previous: &Option<CertificateStatus>) -> String {
    match previous {
        Some(status) => status.to_string(),
        None => "no prior certificate".to_string(),
    }
}

impl LedgerError {
    /// Build a `NotFound` error for any displayable identifier.
    pub fn not_found(kind: RecordKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Error while parsing a textual identifier, digest, or byte string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Hex decoding failed.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// Decoded bytes had the wrong length.
    #[error("{what} must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// What was being parsed.
        what: &'static str,
        /// Required byte length.
        expected: usize,
        /// Decoded byte length.
        actual: usize,
    },
}
