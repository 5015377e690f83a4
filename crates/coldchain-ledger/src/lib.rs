//! # coldchain-ledger: Vaccine Cold-Chain Certification Ledger
//!
//! The ledger tracks vaccine batches from manufacture to administration.
//! Each custody transition is recorded as a certificate: a signed
//! attestation from an ISSUER about a PROVER and a batch.
//!
//! ## Tables
//!
//! - **Entities** (`entity.rs`): participants and their immutable `Mode`.
//! - **Vaccine batches** (`batch.rs`): brand, manufacturer, and the ids of
//!   the certificates issued against the batch, in issuance order.
//! - **Certificates** (`certificate.rs`): immutable attestations carrying
//!   copies of the issuer and prover records.
//!
//! All three are append-only. Ids are dense and start at 0 per table.
//!
//! ## Orchestration
//!
//! [`CertificateLedger`] owns the tables and enforces role eligibility.
//! Signatures are checked through the [`SignatureVerifier`] seam. By default a
//! mismatch is logged and the certificate is still recorded; see
//! [`LedgerConfig`] for the stricter modes.
//!
//! ## Security Invariant
//!
//! Every mutating call validates all of its inputs before touching any
//! table. A rejected call leaves the tables and the event log unchanged.
//!
//! ## Concurrency
//!
//! [`SharedLedger`] wraps a ledger in `Arc<parking_lot::RwLock<_>>`. Writes
//! are linearized by the write lock; reads run concurrently and return owned
//! copies.
//!
//! [`SignatureVerifier`]: coldchain_crypto::SignatureVerifier

pub mod batch;
pub mod certificate;
pub mod config;
pub mod entity;
pub mod event;
pub mod ledger;
pub mod shared;
pub mod snapshot;

pub use batch::{VaccineBatch, VaccineBatchRegistry};
pub use certificate::{Certificate, CertificateStore};
pub use config::{LedgerConfig, SignatureCheck, StatusOrder};
pub use entity::{Entity, EntityRegistry};
pub use event::{EventLog, LedgerEvent, RecordedEvent};
pub use ledger::CertificateLedger;
pub use shared::SharedLedger;
pub use snapshot::LedgerSnapshot;
