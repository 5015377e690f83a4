//! # coldchain-core: Foundational Types for the Cold-Chain Ledger
//!
//! This crate defines the type-system primitives shared by every other crate
//! in the workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `Address`, `BatchId` and
//!    `CertificateId` are distinct types. A batch id cannot be passed where a
//!    certificate id is expected.
//!
//! 2. **Closed role and status enums.** `Mode` and `CertificateStatus` are
//!    exhaustive enums. Role checks are equality tests on the tag, and
//!    out-of-range values can only appear at the parsing boundary, where they
//!    are rejected with `InvalidMode` / `InvalidStatus`.
//!
//! 3. **`AttestationMessage` newtype.** The canonical text an issuer signs can
//!    only be built through `AttestationMessage::new()`. Signing and
//!    verification therefore agree on the exact bytes by construction.
//!
//! 4. **`keccak256()` returns `MessageDigest`.** Digests are 32-byte newtypes,
//!    never bare arrays.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `coldchain-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod domain;
pub mod error;
pub mod identity;
pub mod message;
pub mod signature;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use digest::{keccak256, MessageDigest};
pub use domain::{CertificateStatus, Mode};
pub use error::{FormatError, LedgerError, RecordKind};
pub use identity::{decode_prefixed_hex, Address, BatchId, CertificateId};
pub use message::AttestationMessage;
pub use signature::SignatureBytes;
pub use temporal::Timestamp;
