//! # Participant Modes and Custody Statuses
//!
//! The two closed enumerations of the ledger. Both are positional: the
//! numeric position is part of the external encoding (ISSUER = 0,
//! MANUFACTURED = 0, and so on) and both parse from either their
//! SCREAMING_SNAKE_CASE name or that position.
//!
//! ## Custody Progression
//!
//! ```text
//! MANUFACTURED ──▶ DELIVERING_INTERNATIONAL ──▶ STORED ──▶ DELIVERING_LOCAL ──▶ DELIVERED
//! ```
//!
//! The progression is advisory. The ledger records whatever status an
//! authorized issuer submits unless sequential ordering is switched on in
//! its configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

// ─── Mode ────────────────────────────────────────────────────────────

/// The immutable role of a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Mode {
    /// May issue certificates.
    Issuer = 0,
    /// May be the subject of certificates and manufacture batches.
    Prover = 1,
    /// Checks certificates; not otherwise constrained by the ledger.
    Verifier = 2,
}

impl Mode {
    /// All modes in positional order.
    pub const ALL: [Mode; 3] = [Mode::Issuer, Mode::Prover, Mode::Verifier];

    /// The positional encoding.
    pub fn position(&self) -> u8 {
        *self as u8
    }

    /// The canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issuer => "ISSUER",
            Self::Prover => "PROVER",
            Self::Verifier => "VERIFIER",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Mode {
    type Error = LedgerError;

    fn try_from(position: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(position))
            .copied()
            .ok_or_else(|| LedgerError::InvalidMode(position.to_string()))
    }
}

impl FromStr for Mode {
    type Err = LedgerError;

    /// Accepts the name in any letter case, or the decimal position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(position) = trimmed.parse::<u8>() {
            return Self::try_from(position);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LedgerError::InvalidMode(s.to_string()))
    }
}

// ─── CertificateStatus ───────────────────────────────────────────────

/// The custody stage a certificate attests to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CertificateStatus {
    /// Batch produced and inspected at the manufacturer.
    Manufactured = 0,
    /// Batch in transit between countries.
    DeliveringInternational = 1,
    /// Batch held in a storage facility.
    Stored = 2,
    /// Batch in transit to the point of care.
    DeliveringLocal = 3,
    /// Batch administered.
    Delivered = 4,
}

impl CertificateStatus {
    /// All statuses in custody order.
    pub const ALL: [CertificateStatus; 5] = [
        CertificateStatus::Manufactured,
        CertificateStatus::DeliveringInternational,
        CertificateStatus::Stored,
        CertificateStatus::DeliveringLocal,
        CertificateStatus::Delivered,
    ];

    /// The positional encoding.
    pub fn position(&self) -> u8 {
        *self as u8
    }

    /// The canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manufactured => "MANUFACTURED",
            Self::DeliveringInternational => "DELIVERING_INTERNATIONAL",
            Self::Stored => "STORED",
            Self::DeliveringLocal => "DELIVERING_LOCAL",
            Self::Delivered => "DELIVERED",
        }
    }

    /// The next stage in the custody progression, if any.
    pub fn next(&self) -> Option<CertificateStatus> {
        match self {
            Self::Manufactured => Some(Self::DeliveringInternational),
            Self::DeliveringInternational => Some(Self::Stored),
            Self::Stored => Some(Self::DeliveringLocal),
            Self::DeliveringLocal => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether this is the final custody stage.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Whether `self` may directly follow `previous` in the custody
    /// progression. A batch with no certificates may only start at
    /// MANUFACTURED.
    pub fn may_follow(&self, previous: Option<CertificateStatus>) -> bool {
        match previous {
            None => *self == Self::Manufactured,
            Some(prev) => prev.next() == Some(*self),
        }
    }

    /// Role labels `(issuer, prover)` used in the canonical attestation
    /// message for this stage.
    pub fn party_labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Manufactured => ("Inspector", "Manufacturer"),
            Self::DeliveringInternational => ("Inspector", "International Distributor"),
            Self::Stored => ("Inspector", "Storage Facility"),
            Self::DeliveringLocal => ("Inspector", "Local Distributor"),
            Self::Delivered => ("Immunizer", "Recipient"),
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for CertificateStatus {
    type Error = LedgerError;

    fn try_from(position: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(position))
            .copied()
            .ok_or_else(|| LedgerError::InvalidStatus(position.to_string()))
    }
}

impl FromStr for CertificateStatus {
    type Err = LedgerError;

    /// Accepts the name in any letter case, or the decimal position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(position) = trimmed.parse::<u8>() {
            return Self::try_from(position);
        }
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LedgerError::InvalidStatus(s.to_string()))
    }
}
