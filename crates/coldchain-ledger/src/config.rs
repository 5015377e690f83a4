//! # Ledger Configuration
//!
//! Optional strictness switches. The defaults record every certificate an
//! authorized issuer submits, in any status order and with any signature.
//!
//! ```yaml
//! status_order: sequential     # permissive | sequential
//! signature_check: required    # advisory | required
//! ```
//!
//! Missing keys take their default. Unknown keys are rejected.

use serde::{Deserialize, Serialize};

/// How a certificate's status relates to the batch's previous status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOrder {
    /// Any status may be recorded at any time.
    #[default]
    Permissive,
    /// A batch starts at MANUFACTURED and each certificate must carry the
    /// successor of the batch's latest status.
    Sequential,
}

/// What happens when a certificate's signature does not match its issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureCheck {
    /// Log the mismatch and record the certificate.
    #[default]
    Advisory,
    /// Reject issuance with `SignatureMismatch`.
    Required,
}

/// Ledger strictness settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    pub status_order: StatusOrder,
    pub signature_check: SignatureCheck,
}

impl LedgerConfig {
    /// Sequential ordering and required signatures.
    pub fn strict() -> Self {
        Self {
            status_order: StatusOrder::Sequential,
            signature_check: SignatureCheck::Required,
        }
    }
}
