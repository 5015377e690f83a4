//! # Ledger Events
//!
//! Every successful mutation appends exactly one event. Rejected calls
//! append nothing. Sequence numbers are dense and keep counting after the
//! log is drained.

use coldchain_core::{Address, BatchId, CertificateId, Mode, Timestamp};
use serde::{Deserialize, Serialize};

/// A change to the ledger tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// An entity was registered.
    EntityAdded { id: Address, mode: Mode },
    /// A vaccine batch was registered.
    VaccineBatchAdded { id: BatchId, manufacturer: Address },
    /// A certificate was issued.
    CertificateIssued {
        issuer: Address,
        prover: Address,
        certificate_id: CertificateId,
    },
}

/// An event with its position in the log and the time it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub sequence: u64,
    pub recorded_at: Timestamp,
    pub event: LedgerEvent,
}

/// Append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RecordedEvent>,
    next_sequence: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with the current time.
    pub fn record(&mut self, event: LedgerEvent) -> &RecordedEvent {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let index = self.events.len();
        self.events.push(RecordedEvent {
            sequence,
            recorded_at: Timestamp::now(),
            event,
        });
        &self.events[index]
    }

    /// Events not yet drained, oldest first.
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Remove and return all pending events.
    pub fn take(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.events)
    }
}
