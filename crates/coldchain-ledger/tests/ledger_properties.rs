//! # Ledger Properties
//!
//! Property tests over arbitrary operation sequences, plus concurrent
//! writers through `SharedLedger`.

use std::collections::BTreeSet;
use std::thread;

use coldchain_core::{
    AttestationMessage, Address, BatchId, CertificateId, CertificateStatus, LedgerError,
    MessageDigest, Mode, SignatureBytes,
};
use coldchain_crypto::{Secp256k1KeyPair, SignatureVerifier};
use coldchain_ledger::{CertificateLedger, LedgerConfig, SharedLedger};
use proptest::prelude::*;

/// Accepts every signature. Keeps property runs independent of ECDSA cost.
struct AcceptAll;

impl SignatureVerifier for AcceptAll {
    fn verify(&self, _: &MessageDigest, _: &Address, _: &[u8]) -> bool {
        true
    }
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    (0u8..3).prop_map(|p| Mode::try_from(p).unwrap())
}

fn status_strategy() -> impl Strategy<Value = CertificateStatus> {
    (0u8..5).prop_map(|p| CertificateStatus::try_from(p).unwrap())
}

proptest! {
    /// Registering the same address twice always fails, whatever the modes,
    /// and the first registration wins.
    #[test]
    fn duplicate_entities_rejected(
        ids in prop::collection::vec(0u8..8, 1..24),
        modes in prop::collection::vec(mode_strategy(), 24),
    ) {
        let mut ledger = CertificateLedger::new();
        let mut first_mode = std::collections::BTreeMap::new();
        for (i, b) in ids.iter().enumerate() {
            let addr = Address::from_bytes([*b; 20]);
            let result = ledger.add_entity(addr, modes[i]);
            match first_mode.get(&addr) {
                None => {
                    prop_assert!(result.is_ok());
                    first_mode.insert(addr, modes[i]);
                }
                Some(_) => {
                    prop_assert_eq!(result.unwrap_err(), LedgerError::DuplicateEntity { id: addr });
                }
            }
        }
        for (addr, mode) in &first_mode {
            prop_assert_eq!(ledger.get_entity(addr).unwrap().mode, *mode);
        }
        prop_assert_eq!(ledger.events().len(), first_mode.len());
    }

    /// Batch and certificate ids are dense from 0 regardless of how
    /// issuance is spread across batches, and every certificate appears in
    /// exactly its own batch's history.
    #[test]
    fn ids_dense_and_histories_partition(
        batch_count in 1usize..6,
        picks in prop::collection::vec((0usize..6, status_strategy()), 0..40),
    ) {
        let issuer = Address::from_bytes([1; 20]);
        let prover = Address::from_bytes([2; 20]);
        let mut ledger = CertificateLedger::with_verifier(LedgerConfig::default(), AcceptAll);
        ledger.add_entity(issuer, Mode::Issuer).unwrap();
        ledger.add_entity(prover, Mode::Prover).unwrap();

        for i in 0..batch_count {
            prop_assert_eq!(ledger.add_vaccine_batch("brand", prover).unwrap(), BatchId::new(i as u64));
        }

        let mut expected: Vec<Vec<CertificateId>> = vec![Vec::new(); batch_count];
        for (n, (pick, status)) in picks.iter().enumerate() {
            let batch = pick % batch_count;
            let id = ledger
                .issue_certificate(&issuer, &prover, *status, BatchId::new(batch as u64), SignatureBytes::default())
                .unwrap();
            prop_assert_eq!(id, CertificateId::new(n as u64));
            expected[batch].push(id);
        }

        for (i, ids) in expected.iter().enumerate() {
            prop_assert_eq!(&ledger.get_batch(BatchId::new(i as u64)).unwrap().certificate_ids, ids);
        }
        prop_assert!(ledger.get_certificate(CertificateId::new(picks.len() as u64)).is_err());
    }

    /// Snapshots of arbitrary ledgers restore to identical tables.
    #[test]
    fn snapshot_restore_identity(
        statuses in prop::collection::vec(status_strategy(), 0..12),
    ) {
        let issuer = Address::from_bytes([1; 20]);
        let prover = Address::from_bytes([2; 20]);
        let mut ledger = CertificateLedger::with_verifier(LedgerConfig::default(), AcceptAll);
        ledger.add_entity(issuer, Mode::Issuer).unwrap();
        ledger.add_entity(prover, Mode::Prover).unwrap();
        let batch = ledger.add_vaccine_batch("brand", prover).unwrap();
        for s in statuses {
            ledger.issue_certificate(&issuer, &prover, s, batch, SignatureBytes::default()).unwrap();
        }

        let snapshot = ledger.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed = serde_json::from_str(&json).unwrap();
        let restored = CertificateLedger::restore(LedgerConfig::default(), AcceptAll, parsed).unwrap();
        prop_assert_eq!(restored.snapshot(), snapshot);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Reads are pure: the same query twice, with no write in between,
    /// answers the same way on both the plain and the shared handle. A
    /// signature with one byte of `r || s` altered never matches its issuer.
    #[test]
    fn reads_repeat_and_altered_signatures_fail(
        issued in prop::collection::vec((0usize..3, status_strategy()), 1..8),
        flip_at in 0usize..64,
        mask in 1u8..=255,
    ) {
        let issuer = Secp256k1KeyPair::from_secret_bytes(&[0x31; 32]).unwrap();
        let prover = Secp256k1KeyPair::from_secret_bytes(&[0x32; 32]).unwrap();
        let (issuer_addr, prover_addr) = (issuer.address(), prover.address());

        let mut ledger = CertificateLedger::new();
        ledger.add_entity(issuer_addr, Mode::Issuer).unwrap();
        ledger.add_entity(prover_addr, Mode::Prover).unwrap();
        let batches: Vec<BatchId> = (0..3)
            .map(|_| ledger.add_vaccine_batch("brand", prover_addr).unwrap())
            .collect();

        for (pick, status) in &issued {
            let batch = batches[*pick];
            let digest = AttestationMessage::new(&issuer_addr, &prover_addr, batch, *status).digest();
            let signature = issuer.sign_digest(&digest).unwrap();
            ledger.issue_certificate(&issuer_addr, &prover_addr, *status, batch, signature).unwrap();
        }

        let (pick, status) = issued[0];
        let digest = AttestationMessage::new(&issuer_addr, &prover_addr, batches[pick], status).digest();
        let mut altered = issuer.sign_digest(&digest).unwrap().as_bytes().to_vec();
        altered[flip_at] ^= mask;
        let altered_id = ledger
            .issue_certificate(&issuer_addr, &prover_addr, status, batches[pick], altered)
            .unwrap();
        prop_assert!(!ledger.is_matching_signature(&digest, altered_id, &issuer_addr).unwrap());
        prop_assert!(!ledger.verify_certificate(altered_id).unwrap());

        for addr in [issuer_addr, prover_addr, Address::from_bytes([0x99; 20])] {
            prop_assert_eq!(ledger.get_entity(&addr), ledger.get_entity(&addr));
        }
        for id in batches.iter().copied().chain([BatchId::new(3)]) {
            prop_assert_eq!(ledger.get_batch(id), ledger.get_batch(id));
        }
        let certificate_count = issued.len() as u64 + 1;
        for id in (0..=certificate_count).map(CertificateId::new) {
            prop_assert_eq!(ledger.get_certificate(id), ledger.get_certificate(id));
            let first = ledger.is_matching_signature(&digest, id, &issuer_addr);
            prop_assert_eq!(&first, &ledger.is_matching_signature(&digest, id, &issuer_addr));
        }
        prop_assert!(ledger.is_matching_signature(&digest, CertificateId::new(0), &issuer_addr).unwrap());

        let shared = SharedLedger::new(ledger);
        for addr in [issuer_addr, prover_addr] {
            prop_assert_eq!(shared.get_entity(&addr), shared.get_entity(&addr));
        }
        for id in batches.iter().copied() {
            prop_assert_eq!(shared.get_batch(id), shared.get_batch(id));
        }
        for id in (0..=certificate_count).map(CertificateId::new) {
            prop_assert_eq!(shared.get_certificate(id), shared.get_certificate(id));
            prop_assert_eq!(
                shared.is_matching_signature(&digest, id, &issuer_addr),
                shared.is_matching_signature(&digest, id, &issuer_addr)
            );
        }
        prop_assert!(!shared.is_matching_signature(&digest, altered_id, &issuer_addr).unwrap());
    }
}

#[test]
fn concurrent_writers_get_dense_ids() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let issuer = Address::from_bytes([1; 20]);
    let prover = Address::from_bytes([2; 20]);
    let shared = SharedLedger::new(CertificateLedger::with_verifier(
        LedgerConfig::default(),
        AcceptAll,
    ));
    shared.add_entity(issuer, Mode::Issuer).unwrap();
    shared.add_entity(prover, Mode::Prover).unwrap();
    let batch = shared.add_vaccine_batch("brand", prover).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let ledger = shared.clone();
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|_| {
                        ledger
                            .issue_certificate(
                                &issuer,
                                &prover,
                                CertificateStatus::Stored,
                                batch,
                                SignatureBytes::default(),
                            )
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id.value()), "id {id} issued twice");
        }
    }
    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(ids, (0..total).collect::<BTreeSet<_>>());

    let history: Vec<u64> = shared
        .get_batch(batch)
        .unwrap()
        .certificate_ids
        .iter()
        .map(|id| id.value())
        .collect();
    assert_eq!(history, (0..total).collect::<Vec<_>>());
}

#[test]
fn tampered_json_snapshot_rejected() {
    let issuer = Address::from_bytes([1; 20]);
    let prover = Address::from_bytes([2; 20]);
    let mut ledger = CertificateLedger::new();
    ledger.add_entity(issuer, Mode::Issuer).unwrap();
    ledger.add_entity(prover, Mode::Prover).unwrap();
    let batch = ledger.add_vaccine_batch("brand", prover).unwrap();
    ledger
        .issue_certificate(&issuer, &prover, CertificateStatus::Manufactured, batch, SignatureBytes::default())
        .unwrap();

    let mut json = serde_json::to_value(ledger.snapshot()).unwrap();
    json["certificates"][0]["prover"]["mode"] = serde_json::json!("ISSUER");
    let tampered = serde_json::from_value(json).unwrap();
    let err = CertificateLedger::restore(
        LedgerConfig::default(),
        coldchain_crypto::RecoveringVerifier,
        tampered,
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSnapshot(_)));
}
