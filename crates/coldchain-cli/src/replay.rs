//! # Replay Subcommand
//!
//! Runs a YAML script of ledger operations against a fresh ledger, or one
//! restored with `--snapshot-in`, and prints one line per step followed by
//! the JSON snapshot of the final tables.
//!
//! ## Script Format
//!
//! ```yaml
//! - op: add_entity
//!   key: "0x4c08…"            # or `id: 0x…` for an address without a key
//!   mode: ISSUER
//! - op: add_vaccine_batch
//!   brand: Pfizer-BioNTech
//!   manufacturer: "0x…"
//! - op: issue_certificate
//!   issuer: "0x…"
//!   prover: "0x…"
//!   status: MANUFACTURED
//!   batch: 0
//!   signer_key: "0x4c08…"     # or `signature: 0x…`
//! - op: is_matching_signature
//!   certificate: 0
//!   signer: "0x…"
//!   digest: "0x…"             # optional, defaults to the certificate's own digest
//! ```
//!
//! Modes and statuses are parsed by name or position, so a bad value fails
//! with `InvalidMode` / `InvalidStatus` from the ledger's own parser.
//!
//! Without `--keep-going` the first failing step aborts the replay. With it,
//! failures are reported and the exit code is 1 at the end.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use coldchain_core::{
    Address, AttestationMessage, BatchId, CertificateId, CertificateStatus, MessageDigest, Mode,
    SignatureBytes,
};
use coldchain_crypto::{RecoveringVerifier, Secp256k1KeyPair};
use coldchain_ledger::{CertificateLedger, LedgerConfig, LedgerSnapshot};
use serde::Deserialize;

/// Arguments for the `coldchain replay` subcommand.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to the YAML operation script.
    pub script: PathBuf,
    /// Start from a snapshot written by an earlier replay instead of an
    /// empty ledger.
    #[arg(long)]
    pub snapshot_in: Option<PathBuf>,
    /// Write the final snapshot as JSON to this path.
    #[arg(long)]
    pub snapshot_out: Option<PathBuf>,
    /// Report failing steps and continue instead of stopping.
    #[arg(long)]
    pub keep_going: bool,
}

/// One scripted ledger operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayStep {
    AddEntity {
        #[serde(default)]
        id: Option<Address>,
        #[serde(default)]
        key: Option<String>,
        mode: String,
    },
    AddVaccineBatch {
        brand: String,
        manufacturer: Address,
    },
    IssueCertificate {
        issuer: Address,
        prover: Address,
        status: String,
        batch: BatchId,
        #[serde(default)]
        signature: Option<SignatureBytes>,
        #[serde(default)]
        signer_key: Option<String>,
    },
    IsMatchingSignature {
        certificate: CertificateId,
        signer: Address,
        #[serde(default)]
        digest: Option<MessageDigest>,
    },
}

/// Result of running a script.
#[derive(Debug)]
pub struct ReplayReport {
    /// One line per step, in order.
    pub lines: Vec<String>,
    /// Number of steps that failed.
    pub failures: usize,
    /// Tables after the last step.
    pub snapshot: LedgerSnapshot,
}

/// Parse a script from YAML text.
pub fn parse_script(yaml: &str) -> Result<Vec<ReplayStep>> {
    serde_yaml::from_str(yaml).context("invalid replay script")
}

/// Run `steps` against `ledger`.
pub fn execute(
    mut ledger: CertificateLedger,
    steps: &[ReplayStep],
    keep_going: bool,
) -> Result<ReplayReport> {
    let mut lines = Vec::with_capacity(steps.len());
    let mut failures = 0;

    for (index, step) in steps.iter().enumerate() {
        let number = index + 1;
        match apply(&mut ledger, step) {
            Ok(line) => lines.push(format!("step {number}: {line}")),
            Err(e) if keep_going => {
                tracing::warn!(step = number, error = %format!("{e:#}"), "replay step failed");
                lines.push(format!("step {number}: error: {e:#}"));
                failures += 1;
            }
            Err(e) => return Err(e.context(format!("replay step {number} failed"))),
        }
    }

    Ok(ReplayReport {
        lines,
        failures,
        snapshot: ledger.snapshot(),
    })
}

fn apply(ledger: &mut CertificateLedger, step: &ReplayStep) -> Result<String> {
    match step {
        ReplayStep::AddEntity { id, key, mode } => {
            let mode: Mode = mode.parse()?;
            let id = match (id, key) {
                (Some(id), None) => *id,
                (None, Some(key)) => Secp256k1KeyPair::from_secret_hex(key)
                    .context("invalid entity key")?
                    .address(),
                _ => bail!("add_entity needs exactly one of `id` or `key`"),
            };
            let entity = ledger.add_entity(id, mode)?;
            Ok(format!("entity {} added as {}", entity.id, entity.mode))
        }

        ReplayStep::AddVaccineBatch {
            brand,
            manufacturer,
        } => {
            let id = ledger.add_vaccine_batch(brand.as_str(), *manufacturer)?;
            Ok(format!("vaccine batch {id} added ({brand})"))
        }

        ReplayStep::IssueCertificate {
            issuer,
            prover,
            status,
            batch,
            signature,
            signer_key,
        } => {
            let status: CertificateStatus = status.parse()?;
            let signature = match (signature, signer_key) {
                (Some(sig), None) => sig.clone(),
                (None, Some(key)) => {
                    let key = Secp256k1KeyPair::from_secret_hex(key).context("invalid signer_key")?;
                    let digest = AttestationMessage::new(issuer, prover, *batch, status).digest();
                    key.sign_digest(&digest)?
                }
                _ => bail!("issue_certificate needs exactly one of `signature` or `signer_key`"),
            };
            let id = ledger.issue_certificate(issuer, prover, status, *batch, signature)?;
            let matches = ledger.verify_certificate(id)?;
            Ok(format!(
                "certificate {id} issued for batch {batch} at {status} (signature matches issuer: {matches})"
            ))
        }

        ReplayStep::IsMatchingSignature {
            certificate,
            signer,
            digest,
        } => {
            let digest = match digest {
                Some(d) => *d,
                None => ledger.attestation_message(*certificate)?.digest(),
            };
            let matches = ledger.is_matching_signature(&digest, *certificate, signer)?;
            Ok(format!("certificate {certificate} signed by {signer}: {matches}"))
        }
    }
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs, config: LedgerConfig) -> Result<u8> {
    let script = read_script(&args.script)?;
    let ledger = match &args.snapshot_in {
        Some(path) => load_snapshot(path, config)?,
        None => CertificateLedger::with_config(config),
    };
    let report = execute(ledger, &script, args.keep_going)?;

    for line in &report.lines {
        println!("{line}");
    }
    let json = serde_json::to_string_pretty(&report.snapshot).context("failed to serialize snapshot")?;
    println!("{json}");

    if let Some(out) = &args.snapshot_out {
        std::fs::write(out, format!("{json}\n"))
            .with_context(|| format!("failed to write snapshot: {}", out.display()))?;
        tracing::info!(path = %out.display(), "snapshot written");
    }

    Ok(if report.failures == 0 { 0 } else { 1 })
}

fn read_script(path: &Path) -> Result<Vec<ReplayStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read replay script: {}", path.display()))?;
    parse_script(&content).with_context(|| format!("in {}", path.display()))
}

/// Load a snapshot previously written with `--snapshot-out` and rebuild the
/// ledger from it.
pub fn load_snapshot(path: &Path, config: LedgerConfig) -> Result<CertificateLedger> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("invalid snapshot JSON in {}", path.display()))?;
    CertificateLedger::restore(config, RecoveringVerifier, snapshot)
        .with_context(|| format!("snapshot {} failed validation", path.display()))
}
