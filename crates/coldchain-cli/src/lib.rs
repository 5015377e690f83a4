//! # coldchain-cli: CLI Tool for the Cold-Chain Ledger
//!
//! Provides the `coldchain` command-line interface.
//!
//! ## Subcommands
//!
//! - `coldchain message`: Render the canonical attestation message and its
//!   keccak-256 digest.
//! - `coldchain sign`: Sign a digest with a secp256k1 secret key.
//! - `coldchain verify`: Check a signature against a claimed signer.
//! - `coldchain replay`: Run a YAML script of ledger operations against a
//!   fresh ledger and print the resulting snapshot.
//!
//! ```bash
//! coldchain message --issuer 0x… --prover 0x… --batch 0 --status MANUFACTURED
//! coldchain --config ledger.yaml replay scenario.yaml --snapshot-out ledger.json
//! ```

pub mod config;
pub mod message;
pub mod replay;
pub mod signing;
