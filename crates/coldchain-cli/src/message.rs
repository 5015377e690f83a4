//! # Message Subcommand
//!
//! Renders the canonical attestation message for a certificate and its
//! digest, so an issuer can sign it with external tooling.

use anyhow::{Context, Result};
use clap::Args;
use coldchain_core::{Address, AttestationMessage, BatchId, CertificateStatus};

/// Arguments for the `coldchain message` subcommand.
#[derive(Args, Debug)]
pub struct MessageArgs {
    /// Issuer address (hex, `0x` optional).
    #[arg(long)]
    pub issuer: String,
    /// Prover address (hex, `0x` optional).
    #[arg(long)]
    pub prover: String,
    /// Vaccine batch id.
    #[arg(long)]
    pub batch: u64,
    /// Custody status, by name or position.
    #[arg(long)]
    pub status: String,
}

/// Build the message described by `args`.
pub fn build_message(args: &MessageArgs) -> Result<AttestationMessage> {
    let issuer = Address::from_hex(&args.issuer).context("invalid --issuer address")?;
    let prover = Address::from_hex(&args.prover).context("invalid --prover address")?;
    let status: CertificateStatus = args.status.parse().context("invalid --status")?;
    Ok(AttestationMessage::new(
        &issuer,
        &prover,
        BatchId::new(args.batch),
        status,
    ))
}

/// Execute the message subcommand.
pub fn run_message(args: &MessageArgs) -> Result<u8> {
    let message = build_message(args)?;
    println!("message: {message}");
    println!("digest: {}", message.digest());
    Ok(0)
}
