//! # Sign and Verify Subcommands
//!
//! secp256k1 signing of attestation digests and signer verification.
//!
//! Signatures use the personal-message prefix and are printed as 65-byte
//! `r || s || v` hex with `v` in {27, 28}.

use anyhow::{Context, Result};
use clap::Args;
use coldchain_core::{Address, MessageDigest, SignatureBytes};
use coldchain_crypto::{RecoveringVerifier, Secp256k1KeyPair, SignatureVerifier};

/// Arguments for the `coldchain sign` subcommand.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// 32-byte secp256k1 secret key (hex, `0x` optional).
    #[arg(long)]
    pub secret_key: String,
    /// 32-byte attestation digest (hex, `0x` optional).
    #[arg(long)]
    pub digest: String,
}

/// Arguments for the `coldchain verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// 32-byte attestation digest (hex, `0x` optional).
    #[arg(long)]
    pub digest: String,
    /// Claimed signer address.
    #[arg(long)]
    pub signer: String,
    /// Signature bytes (hex, `0x` optional).
    #[arg(long)]
    pub signature: String,
}

/// Sign `digest` with the key in `args`. Returns the signer address and
/// signature.
pub fn sign(args: &SignArgs) -> Result<(Address, SignatureBytes)> {
    let key = Secp256k1KeyPair::from_secret_hex(&args.secret_key).context("invalid --secret-key")?;
    let digest = MessageDigest::from_hex(&args.digest).context("invalid --digest")?;
    let signature = key.sign_digest(&digest).context("signing failed")?;
    Ok((key.address(), signature))
}

/// Whether the signature in `args` was produced by the claimed signer.
pub fn verify(args: &VerifyArgs) -> Result<bool> {
    let digest = MessageDigest::from_hex(&args.digest).context("invalid --digest")?;
    let signer = Address::from_hex(&args.signer).context("invalid --signer address")?;
    let signature = SignatureBytes::from_hex(&args.signature).context("invalid --signature")?;
    Ok(RecoveringVerifier.verify(&digest, &signer, signature.as_bytes()))
}

/// Execute the sign subcommand.
pub fn run_sign(args: &SignArgs) -> Result<u8> {
    let (address, signature) = sign(args)?;
    println!("signer: {address}");
    println!("signature: {signature}");
    Ok(0)
}

/// Execute the verify subcommand. A mismatch is a normal result and exits 0.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let matches = verify(args)?;
    println!("{matches}");
    Ok(0)
}
