//! # coldchain CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use coldchain_cli::config::load_config;
use coldchain_cli::message::{run_message, MessageArgs};
use coldchain_cli::replay::{run_replay, ReplayArgs};
use coldchain_cli::signing::{run_sign, run_verify, SignArgs, VerifyArgs};

/// Vaccine cold-chain certification ledger tooling.
///
/// Renders canonical attestation messages, signs and verifies them with
/// secp256k1 keys, and replays scripted ledger operations.
#[derive(Parser, Debug)]
#[command(name = "coldchain", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the ledger configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the canonical attestation message and its digest.
    Message(MessageArgs),

    /// Sign an attestation digest with a secp256k1 secret key.
    Sign(SignArgs),

    /// Check whether a signature over a digest belongs to a signer.
    Verify(VerifyArgs),

    /// Run a YAML script of ledger operations and print the snapshot.
    Replay(ReplayArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("coldchain CLI starting");

    let result = match cli.command {
        Commands::Message(args) => run_message(&args),
        Commands::Sign(args) => run_sign(&args),
        Commands::Verify(args) => run_verify(&args),
        Commands::Replay(args) => {
            load_config(cli.config.as_deref()).and_then(|config| run_replay(&args, config))
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
