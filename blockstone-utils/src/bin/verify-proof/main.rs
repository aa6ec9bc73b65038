//! Checks whether a transaction carries a company's proof.
//!
//! For usage please refer to the program help: `verify-proof --help`

use color_eyre::eyre::{eyre, Result};
use structopt::StructOpt;

use blockstone_utils::init_tracing;
use blockstone_verifier::{review::explorer_url, Config, Verifier};

mod args;
use self::args::Args;

/// `verify-proof` entrypoint.
///
/// Looks up the transaction using the configured providers (see [`Args`] for more
/// information), and prints its verification status and confirmation count.
/// Provider failures are reported as a `Verification Error` status, not an exit error.
#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> Result<()> {
    init_tracing();

    color_eyre::install()?;

    let args = Args::from_args();
    let proof = args
        .expected_proof()
        .ok_or_else(|| eyre!("a proof or the full company details are required"))?;

    let config = Config::load(args.config.clone())?;
    let verifier = Verifier::from_config(&config)?;

    tracing::info!(tx_id = %args.tx_id, %proof, "checking transaction");

    let status = verifier.status(&args.tx_id, &proof).await;

    println!("{status}");
    match status.confirmations() {
        Some(confirmations) => println!("confirmations: {confirmations}"),
        None => println!("confirmations: unknown"),
    }
    println!("explorer: {}", explorer_url(&args.tx_id));

    Ok(())
}
