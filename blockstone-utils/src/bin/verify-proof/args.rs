//! verify-proof arguments
//!
//! For usage please refer to the program help: `verify-proof --help`

#![deny(missing_docs)]
#![allow(clippy::try_err)]

use std::path::PathBuf;

use structopt::StructOpt;

use blockstone_verifier::{ExpectedProof, TransactionId};

/// verify-proof arguments
#[derive(Clone, Debug, Eq, PartialEq, StructOpt)]
pub struct Args {
    /// Path to a TOML configuration file.
    ///
    /// `BLOCKSTONE_SECTION__KEY` environment variables override the file.
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// The id of the transaction that should carry the proof.
    #[structopt(short, long)]
    pub tx_id: TransactionId,

    /// The exact proof string to look for.
    #[structopt(
        short,
        long,
        conflicts_with_all = &["country", "registration-number", "name"],
        required_unless_one = &["country", "registration-number", "name"]
    )]
    pub proof: Option<String>,

    /// The company's country code, used to derive the proof.
    #[structopt(long, requires_all = &["registration-number", "name"])]
    pub country: Option<String>,

    /// The company's registration number, used to derive the proof.
    #[structopt(long, requires_all = &["country", "name"])]
    pub registration_number: Option<String>,

    /// The company's name, used to derive the proof.
    #[structopt(long, requires_all = &["country", "registration-number"])]
    pub name: Option<String>,
}

impl Args {
    /// Returns the proof given on the command line, or derives it from the company details.
    pub fn expected_proof(&self) -> Option<ExpectedProof> {
        if let Some(proof) = &self.proof {
            return Some(ExpectedProof::new(proof.as_str()));
        }

        match (&self.country, &self.registration_number, &self.name) {
            (Some(country), Some(registration_number), Some(name)) => Some(
                ExpectedProof::for_company(country, registration_number, name),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX_ID: &str = "822b33ad87c148a0a20a5ba7cd5ebcaa68d36a18e7aad165554903f52ca82757";

    #[test]
    fn explicit_proof() {
        let args = Args::from_iter_safe(["verify-proof", "--tx-id", TX_ID, "--proof", "NL#1 blockst.one/a"])
            .expect("arguments are valid");

        assert_eq!(args.tx_id.as_str(), TX_ID);
        assert_eq!(args.config, None);
        assert_eq!(
            args.expected_proof(),
            Some(ExpectedProof::new("NL#1 blockst.one/a"))
        );
    }

    #[test]
    fn derived_proof() {
        let args = Args::from_iter_safe([
            "verify-proof",
            "-c",
            "blockstone.toml",
            "-t",
            TX_ID,
            "--country",
            "NL",
            "--registration-number",
            "12345678",
            "--name",
            "Acme B.V.",
        ])
        .expect("arguments are valid");

        assert_eq!(args.config, Some(PathBuf::from("blockstone.toml")));
        assert_eq!(
            args.expected_proof().map(|proof| proof.to_string()),
            Some("NL#12345678 blockst.one/acmebv".to_string())
        );
    }

    #[test]
    fn proof_source_is_required() {
        assert!(Args::from_iter_safe(["verify-proof", "--tx-id", TX_ID]).is_err());
        assert!(Args::from_iter_safe(["verify-proof", "--tx-id", TX_ID, "--country", "NL"]).is_err());
        assert!(Args::from_iter_safe([
            "verify-proof",
            "--tx-id",
            TX_ID,
            "--registration-number",
            "12345678",
            "--name",
            "Acme",
        ])
        .is_err());
        assert!(Args::from_iter_safe(["verify-proof", "--tx-id", TX_ID, "--proof", "x"]).is_ok());
        assert!(Args::from_iter_safe([
            "verify-proof",
            "--tx-id",
            TX_ID,
            "--proof",
            "x",
            "--name",
            "Acme",
        ])
        .is_err());
    }
}
