//! Verification of BlockStone business proofs embedded in Bitcoin transactions.
//!
//! A company proves control of a payment address by broadcasting a small
//! transaction with a null-data (`OP_RETURN`) output. The output's payload
//! carries a proof string derived from the company's registration data:
//!
//! ```text
//! NL#12345678 blockst.one/acme
//! ```
//!
//! This crate answers "does transaction T contain proof string P?" by asking
//! third-party ledger-data providers for the transaction:
//!
//! 1. the [primary provider](provider::Esplora) is queried first,
//! 2. if it fails for any reason, the [secondary provider](provider::BlockCypher)
//!    is queried exactly once,
//! 3. both response shapes are normalized into a [`TransactionRecord`], and
//! 4. each null-data output's decoded payload is searched for the proof.
//!
//! Provider failures never escape [`Verifier::verify_proof`]: a transaction
//! that can't be fetched is reported as not verified. Callers that need to
//! show an error state use [`Verifier::status`] or [`Verifier::check_proof`].

#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod payload;
pub mod proof;
pub mod provider;
pub mod review;
pub mod transaction;
pub mod verifier;

pub use config::Config;
pub use error::{PayloadError, ProviderError};
pub use proof::ExpectedProof;
pub use transaction::{Output, OutputKind, Payload, TransactionId, TransactionRecord};
pub use verifier::{VerificationStatus, Verifier};
