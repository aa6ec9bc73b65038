//! Proof verification over a chain of ledger-data providers.

use std::fmt;

use tower::{Service, ServiceExt};
use tracing::instrument;

use crate::{
    config::Config,
    error::ProviderError,
    proof::ExpectedProof,
    provider::{self, ProviderChain},
    transaction::{TransactionId, TransactionRecord},
};


/// The verification status shown to users and administrators.
///
/// Each status check starts in a loading state, then settles on one of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The transaction carries the expected proof.
    Verified {
        /// The confirmation count, if the provider reported one.
        confirmations: Option<u64>,
    },

    /// The transaction was found, but doesn't carry the expected proof.
    ///
    /// The proof might still appear if a provider's data is incomplete.
    Unverified {
        /// The confirmation count, if the provider reported one.
        confirmations: Option<u64>,
    },

    /// No provider could supply the transaction.
    Error,
}

impl VerificationStatus {
    /// Is this a successful verification?
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Verified { .. })
    }

    /// Returns the observed confirmation count, if any.
    pub fn confirmations(&self) -> Option<u64> {
        match self {
            VerificationStatus::Verified { confirmations }
            | VerificationStatus::Unverified { confirmations } => *confirmations,
            VerificationStatus::Error => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerificationStatus::Verified { .. } => "Transaction Verified",
            VerificationStatus::Unverified { .. } => "Verification Pending",
            VerificationStatus::Error => "Verification Error",
        })
    }
}

/// Checks transactions for embedded proofs, using a provider chain `P`.
///
/// Every method performs independent network reads: there is no cache, and
/// repeating a call repeats the reads.
#[derive(Clone, Debug)]
pub struct Verifier<P> {
    provider: P,
}

impl Verifier<ProviderChain> {
    /// Creates a verifier using the canonical provider chain from `config`.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(provider::init(config)?))
    }
}

impl<P> Verifier<P>
where
    P: Service<TransactionId, Response = TransactionRecord, Error = ProviderError> + Clone,
{
    /// Creates a verifier that fetches transactions from `provider`.
    ///
    /// `provider` is usually a [`Fallback`](provider::Fallback) chain.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetches `tx_id` from the provider chain.
    ///
    /// With the canonical chain, the secondary provider is tried once if the
    /// primary provider fails.
    pub async fn fetch_transaction_with_fallback(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionRecord, ProviderError> {
        self.provider.clone().oneshot(tx_id.clone()).await
    }

    /// Does `tx_id` carry `expected_proof`?
    ///
    /// Returns `false` if the transaction doesn't carry the proof, or if no
    /// provider could supply it. Use [`Verifier::check_proof`] or
    /// [`Verifier::status`] to tell those cases apart.
    #[instrument(skip_all, fields(%tx_id, %expected_proof))]
    pub async fn verify_proof(&self, tx_id: &TransactionId, expected_proof: &ExpectedProof) -> bool {
        match self.check_proof(tx_id, expected_proof).await {
            Ok(verified) => verified,
            Err(error) => {
                tracing::info!(%error, "proof treated as unverified, transaction unavailable");
                false
            }
        }
    }

    /// Does `tx_id` carry `expected_proof`?
    ///
    /// # Errors
    ///
    /// Returns the provider error if no provider could supply the transaction.
    pub async fn check_proof(
        &self,
        tx_id: &TransactionId,
        expected_proof: &ExpectedProof,
    ) -> Result<bool, ProviderError> {
        let transaction = self.fetch_transaction_with_fallback(tx_id).await?;

        Ok(expected_proof.is_contained_in(&transaction))
    }

    /// Returns the confirmation count of `tx_id`, or `None` if it is unknown.
    ///
    /// `Some(0)` means the transaction was found, but hasn't been mined yet.
    #[instrument(skip_all, fields(%tx_id))]
    pub async fn confirmations(&self, tx_id: &TransactionId) -> Option<u64> {
        match self.fetch_transaction_with_fallback(tx_id).await {
            Ok(transaction) => transaction.confirmations,
            Err(error) => {
                tracing::info!(%error, "confirmations unknown, transaction unavailable");
                None
            }
        }
    }

    /// Returns the confirmation count of `tx_id`, or `0` if it is unknown.
    ///
    /// Prefer [`Verifier::confirmations`], which distinguishes unknown counts
    /// from unmined transactions.
    pub async fn get_confirmation_count(&self, tx_id: &TransactionId) -> u64 {
        self.confirmations(tx_id).await.unwrap_or(0)
    }

    /// Returns the verification status of `tx_id` for `expected_proof`.
    ///
    /// The proof and the confirmation count come from the same provider
    /// response, so the transaction is only fetched once.
    #[instrument(skip_all, fields(%tx_id, %expected_proof))]
    pub async fn status(
        &self,
        tx_id: &TransactionId,
        expected_proof: &ExpectedProof,
    ) -> VerificationStatus {
        let transaction = match self.fetch_transaction_with_fallback(tx_id).await {
            Ok(transaction) => transaction,
            Err(error) => {
                tracing::info!(%error, "verification status unavailable");
                return VerificationStatus::Error;
            }
        };

        let confirmations = transaction.confirmations;

        if expected_proof.is_contained_in(&transaction) {
            VerificationStatus::Verified { confirmations }
        } else {
            VerificationStatus::Unverified { confirmations }
        }
    }
}
