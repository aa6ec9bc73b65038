//! Administrator review of company verification submissions.
//!
//! A review derives the company's expected proof, checks its submitted
//! transaction, and suggests a new status. Reviews never write to the
//! company row-store: applying the suggested status is the caller's decision.

use serde::{Deserialize, Serialize};
use tower::Service;
use tracing::instrument;

use crate::{
    error::ProviderError,
    proof::ExpectedProof,
    transaction::{TransactionId, TransactionRecord},
    verifier::{VerificationStatus, Verifier},
};

/// The public block explorer used for transaction links.
pub const EXPLORER_TX_URL: &str = "https://mempool.space/tx";

/// The verification status stored with each company.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Waiting for a matching transaction, or for an administrator decision.
    #[default]
    Pending,

    /// The company's transaction carried its proof.
    Verified,

    /// An administrator rejected the submission.
    Rejected,
}

/// A company verification submission, as stored in the row-store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub registration_number: String,
    pub country: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bitcoin_address: Option<String>,
    pub verification_status: SubmissionStatus,
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    pub created_at: String,
    pub updated_at: String,
}

impl Company {
    /// Returns the proof this company was asked to embed.
    pub fn expected_proof(&self) -> ExpectedProof {
        ExpectedProof::for_company(&self.country, &self.registration_number, &self.name)
    }

    /// Returns the explorer link for the submitted transaction, if there is one.
    pub fn explorer_url(&self) -> Option<String> {
        self.transaction_id.as_ref().map(explorer_url)
    }
}

/// Returns the public explorer link for `tx_id`.
pub fn explorer_url(tx_id: &TransactionId) -> String {
    format!("{EXPLORER_TX_URL}/{tx_id}")
}

/// The result of reviewing a submission.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The company hasn't submitted a transaction id yet.
    MissingTransaction,

    /// The transaction carries the company's proof.
    Verified { confirmations: Option<u64> },

    /// The transaction was found, but doesn't carry the company's proof.
    Mismatch { confirmations: Option<u64> },

    /// No provider could supply the transaction.
    ProviderFailure,
}

impl ReviewOutcome {
    /// Returns the status an administrator would usually apply.
    ///
    /// Only a verified proof changes the status. Rejection is always a manual
    /// decision, because a mismatch can be a typo in the submitted id.
    pub fn suggested_status(&self) -> SubmissionStatus {
        match self {
            ReviewOutcome::Verified { .. } => SubmissionStatus::Verified,
            ReviewOutcome::MissingTransaction
            | ReviewOutcome::Mismatch { .. }
            | ReviewOutcome::ProviderFailure => SubmissionStatus::Pending,
        }
    }
}

impl From<VerificationStatus> for ReviewOutcome {
    fn from(status: VerificationStatus) -> Self {
        match status {
            VerificationStatus::Verified { confirmations } => ReviewOutcome::Verified { confirmations },
            VerificationStatus::Unverified { confirmations } => {
                ReviewOutcome::Mismatch { confirmations }
            }
            VerificationStatus::Error => ReviewOutcome::ProviderFailure,
        }
    }
}

/// Reviews `company`'s submitted transaction using `verifier`.
#[instrument(skip_all, fields(company.id = %company.id))]
pub async fn review<P>(verifier: &Verifier<P>, company: &Company) -> ReviewOutcome
where
    P: Service<TransactionId, Response = TransactionRecord, Error = ProviderError> + Clone,
{
    let Some(tx_id) = &company.transaction_id else {
        return ReviewOutcome::MissingTransaction;
    };

    let outcome = ReviewOutcome::from(verifier.status(tx_id, &company.expected_proof()).await);

    tracing::debug!(?outcome, "reviewed company submission");

    outcome
}

#[cfg(test)]
mod tests {
    use tower::service_fn;

    use blockstone_test::vectors::{ACME_PROOF, ACME_TX_ID};

    use crate::{
        provider::{BoxProvider, Fallback},
        transaction::{Output, Payload},
    };

    use super::*;

    fn acme(transaction_id: Option<&str>) -> Company {
        Company {
            id: "0b6c6f1e-4f39-4d5c-9d0e-3c1e2f6c9a11".to_string(),
            name: "Acme".to_string(),
            registration_number: "12345678".to_string(),
            country: "NL".to_string(),
            website: None,
            description: None,
            bitcoin_address: None,
            verification_status: SubmissionStatus::Pending,
            transaction_id: transaction_id.map(TransactionId::new),
            created_at: "2024-06-21T10:00:00Z".to_string(),
            updated_at: "2024-06-21T10:00:00Z".to_string(),
        }
    }

    fn verifier(
        response: Result<TransactionRecord, ProviderError>,
    ) -> Verifier<Fallback<BoxProvider, BoxProvider>> {
        let primary = service_fn(move |_tx_id: TransactionId| {
            let response = response.clone();
            async move { response }
        });
        let secondary = service_fn(|_tx_id: TransactionId| async {
            Err::<TransactionRecord, _>(ProviderError::Unavailable {
                provider: "secondary",
                reason: "offline".to_string(),
            })
        });

        Verifier::new(Fallback::new(
            BoxProvider::new(primary),
            BoxProvider::new(secondary),
        ))
    }

    #[tokio::test]
    async fn review_outcomes() {
        let _init_guard = blockstone_test::init();

        let matching = verifier(Ok(TransactionRecord {
            outputs: vec![Output::null_data(Payload::Text(ACME_PROOF.to_string()))],
            confirmations: Some(3),
        }));

        let outcome = review(&matching, &acme(Some(ACME_TX_ID))).await;
        assert_eq!(
            outcome,
            ReviewOutcome::Verified {
                confirmations: Some(3)
            }
        );
        assert_eq!(outcome.suggested_status(), SubmissionStatus::Verified);

        let outcome = review(&matching, &acme(None)).await;
        assert_eq!(outcome, ReviewOutcome::MissingTransaction);
        assert_eq!(outcome.suggested_status(), SubmissionStatus::Pending);

        let empty = verifier(Ok(TransactionRecord::default()));
        let outcome = review(&empty, &acme(Some(ACME_TX_ID))).await;
        assert_eq!(outcome, ReviewOutcome::Mismatch { confirmations: None });
        assert_eq!(outcome.suggested_status(), SubmissionStatus::Pending);

        let failing = verifier(Err(ProviderError::Unavailable {
            provider: "primary",
            reason: "offline".to_string(),
        }));
        let outcome = review(&failing, &acme(Some(ACME_TX_ID))).await;
        assert_eq!(outcome, ReviewOutcome::ProviderFailure);
        assert_eq!(outcome.suggested_status(), SubmissionStatus::Pending);
    }

    #[test]
    fn company_rows() {
        let _init_guard = blockstone_test::init();

        let row = serde_json::json!({
            "id": "0b6c6f1e-4f39-4d5c-9d0e-3c1e2f6c9a11",
            "name": "Acme",
            "registration_number": "12345678",
            "country": "NL",
            "website": "https://acme.example",
            "verification_status": "pending",
            "transaction_id": ACME_TX_ID,
            "created_at": "2024-06-21T10:00:00Z",
            "updated_at": "2024-06-21T10:00:00Z",
        });

        let company: Company = serde_json::from_value(row).expect("row has all required columns");

        assert_eq!(company.verification_status, SubmissionStatus::Pending);
        assert_eq!(company.expected_proof().as_str(), ACME_PROOF);
        assert_eq!(company.description, None);
        assert_eq!(
            company.explorer_url().as_deref(),
            Some(format!("https://mempool.space/tx/{ACME_TX_ID}").as_str())
        );

        assert_eq!(
            serde_json::to_value(SubmissionStatus::Rejected).unwrap(),
            serde_json::json!("rejected")
        );
    }
}
