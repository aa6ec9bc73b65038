//! Errors that can occur when fetching or decoding transaction proofs.
//!
//! Provider errors always name the provider that failed, so that a fallback
//! failure can report both sides.

use thiserror::Error;

use crate::transaction::TransactionId;

/// An error returned by a ledger-data provider.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} is unavailable: {reason}")]
    Unavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} has no transaction {tx_id}")]
    TransactionNotFound {
        provider: &'static str,
        tx_id: TransactionId,
    },

    #[error("{provider} sent a malformed response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("all providers failed: primary: {primary}; secondary: {secondary}")]
    Exhausted {
        primary: Box<ProviderError>,
        secondary: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Returns the names of the providers that failed, in query order.
    pub fn providers(&self) -> Vec<&'static str> {
        match self {
            ProviderError::Unavailable { provider, .. }
            | ProviderError::TransactionNotFound { provider, .. }
            | ProviderError::MalformedResponse { provider, .. } => vec![*provider],
            ProviderError::Exhausted { primary, secondary } => {
                let mut providers = primary.providers();
                providers.extend(secondary.providers());
                providers
            }
        }
    }

    /// Is this error a missing transaction on every provider that was asked?
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::TransactionNotFound { .. } => true,
            ProviderError::Exhausted { primary, secondary } => {
                primary.is_not_found() && secondary.is_not_found()
            }
            _ => false,
        }
    }

    pub(crate) fn unavailable(provider: &'static str, reason: impl ToString) -> Self {
        ProviderError::Unavailable {
            provider,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(provider: &'static str, reason: impl ToString) -> Self {
        ProviderError::MalformedResponse {
            provider,
            reason: reason.to_string(),
        }
    }
}

/// An error converting between proof text and its byte-level payload.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PayloadError {
    #[error("payload is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("character {character:?} at index {index} does not fit in a single payload byte")]
    UnencodableCharacter { character: char, index: usize },
}
