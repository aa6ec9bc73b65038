//! The primary provider: an Esplora-compatible block explorer API.
//!
//! Esplora shows null-data outputs as script assembly, which is kept as a
//! [`Payload::Script`]. Esplora doesn't report confirmation counts directly:
//! they are computed from the transaction's block height and the current tip
//! height.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;
use tower::Service;
use tracing::instrument;

use crate::{
    error::ProviderError,
    transaction::{Output, Payload, TransactionId, TransactionRecord},
};

use super::{base_url, fetch_body, fetch_json, FetchError};

/// The Esplora script type of `OP_RETURN` outputs.
const NULL_DATA_SCRIPT_TYPE: &str = "op_return";

/// An Esplora API client.
#[derive(Clone, Debug)]
pub struct Esplora {
    client: Client,
    base_url: String,
}

impl Esplora {
    /// The provider name used in errors and logs.
    pub const NAME: &'static str = "esplora";

    /// Creates a client for the Esplora API at `url`, for example
    /// `https://blockstream.info/api`.
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            base_url: base_url(url),
        }
    }

    /// Fetches and normalizes the transaction `tx_id`.
    ///
    /// If the transaction is mined, but the current tip height can't be
    /// fetched, the transaction is returned without a confirmation count.
    #[instrument(skip_all, fields(provider = Self::NAME, %tx_id))]
    pub async fn fetch_transaction(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionRecord, ProviderError> {
        let url = format!("{}/tx/{}", self.base_url, tx_id);
        let transaction: EsploraTransaction =
            fetch_json(Self::NAME, self.client.get(url), tx_id).await?;

        let confirmations = match (transaction.confirmations, &transaction.status) {
            (Some(confirmations), _) => Some(confirmations),
            (None, Some(status)) => self.confirmations(status).await,
            (None, None) => None,
        };

        Ok(transaction.into_record(confirmations))
    }

    /// Returns the confirmation count for a transaction with `status`.
    async fn confirmations(&self, status: &EsploraStatus) -> Option<u64> {
        let block_height = match status {
            EsploraStatus {
                confirmed: false, ..
            } => return Some(0),
            EsploraStatus {
                confirmed: true,
                block_height: Some(block_height),
            } => *block_height,
            EsploraStatus {
                confirmed: true,
                block_height: None,
            } => return None,
        };

        match self.tip_height().await {
            Ok(tip_height) => Some(tip_height.saturating_sub(block_height) + 1),
            Err(error) => {
                tracing::debug!(%error, "could not fetch tip height, confirmations unknown");
                None
            }
        }
    }

    /// Fetches the height of the provider's best chain tip.
    pub async fn tip_height(&self) -> Result<u64, ProviderError> {
        let url = format!("{}/blocks/tip/height", self.base_url);
        let body = fetch_body(Self::NAME, self.client.get(url))
            .await
            .map_err(|error| match error {
                FetchError::NotFound => {
                    ProviderError::unavailable(Self::NAME, "tip height endpoint not found")
                }
                FetchError::Provider(error) => error,
            })?;

        std::str::from_utf8(&body)
            .ok()
            .and_then(|height| height.trim().parse().ok())
            .ok_or_else(|| ProviderError::malformed(Self::NAME, "tip height is not a number"))
    }
}

impl Service<TransactionId> for Esplora {
    type Response = TransactionRecord;
    type Error = ProviderError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, tx_id: TransactionId) -> Self::Future {
        let provider = self.clone();

        async move { provider.fetch_transaction(&tx_id).await }.boxed()
    }
}

/// An Esplora `GET /tx/{txid}` response.
#[derive(Clone, Debug, Deserialize)]
struct EsploraTransaction {
    vout: Vec<EsploraOutput>,

    /// Not sent by Esplora itself, but sent by some compatible APIs.
    #[serde(default)]
    confirmations: Option<u64>,

    #[serde(default)]
    status: Option<EsploraStatus>,
}

#[derive(Clone, Debug, Deserialize)]
struct EsploraOutput {
    scriptpubkey_type: String,

    #[serde(default)]
    scriptpubkey_asm: String,
}

#[derive(Clone, Debug, Deserialize)]
struct EsploraStatus {
    confirmed: bool,

    #[serde(default)]
    block_height: Option<u64>,
}

impl EsploraTransaction {
    fn into_record(self, confirmations: Option<u64>) -> TransactionRecord {
        let outputs = self
            .vout
            .into_iter()
            .map(|output| {
                if output.scriptpubkey_type == NULL_DATA_SCRIPT_TYPE {
                    Output::null_data(Payload::Script(output.scriptpubkey_asm))
                } else {
                    Output::ordinary()
                }
            })
            .collect();

        TransactionRecord {
            outputs,
            confirmations,
        }
    }
}
