//! The fallback provider: a BlockCypher-compatible API.
//!
//! BlockCypher sends null-data payloads as hex bytes, and reports the
//! confirmation count with the transaction.

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
    config::ApiToken,
    error::ProviderError,
    transaction::{Output, OutputKind, Payload, TransactionId, TransactionRecord},
};

use super::{base_url, fetch_json};

/// The BlockCypher script type of `OP_RETURN` outputs.
const NULL_DATA_SCRIPT_TYPE: &str = "null-data";

/// A BlockCypher API client.
#[derive(Clone, Debug)]
pub struct BlockCypher {
    client: Client,
    base_url: String,
    token: Option<ApiToken>,
}

impl BlockCypher {
    /// The provider name used in errors and logs.
    pub const NAME: &'static str = "blockcypher";

    /// Creates a client for the BlockCypher API at `url`, for example
    /// `https://api.blockcypher.com/v1/btc/main`.
    ///
    /// If `token` is set, it is sent as the `token` query parameter.
    pub fn new(client: Client, url: &str, token: Option<ApiToken>) -> Self {
        Self {
            client,
            base_url: base_url(url),
            token,
        }
    }

    /// Fetches and normalizes the transaction `tx_id`.
    #[instrument(skip_all, fields(provider = Self::NAME, %tx_id))]
    pub async fn fetch_transaction(
        &self,
        tx_id: &TransactionId,
    ) -> Result<TransactionRecord, ProviderError> {
        let mut request = self
            .client
            .get(format!("{}/txs/{}", self.base_url, tx_id));

        if let Some(token) = &self.token {
            request = request.query(&[("token", token.expose())]);
        }

        let transaction: BlockCypherTransaction = fetch_json(Self::NAME, request, tx_id).await?;

        transaction.into_record()
    }
}

impl Service<TransactionId> for BlockCypher {
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

/// A BlockCypher `GET /txs/{hash}` response.
#[derive(Clone, Debug, Deserialize)]
struct BlockCypherTransaction {
    outputs: Vec<BlockCypherOutput>,

    #[serde(default)]
    confirmations: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
struct BlockCypherOutput {
    script_type: String,

    #[serde(default)]
    data_hex: Option<String>,

    /// BlockCypher's own UTF-8 rendering of the payload.
    #[serde(default)]
    data_string: Option<String>,
}

impl BlockCypherTransaction {
    fn into_record(self) -> Result<TransactionRecord, ProviderError> {
        let outputs = self
            .outputs
            .into_iter()
            .map(BlockCypherOutput::into_output)
            .collect::<Result<_, _>>()?;

        Ok(TransactionRecord {
            outputs,
            confirmations: self.confirmations,
        })
    }
}

impl BlockCypherOutput {
    fn into_output(self) -> Result<Output, ProviderError> {
        if self.script_type != NULL_DATA_SCRIPT_TYPE {
            return Ok(Output::ordinary());
        }

        // Prefer the raw bytes, because `data_string` is a UTF-8 decoding
        // and can differ from the byte-per-character proof encoding.
        let bytes = self.data_hex.map(|data_hex| hex::decode(data_hex.trim()));

        let payload = match (bytes, self.data_string) {
            (Some(Ok(bytes)), _) => Some(Payload::Bytes(bytes)),
            (Some(Err(error)), Some(data_string)) => {
                tracing::debug!(%error, "invalid data_hex, using data_string");
                Some(Payload::Text(data_string))
            }
            (Some(Err(error)), None) => {
                return Err(ProviderError::malformed(
                    BlockCypher::NAME,
                    format!("data_hex: {error}"),
                ))
            }
            (None, Some(data_string)) => Some(Payload::Text(data_string)),
            (None, None) => None,
        };

        Ok(Output {
            kind: OutputKind::NullData,
            payload,
        })
    }
}
