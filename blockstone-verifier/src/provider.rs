//! Ledger-data provider clients.
//!
//! Each provider is a [`tower::Service`] from a [`TransactionId`] to a
//! normalized [`TransactionRecord`]. Providers are cheap to clone: clones share
//! the same HTTP connection pool.
//!
//! The canonical provider chain is [`Esplora`] first, then [`BlockCypher`] as a
//! [`Fallback`]. Use [`init`] to build it from a [`Config`].

use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::{Config, HttpConfig},
    error::ProviderError,
    transaction::{TransactionId, TransactionRecord},
};

mod blockcypher;
mod esplora;
mod fallback;


pub use blockcypher::BlockCypher;
pub use esplora::Esplora;
pub use fallback::Fallback;

/// The canonical provider chain.
pub type ProviderChain = Fallback<Esplora, BlockCypher>;

/// A type-erased provider, for callers that build their own chains.
pub type BoxProvider =
    tower::util::BoxCloneService<TransactionId, TransactionRecord, ProviderError>;

/// Builds the canonical provider chain from `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client can't be built, for example if the
/// TLS backend fails to initialise.
pub fn init(config: &Config) -> Result<ProviderChain, reqwest::Error> {
    let client = http_client(&config.http)?;

    let primary = Esplora::new(client.clone(), &config.primary.url);
    let secondary = BlockCypher::new(
        client,
        &config.secondary.url,
        config.secondary.token.clone(),
    );

    Ok(Fallback::new(primary, secondary))
}

/// Builds the HTTP client shared by all providers.
///
/// Timeouts are left at the transport defaults.
pub fn http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .user_agent(config.user_agent.clone())
        .build()
}

/// Returns `url` without trailing `/` characters.
fn base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Sends `request`, and parses a successful response body as JSON.
///
/// A `404 Not Found` status means the provider doesn't know `tx_id`.
/// Request URLs are removed from transport errors, because they can contain
/// API tokens.
async fn fetch_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
    tx_id: &TransactionId,
) -> Result<T, ProviderError> {
    let body = fetch_body(provider, request)
        .await
        .map_err(|error| match error {
            FetchError::NotFound => ProviderError::TransactionNotFound {
                provider,
                tx_id: tx_id.clone(),
            },
            FetchError::Provider(error) => error,
        })?;

    serde_json::from_slice(&body).map_err(|error| ProviderError::malformed(provider, error))
}

/// Sends `request`, and returns the body of a successful response.
async fn fetch_body(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<bytes::Bytes, FetchError> {
    let response = request
        .send()
        .await
        .map_err(|error| ProviderError::unavailable(provider, error.without_url()))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(FetchError::NotFound);
    }
    if !status.is_success() {
        return Err(ProviderError::unavailable(provider, format!("HTTP status {status}")).into());
    }

    let body = response
        .bytes()
        .await
        .map_err(|error| ProviderError::unavailable(provider, error.without_url()))?;

    Ok(body)
}

/// An HTTP fetch failure, before it is tied to a transaction.
#[derive(Debug)]
enum FetchError {
    NotFound,
    Provider(ProviderError),
}

impl From<ProviderError> for FetchError {
    fn from(error: ProviderError) -> Self {
        FetchError::Provider(error)
    }
}
