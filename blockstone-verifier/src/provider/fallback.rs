//! A provider combinator that sends requests to a primary provider, then
//! retries them once on a secondary provider if the primary errors.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::FutureExt;
use tower::{Service, ServiceExt};

use crate::{
    error::ProviderError,
    transaction::{TransactionId, TransactionRecord},
};

/// Provides fallback processing on a secondary provider if the primary
/// provider returned an error.
///
/// Requests are sent sequentially: the secondary provider is only called
/// after the primary provider has failed, and it is called at most once.
#[derive(Debug)]
pub struct Fallback<P, S>
where
    S: Clone,
{
    primary: P,
    secondary: S,
}

impl<P: Clone, S: Clone> Clone for Fallback<P, S> {
    fn clone(&self) -> Self {
        Self {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
        }
    }
}

impl<P, S: Clone> Fallback<P, S> {
    /// Creates a new `Fallback` wrapping a pair of providers.
    ///
    /// Requests are processed on `primary`, and retried on `secondary` if
    /// `primary` errored.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P, S> Fallback<P, S>
where
    P: Service<TransactionId, Response = TransactionRecord, Error = ProviderError> + Clone,
    P::Future: Send + 'static,
    S: Service<TransactionId, Response = TransactionRecord, Error = ProviderError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    /// Fetches `tx_id` from the primary provider, or from the secondary
    /// provider if the primary fails.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Exhausted`] with both errors if both providers fail.
    pub async fn fetch_transaction_with_fallback(
        &self,
        tx_id: TransactionId,
    ) -> Result<TransactionRecord, ProviderError> {
        self.clone().oneshot(tx_id).await
    }
}

impl<P, S> Service<TransactionId> for Fallback<P, S>
where
    P: Service<TransactionId, Response = TransactionRecord, Error = ProviderError>,
    P::Future: Send + 'static,
    S: Service<TransactionId, Response = TransactionRecord, Error = ProviderError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = TransactionRecord;
    type Error = ProviderError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.primary.poll_ready(cx)
    }

    fn call(&mut self, tx_id: TransactionId) -> Self::Future {
        let primary = self.primary.call(tx_id.clone());
        let secondary = self.secondary.clone();

        async move {
            let primary_error = match primary.await {
                Ok(transaction) => return Ok(transaction),
                Err(error) => error,
            };

            tracing::warn!(
                %tx_id,
                error = %primary_error,
                "primary provider failed, retrying on secondary provider",
            );

            secondary
                .oneshot(tx_id)
                .await
                .map_err(|secondary_error| ProviderError::Exhausted {
                    primary: Box::new(primary_error),
                    secondary: Box::new(secondary_error),
                })
        }
        .boxed()
    }
}
