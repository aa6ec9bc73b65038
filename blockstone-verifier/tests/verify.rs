//! End-to-end proof verification against fixture providers.

use color_eyre::eyre::Result;

use blockstone_test::{
    fixture::{unreachable_url, Fixture, FixtureServer},
    vectors::*,
};

use blockstone_verifier::{Config, ExpectedProof, TransactionId, VerificationStatus, Verifier};

/// Returns a config that uses `primary` and `secondary` as provider base URLs.
fn config(primary: String, secondary: String) -> Config {
    let mut config = Config::default();
    config.primary.url = primary;
    config.secondary.url = secondary;
    config
}

fn acme_tx_id() -> TransactionId {
    ACME_TX_ID.into()
}

async fn esplora_server() -> FixtureServer {
    FixtureServer::start([
        (esplora_tx_path(ACME_TX_ID), Fixture::json(ESPLORA_ACME)),
        (
            ESPLORA_TIP_HEIGHT_PATH.to_string(),
            Fixture::text(ESPLORA_TIP_HEIGHT),
        ),
    ])
    .await
}

async fn blockcypher_server() -> FixtureServer {
    FixtureServer::start([(
        blockcypher_tx_path(ACME_TX_ID),
        Fixture::json(BLOCKCYPHER_ACME),
    )])
    .await
}

#[tokio::test]
async fn primary_provider_scenarios() -> Result<()> {
    let _init_guard = blockstone_test::init();

    let primary = esplora_server().await;
    let secondary = blockcypher_server().await;
    let verifier = Verifier::from_config(&config(primary.url(), secondary.url()))?;

    assert!(
        verifier
            .verify_proof(&acme_tx_id(), &ExpectedProof::new(ACME_PROOF))
            .await
    );
    assert!(
        !verifier
            .verify_proof(&acme_tx_id(), &ExpectedProof::new(OTHER_PROOF))
            .await
    );
    assert_eq!(verifier.get_confirmation_count(&acme_tx_id()).await, 6);

    // the secondary provider is only used when the primary fails
    assert_eq!(secondary.request_count(), 0);

    Ok(())
}

#[tokio::test]
async fn secondary_provider_after_primary_outage() -> Result<()> {
    let _init_guard = blockstone_test::init();

    let primary = FixtureServer::start([(esplora_tx_path(ACME_TX_ID), Fixture::status(502))]).await;
    let secondary = blockcypher_server().await;
    let verifier = Verifier::from_config(&config(primary.url(), secondary.url()))?;

    let proof = ExpectedProof::for_company("NL", "12345678", "ACME");

    assert_eq!(
        verifier.status(&acme_tx_id(), &proof).await,
        VerificationStatus::Verified {
            confirmations: Some(6)
        }
    );
    assert_eq!(primary.request_count(), 1);
    assert_eq!(secondary.request_count(), 1);

    Ok(())
}

#[tokio::test]
async fn all_providers_offline() -> Result<()> {
    let _init_guard = blockstone_test::init();

    let verifier = Verifier::from_config(&config(
        unreachable_url().await,
        unreachable_url().await,
    ))?;
    let proof = ExpectedProof::new(ACME_PROOF);

    assert!(!verifier.verify_proof(&acme_tx_id(), &proof).await);
    assert_eq!(verifier.get_confirmation_count(&acme_tx_id()).await, 0);
    assert_eq!(verifier.confirmations(&acme_tx_id()).await, None);
    assert_eq!(
        verifier.status(&acme_tx_id(), &proof).await,
        VerificationStatus::Error
    );

    Ok(())
}

#[tokio::test]
async fn malformed_transaction_ids_are_passed_through() -> Result<()> {
    let _init_guard = blockstone_test::init();

    let primary = esplora_server().await;
    let secondary = blockcypher_server().await;
    let verifier = Verifier::from_config(&config(primary.url(), secondary.url()))?;

    let malformed = TransactionId::new("not-a-transaction-id");
    assert!(!malformed.is_well_formed());
    assert!(acme_tx_id().is_well_formed());

    let error = verifier
        .check_proof(&malformed, &ExpectedProof::new(ACME_PROOF))
        .await
        .expect_err("fixture providers reject unknown ids");
    assert!(error.is_not_found());

    assert_eq!(primary.requests(), vec!["/tx/not-a-transaction-id"]);
    assert_eq!(secondary.requests(), vec!["/txs/not-a-transaction-id"]);

    Ok(())
}
