//! Ledger-data provider responses for a BlockStone verification transaction.
//!
//! All the vectors describe the same transaction, [`ACME_TX_ID`], which embeds
//! the proof [`ACME_PROOF`] for a Dutch company called "Acme".

/// The id of the Acme verification transaction.
pub const ACME_TX_ID: &str = "822b33ad87c148a0a20a5ba7cd5ebcaa68d36a18e7aad165554903f52ca82757";

/// The proof embedded in [`ACME_TX_ID`].
pub const ACME_PROOF: &str = "NL#12345678 blockst.one/acme";

/// A proof that is not embedded in [`ACME_TX_ID`].
pub const OTHER_PROOF: &str = "DE#87654321 blockst.one/acme";

/// The block height of the block that mined [`ACME_TX_ID`].
pub const ACME_BLOCK_HEIGHT: u64 = 850_000;

/// The Esplora tip height used with [`ESPLORA_ACME`]: 6 confirmations.
pub const ESPLORA_TIP_HEIGHT: &str = "850005";

/// Esplora `GET /tx/{txid}`: mined, with the proof split across a hex push
/// and a text token.
pub const ESPLORA_ACME: &str = include_str!("vectors/esplora-acme.json");

/// Esplora `GET /tx/{txid}`: in the mempool, with the proof in a single push.
pub const ESPLORA_UNCONFIRMED: &str = include_str!("vectors/esplora-unconfirmed.json");

/// Esplora `GET /tx/{txid}`: mined at height 849990, with no null-data output.
pub const ESPLORA_NO_DATA: &str = include_str!("vectors/esplora-no-data.json");

/// Esplora `GET /tx/{txid}`: in the mempool, with a German proof shown as
/// text, where the registration number `HRB 1234` has a hex-like group.
pub const ESPLORA_HEX_LIKE_TEXT: &str = include_str!("vectors/esplora-hex-like-text.json");

/// BlockCypher `GET /txs/{hash}`: 6 confirmations, proof in `data_hex`.
pub const BLOCKCYPHER_ACME: &str = include_str!("vectors/blockcypher-acme.json");

/// BlockCypher `GET /txs/{hash}`: unconfirmed, proof only in `data_string`.
pub const BLOCKCYPHER_DATA_STRING: &str = include_str!("vectors/blockcypher-data-string.json");

/// BlockCypher `GET /txs/{hash}`: a null-data output with odd-length hex,
/// and the proof in `data_string`.
pub const BLOCKCYPHER_BAD_HEX: &str = include_str!("vectors/blockcypher-bad-hex.json");

/// Returns the Esplora transaction path for `tx_id`.
pub fn esplora_tx_path(tx_id: &str) -> String {
    format!("/tx/{tx_id}")
}

/// The Esplora tip height path.
pub const ESPLORA_TIP_HEIGHT_PATH: &str = "/blocks/tip/height";

/// Returns the BlockCypher transaction path for `tx_id`.
pub fn blockcypher_tx_path(tx_id: &str) -> String {
    format!("/txs/{tx_id}")
}
