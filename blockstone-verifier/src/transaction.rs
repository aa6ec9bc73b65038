//! Provider-independent transaction data.
//!
//! Each provider has its own response schema. Provider clients normalize their
//! responses into a [`TransactionRecord`] before any proof comparison happens.

use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::payload;

/// The number of hex characters in a Bitcoin transaction id.
pub const TRANSACTION_ID_HEX_LENGTH: usize = 64;

/// A Bitcoin transaction id, as displayed by block explorers.
///
/// The id is opaque: it is never parsed or rejected here. Malformed ids are
/// sent to the provider, and the provider's rejection becomes the failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a transaction id from `id`, with surrounding whitespace removed.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Returns the id as submitted.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does this id have the length and alphabet of a transaction id?
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == TRANSACTION_ID_HEX_LENGTH
            && self.0.bytes().all(|byte| byte.is_ascii_hexdigit())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TransactionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// The classification of a transaction output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// An output that carries value: any spendable script.
    Ordinary,

    /// An unspendable `OP_RETURN` output carrying arbitrary data.
    NullData,
}

/// The data embedded in a null-data output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Payload text that the provider has already decoded.
    Text(String),

    /// Raw payload bytes, decoded one byte per character.
    Bytes(Vec<u8>),

    /// An explorer's script assembly for the whole output script.
    ///
    /// Its text is extracted with [`decode_script_asm`](payload::decode_script_asm).
    /// Proofs are also matched against the assembly as shown, because data
    /// tokens can't be reliably told apart from text that looks like hex.
    Script(String),
}

impl Payload {
    /// Returns the payload as text, decoding raw bytes if needed.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Payload::Text(text) => Cow::Borrowed(text),
            Payload::Bytes(bytes) => Cow::Owned(payload::decode_bytes(bytes)),
            Payload::Script(asm) => Cow::Owned(payload::decode_script_asm(asm)),
        }
    }

    /// Does this payload contain `needle`, as an exact substring?
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Payload::Script(asm) if asm.contains(needle) => true,
            _ => self.text().contains(needle),
        }
    }
}

/// A single normalized transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// The output's script classification.
    pub kind: OutputKind,

    /// The embedded data, for null-data outputs that have any.
    pub payload: Option<Payload>,
}

impl Output {
    /// Returns an ordinary output without a payload.
    pub fn ordinary() -> Self {
        Self {
            kind: OutputKind::Ordinary,
            payload: None,
        }
    }

    /// Returns a null-data output carrying `payload`.
    pub fn null_data(payload: Payload) -> Self {
        Self {
            kind: OutputKind::NullData,
            payload: Some(payload),
        }
    }

    /// Returns this output's payload, if it is a null-data output.
    pub fn null_data_payload(&self) -> Option<&Payload> {
        match (self.kind, &self.payload) {
            (OutputKind::NullData, Some(payload)) => Some(payload),
            _ => None,
        }
    }

    /// Returns this output's decoded payload, if it is a null-data output.
    pub fn null_data_text(&self) -> Option<Cow<'_, str>> {
        self.null_data_payload().map(Payload::text)
    }
}

/// A transaction, as reported by a ledger-data provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The transaction's outputs, in transaction order.
    pub outputs: Vec<Output>,

    /// The number of blocks including and after the transaction's block.
    ///
    /// `Some(0)` if the transaction is known but unmined,
    /// `None` if the provider didn't report a count.
    pub confirmations: Option<u64>,
}

impl TransactionRecord {
    /// Returns the decoded payloads of every null-data output, in output order.
    ///
    /// Each payload is a separate item: payloads are never concatenated.
    pub fn null_data_payloads(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.outputs.iter().filter_map(Output::null_data_text)
    }
}
