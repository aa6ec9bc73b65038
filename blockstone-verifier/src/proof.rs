//! Expected proof strings, and matching them against transaction payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transaction::{Output, TransactionRecord};

/// The domain that links each proof to the company's public BlockStone page.
pub const PROOF_DOMAIN: &str = "blockst.one";

/// A string that a company was asked to embed in its verification transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedProof(String);

impl ExpectedProof {
    /// Wraps an externally derived proof string.
    pub fn new(proof: impl Into<String>) -> Self {
        Self(proof.into())
    }

    /// Derives the proof a company embeds from its registration data:
    ///
    /// ```text
    /// {country}#{registration_number} blockst.one/{slug}
    /// ```
    ///
    /// See [`company_slug`] for how the slug is derived from the name.
    pub fn for_company(country: &str, registration_number: &str, name: &str) -> Self {
        Self(format!(
            "{country}#{registration_number} {PROOF_DOMAIN}/{}",
            company_slug(name)
        ))
    }

    /// Returns the proof text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does any null-data output in `transaction` contain this proof?
    ///
    /// Each output's payload is checked on its own, using a case-sensitive
    /// substring search. Ordinary outputs are ignored, even if their scripts
    /// contain the proof bytes.
    pub fn is_contained_in(&self, transaction: &TransactionRecord) -> bool {
        transaction
            .outputs
            .iter()
            .filter_map(Output::null_data_payload)
            .any(|payload| payload.contains(self.as_str()))
    }
}

impl fmt::Display for ExpectedProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpectedProof {
    fn from(proof: &str) -> Self {
        Self::new(proof)
    }
}

impl From<String> for ExpectedProof {
    fn from(proof: String) -> Self {
        Self::new(proof)
    }
}

/// Returns the lower case name with everything except ASCII letters and digits removed.
pub fn company_slug(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::transaction::Payload;

    use super::*;

    fn transaction(outputs: Vec<Output>) -> TransactionRecord {
        TransactionRecord {
            outputs,
            confirmations: Some(1),
        }
    }

    #[test]
    fn company_proof_format() {
        let _init_guard = blockstone_test::init();

        assert_eq!(
            ExpectedProof::for_company("NL", "12345678", "Acme").as_str(),
            "NL#12345678 blockst.one/acme"
        );
        assert_eq!(
            ExpectedProof::for_company("DE", "HRB 1234", "Müller & Söhne GmbH").as_str(),
            "DE#HRB 1234 blockst.one/mllershnegmbh"
        );
        assert_eq!(company_slug("  "), "");
    }

    #[test]
    fn match_is_case_sensitive() {
        let _init_guard = blockstone_test::init();

        let tx = transaction(vec![Output::null_data(Payload::Text(
            "NL#12345678 blockst.one/acme".to_string(),
        ))]);

        assert!(ExpectedProof::new("NL#12345678 blockst.one/acme").is_contained_in(&tx));
        assert!(ExpectedProof::new("12345678 blockst").is_contained_in(&tx));
        assert!(!ExpectedProof::new("nl#12345678 blockst.one/acme").is_contained_in(&tx));
        assert!(!ExpectedProof::new("DE#87654321 blockst.one/acme").is_contained_in(&tx));
    }

    #[test]
    fn outputs_are_never_concatenated() {
        let _init_guard = blockstone_test::init();

        let tx = transaction(vec![
            Output::null_data(Payload::Text("NL#12345678".to_string())),
            Output::null_data(Payload::Bytes(b" blockst.one/acme".to_vec())),
        ]);

        assert!(!ExpectedProof::new("NL#12345678 blockst.one/acme").is_contained_in(&tx));
        assert!(ExpectedProof::new("blockst.one/acme").is_contained_in(&tx));
    }

    #[test]
    fn ordinary_outputs_are_ignored() {
        let _init_guard = blockstone_test::init();

        let tx = transaction(vec![Output {
            kind: crate::transaction::OutputKind::Ordinary,
            payload: Some(Payload::Text("NL#12345678 blockst.one/acme".to_string())),
        }]);

        assert!(!ExpectedProof::new("NL#12345678").is_contained_in(&tx));
        assert!(!ExpectedProof::new("NL#12345678").is_contained_in(&TransactionRecord::default()));
    }

    /// Registration numbers can contain groups that look like hex data tokens.
    #[test]
    fn script_text_that_looks_like_hex() {
        let _init_guard = blockstone_test::init();

        let proof = ExpectedProof::for_company("DE", "HRB 1234", "Müller & Söhne GmbH");
        let payload = Payload::Script(format!("OP_RETURN {proof}"));
        let tx = transaction(vec![Output::null_data(payload.clone())]);

        // "1234" is decoded as two bytes, but the assembly still matches as shown
        assert!(!payload.text().contains(proof.as_str()));
        assert!(proof.is_contained_in(&tx));

        let pushed = transaction(vec![Output::null_data(Payload::Script(
            "OP_RETURN OP_PUSHBYTES_11 4e4c233132333435363738".to_string(),
        ))]);
        assert!(ExpectedProof::new("NL#12345678").is_contained_in(&pushed));
        assert!(!ExpectedProof::new("nl#12345678").is_contained_in(&pushed));
    }
}
