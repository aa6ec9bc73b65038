//! Conversions between proof text and null-data payload bytes.
//!
//! Proofs are embedded one byte per character: each character's code point is
//! written as a single byte, and each byte is read back as the character with
//! the same code point. This is a binary-to-text transform, not a text
//! encoding. In particular, payload bytes are never decoded as UTF-8, so a
//! byte sequence that happens to be valid UTF-8 still decodes to one character
//! per byte.

use crate::error::PayloadError;

/// The prefix shared by all script opcodes in provider script assembly.
const OPCODE_PREFIX: &str = "OP_";

/// Decodes a hex payload into text, one character per byte.
///
/// Whitespace around `raw_hex` is ignored. Both upper and lower case hex digits
/// are accepted.
pub fn decode_payload(raw_hex: &str) -> Result<String, PayloadError> {
    let bytes = hex::decode(raw_hex.trim())?;

    Ok(decode_bytes(&bytes))
}

/// Decodes raw payload bytes into text, one character per byte.
pub fn decode_bytes(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Encodes `text` as a lower case hex payload, one byte per character.
///
/// This is the exact inverse of [`decode_payload`].
///
/// # Errors
///
/// Returns [`PayloadError::UnencodableCharacter`] if any character is above
/// `U+00FF`, because it doesn't fit in a single byte.
pub fn encode_payload(text: &str) -> Result<String, PayloadError> {
    let bytes = text
        .chars()
        .enumerate()
        .map(|(index, character)| {
            u8::try_from(character)
                .map_err(|_| PayloadError::UnencodableCharacter { character, index })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(hex::encode(bytes))
}

/// Extracts the payload text from a null-data output's script assembly.
///
/// Explorers show `OP_RETURN` scripts as space-separated tokens, for example:
///
/// ```text
/// OP_RETURN OP_PUSHBYTES_11 4e4c233132333435363738
/// ```
///
/// Opcode tokens are dropped. Data tokens that are even-length hex are decoded
/// one character per byte, and any other token is kept as text. The remaining
/// tokens are joined with single spaces.
pub fn decode_script_asm(asm: &str) -> String {
    asm.split_whitespace()
        .filter(|token| !token.starts_with(OPCODE_PREFIX))
        .map(|token| match hex::decode(token) {
            Ok(bytes) => decode_bytes(&bytes),
            Err(_) => token.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
