//! Canonical byte codec.
//!
//! Byte strings are shown to humans either as hex or as a "blob": ASCII alphanumerics are kept
//! as-is and every other byte is written as a backslash followed by two lowercase hex digits.
//! This is the representation the platform uses for byte arrays in textual call arguments, e.g.
//! `SETI\40home`.

use crate::DerivationError;

/// Encodes bytes as a blob string.
pub fn encode_blob(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        if byte.is_ascii_alphanumeric() {
            out.push(char::from(byte));
        } else {
            out.push('\\');
            out.push_str(&hex::encode([byte]));
        }
    }
    out
}

/// Decodes a blob string into bytes.
///
/// Characters outside an escape are taken as their own code point truncated to a byte, so the
/// input is expected to be 7-bit clean. An escape whose digits are not both hex decodes to `0`.
/// The only error is an escape left unfinished at the end of the input.
pub fn decode_blob(blob: &str) -> Result<Vec<u8>, DerivationError> {
    let mut bytes = Vec::with_capacity(blob.len());
    let mut chars = blob.chars();
    while let Some(next) = chars.next() {
        if next != '\\' {
            bytes.push(next as u32 as u8);
            continue;
        }

        let high = chars.next().ok_or(DerivationError::IncompleteEscape)?;
        let low = chars.next().ok_or(DerivationError::IncompleteEscape)?;
        let byte = match (high.to_digit(16), low.to_digit(16)) {
            (Some(high), Some(low)) => ((high << 4) | low) as u8,
            _ => 0,
        };
        bytes.push(byte);
    }
    Ok(bytes)
}

/// Encodes bytes as lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes hex of either case into bytes.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>, DerivationError> {
    Ok(hex::decode(hex)?)
}

/// Returns true if `s` is exactly `len` bytes written as hex.
pub(crate) fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len * 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
