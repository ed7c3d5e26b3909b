//! Hex and byte buffer helpers.

use crate::Error;

/// Decodes a hex string into bytes.
///
/// Upper and lower case digits are accepted and surrounding whitespace is
/// ignored. An empty string decodes to an empty buffer.
pub fn decode(s: &str) -> Result<Vec<u8>, Error> {
    Ok(hex::decode(s.trim())?)
}

/// Encodes bytes as lower case hex.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
