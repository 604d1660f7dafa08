//! Chain codes.

use std::fmt;

use crate::{
    encoding::{decode_blob, encode_blob, hex_decode, is_hex_of_len},
    DerivationError,
};

/// Chain code length in bytes.
pub const CHAIN_CODE_LENGTH: usize = 32;

/// A 32-byte chain code, mixed into every derivation step.
///
/// A chain code is a hash of how a key was derived. It carries no secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainCode([u8; CHAIN_CODE_LENGTH]);

impl ChainCode {
    /// The all-zero chain code used by the master keys.
    pub const ZERO: Self = Self([0u8; CHAIN_CODE_LENGTH]);

    /// Creates a new [`ChainCode`] from a byte array.
    pub const fn new(bytes: [u8; CHAIN_CODE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Creates a new [`ChainCode`] from a slice that must be exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DerivationError> {
        let array: [u8; CHAIN_CODE_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| DerivationError::InvalidLength {
                    what: "chain code",
                    expected: CHAIN_CODE_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Parses a 64 character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, DerivationError> {
        if hex.len() != CHAIN_CODE_LENGTH * 2 {
            return Err(DerivationError::InvalidLength {
                what: "chain code hex",
                expected: CHAIN_CODE_LENGTH * 2,
                actual: hex.len(),
            });
        }
        Self::from_bytes(&hex_decode(hex)?)
    }

    /// Parses a blob string.
    pub fn from_blob(blob: &str) -> Result<Self, DerivationError> {
        Self::from_bytes(&decode_blob(blob)?)
    }

    /// Parses either format: hex if the string is exactly 64 hex characters, blob otherwise.
    pub fn from_string(s: &str) -> Result<Self, DerivationError> {
        if is_hex_of_len(s, CHAIN_CODE_LENGTH) {
            Self::from_hex(s)
        } else {
            Self::from_blob(s)
        }
    }

    /// Returns the chain code as a byte array.
    pub const fn as_bytes(&self) -> &[u8; CHAIN_CODE_LENGTH] {
        &self.0
    }

    /// Returns the chain code as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the chain code as a blob string.
    pub fn to_blob(&self) -> String {
        encode_blob(&self.0)
    }
}

impl From<[u8; CHAIN_CODE_LENGTH]> for ChainCode {
    fn from(bytes: [u8; CHAIN_CODE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ChainCode {
    type Error = DerivationError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for ChainCode {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ChainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl_hex_serde!(ChainCode);
