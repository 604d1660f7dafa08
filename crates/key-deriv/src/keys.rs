//! Public keys and their pairing with chain codes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    encoding::{decode_blob, encode_blob, hex_decode, is_hex_of_len},
    ChainCode, CkdEngine, DerivationError, DerivationPath,
};

/// A public key with a fixed-size byte encoding.
///
/// Construction validates both the length and the point; a value of this type always holds a
/// usable point.
pub trait EncodedPublicKey: Sized {
    /// Encoded length in bytes.
    const LENGTH: usize;

    /// Decodes and validates a public key.
    fn from_bytes(bytes: &[u8]) -> Result<Self, DerivationError>;

    /// Returns the encoded public key.
    fn as_bytes(&self) -> &[u8];

    /// Parses the key from exactly `2 * LENGTH` hex characters.
    fn from_hex(hex: &str) -> Result<Self, DerivationError> {
        if hex.len() != Self::LENGTH * 2 {
            return Err(DerivationError::InvalidLength {
                what: "public key hex",
                expected: Self::LENGTH * 2,
                actual: hex.len(),
            });
        }
        Self::from_bytes(&hex_decode(hex)?)
    }

    /// Parses the key from a blob string.
    fn from_blob(blob: &str) -> Result<Self, DerivationError> {
        Self::from_bytes(&decode_blob(blob)?)
    }

    /// Parses either format: hex if the string is hex of exactly the right length, blob
    /// otherwise.
    fn from_string(s: &str) -> Result<Self, DerivationError> {
        if is_hex_of_len(s, Self::LENGTH) {
            Self::from_hex(s)
        } else {
            Self::from_blob(s)
        }
    }

    /// Returns the key as lowercase hex.
    fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Returns the key as a blob string.
    fn to_blob(&self) -> String {
        encode_blob(self.as_bytes())
    }
}

/// A public key with its chain code.
///
/// This is both the input and the output of a derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PublicKeyWithChainCode<E: CkdEngine> {
    /// The public key.
    pub public_key: E::PublicKey,

    /// A hash of the derivation path that led to the public key.
    pub chain_code: ChainCode,
}

impl<E: CkdEngine> PublicKeyWithChainCode<E> {
    /// Pairs a public key with a chain code.
    pub const fn new(public_key: E::PublicKey, chain_code: ChainCode) -> Self {
        Self {
            public_key,
            chain_code,
        }
    }

    /// Parses the public key and chain code from hex strings.
    pub fn from_hex(public_key: &str, chain_code: &str) -> Result<Self, DerivationError> {
        Ok(Self::new(
            E::PublicKey::from_hex(public_key)?,
            ChainCode::from_hex(chain_code)?,
        ))
    }

    /// Parses the public key and chain code from blob strings.
    pub fn from_blob(public_key: &str, chain_code: &str) -> Result<Self, DerivationError> {
        Ok(Self::new(
            E::PublicKey::from_blob(public_key)?,
            ChainCode::from_blob(chain_code)?,
        ))
    }

    /// Parses the public key and chain code, each in whichever format it is written.
    pub fn from_string(public_key: &str, chain_code: &str) -> Result<Self, DerivationError> {
        Ok(Self::new(
            E::PublicKey::from_string(public_key)?,
            ChainCode::from_string(chain_code)?,
        ))
    }

    /// Returns the public key and chain code as hex strings.
    pub fn to_hex(&self) -> (String, String) {
        (self.public_key.to_hex(), self.chain_code.to_hex())
    }

    /// Returns the public key and chain code as blob strings.
    pub fn to_blob(&self) -> (String, String) {
        (self.public_key.to_blob(), self.chain_code.to_blob())
    }

    /// Applies the given derivation path to obtain a new public key and chain code.
    pub fn derive_subkey_with_chain_code(
        &self,
        derivation_path: &DerivationPath,
    ) -> Result<Self, DerivationError> {
        let point = E::point(&self.public_key);
        let (point, _offset, chain_code) =
            derivation_path.derive_offset::<E>(&point, &self.chain_code)?;
        let derived = Self::new(E::public_key(&point)?, chain_code);

        debug!(
            curve = E::CURVE,
            path_len = derivation_path.len(),
            public_key = %derived.public_key.to_hex(),
            "derived subkey"
        );

        Ok(derived)
    }
}
