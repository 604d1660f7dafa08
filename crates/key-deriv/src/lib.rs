//! Public key derivation for threshold keys held by the Internet Computer.
//!
//! Given a root public key, its chain code and a derivation path, this crate computes the
//! descendant public key and chain code the platform would produce, without ever touching a
//! private key. Two curves are supported:
//!
//! - secp256k1 (ECDSA and BIP340 keys): HMAC-SHA512 based non-hardened derivation, bit-compatible
//!   with the platform's reference implementation.
//! - ed25519 (Schnorr keys): HKDF-SHA512 based derivation.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ic_pub_key_deriv::{DerivationPath, PublicKeyWithChainCode, Secp256k1};
//!
//! let root = PublicKeyWithChainCode::<Secp256k1>::from_hex(public_key_hex, chain_code_hex)?;
//! let path = DerivationPath::from_blob(Some("2/444/66666"))?;
//! let derived = root.derive_subkey_with_chain_code(&path)?;
//! println!("{}", derived.public_key.to_hex());
//! ```
//!
//! # Derivation paths
//!
//! A path is an ordered list of opaque byte strings. Its canonical text form joins the blob
//! encoding of each component with `/`; the empty path has no text form at all.

/// Serializes a fixed-size value as hex and accepts either hex or blob when deserializing.
macro_rules! impl_hex_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_string(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod chain_code;
pub mod ckd;
pub mod ed25519;
pub mod encoding;
mod errors;
pub mod keys;
pub mod master_keys;
pub mod path;
pub mod secp256k1;

pub use chain_code::ChainCode;
pub use ckd::CkdEngine;
pub use self::ed25519::{Ed25519, Ed25519PublicKey};
pub use errors::DerivationError;
pub use keys::{EncodedPublicKey, PublicKeyWithChainCode};
pub use master_keys::{MasterKeyEnvironment, MasterKeyRegistry};
pub use path::{DerivationPath, PathComponent};
pub use self::secp256k1::{Secp256k1, Secp256k1PublicKey};
