//! Errors for the chain fusion signer address policy.

use ic_pub_key_deriv::DerivationError;
use thiserror::Error;

/// Error type for signer address derivation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignerError {
    /// The Bitcoin network is not one the signer serves.
    #[error("unsupported bitcoin network: {0}")]
    UnsupportedNetwork(String),

    /// The Bitcoin address type is not one the signer serves.
    #[error("unsupported bitcoin address type: {0}")]
    UnsupportedAddressType(String),

    /// The user identity is not a valid principal.
    #[error("invalid principal {0}")]
    InvalidPrincipal(String),

    /// Deriving the per-user key failed.
    #[error("derivation failed: {0}")]
    Derivation(#[from] DerivationError),

    /// The configured root key or chain code does not decode.
    #[error("invalid signer root key: {source}")]
    InvalidKey {
        /// Why the key was rejected.
        #[source]
        source: DerivationError,
    },

    /// The signer configuration could not be parsed.
    #[error("invalid signer config: {0}")]
    InvalidConfig(String),
}
