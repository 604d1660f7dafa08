//! Address derivation for users of the chain fusion signer.
//!
//! The chain fusion signer canister holds one secp256k1 root key and derives a separate key for
//! every user and address family. This crate reproduces that derivation offline, so that a
//! user's Bitcoin and Ethereum addresses can be computed from their principal alone.
//!
//! ```rust,ignore
//! use ic_pub_key_signer::{BitcoinNetwork, ChainFusionSigner};
//!
//! let signer = ChainFusionSigner::production()?;
//! let user = ic_pub_key_signer::parse_principal("nggqm-p5ozz-...")?;
//! let (_, response) = signer.btc_address_for(&user, Some(BitcoinNetwork::Testnet), None)?;
//! println!("{}", response.btc_address);
//! ```

mod btc;
mod config;
mod errors;
mod eth;
mod paths;

use ic_principal::Principal;
use ic_pub_key_deriv::{PublicKeyWithChainCode, Secp256k1};

pub use btc::{BtcAddressRequest, BtcAddressResponse};
pub use config::{
    BitcoinAddressType, BitcoinNetwork, SignerConfig, CHAIN_FUSION_SIGNER_CHAINCODE,
    CHAIN_FUSION_SIGNER_PUBKEY,
};
pub use errors::SignerError;
pub use eth::{EthAddressRequest, EthAddressResponse};
pub use paths::{
    btc_derivation_path, eth_derivation_path, signer_derivation_path, BTC_DOMAIN_SEPARATOR,
    ETH_DOMAIN_SEPARATOR,
};

/// Parses a textual principal.
pub fn parse_principal(text: &str) -> Result<Principal, SignerError> {
    Principal::from_text(text).map_err(|e| SignerError::InvalidPrincipal(format!("{text}: {e}")))
}

/// Computes the addresses the chain fusion signer assigns to its users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFusionSigner {
    root: PublicKeyWithChainCode<Secp256k1>,
    network: BitcoinNetwork,
    address_type: BitcoinAddressType,
}

impl ChainFusionSigner {
    /// Creates a signer for the given root key and defaults.
    pub const fn new(
        root: PublicKeyWithChainCode<Secp256k1>,
        network: BitcoinNetwork,
        address_type: BitcoinAddressType,
    ) -> Self {
        Self {
            root,
            network,
            address_type,
        }
    }

    /// The production chain fusion signer.
    pub fn production() -> Result<Self, SignerError> {
        Self::from_config(&SignerConfig::default())
    }

    /// Creates a signer from its configuration.
    pub fn from_config(config: &SignerConfig) -> Result<Self, SignerError> {
        Ok(Self::new(
            config.root_key()?,
            config.network,
            config.address_type,
        ))
    }

    /// The signer's root key.
    pub const fn root(&self) -> &PublicKeyWithChainCode<Secp256k1> {
        &self.root
    }

    /// Returns the Bitcoin address of `user`.
    ///
    /// `network` and `address_type` fall back to the configured defaults.
    pub fn btc_address_for(
        &self,
        user: &Principal,
        network: Option<BitcoinNetwork>,
        address_type: Option<BitcoinAddressType>,
    ) -> Result<(BtcAddressRequest, BtcAddressResponse), SignerError> {
        btc::btc_address_for(
            &self.root,
            user,
            network.unwrap_or(self.network),
            address_type.unwrap_or(self.address_type),
        )
    }

    /// Returns the Ethereum address of `user`.
    pub fn eth_address_for(
        &self,
        user: &Principal,
    ) -> Result<(EthAddressRequest, EthAddressResponse), SignerError> {
        eth::eth_address_for(&self.root, user)
    }
}
