//! Signer configuration.

use std::{fmt, str::FromStr};

use ic_pub_key_deriv::{PublicKeyWithChainCode, Secp256k1};
use serde::{Deserialize, Serialize};

use crate::SignerError;

/// Public key of the chain fusion signer canister.
pub const CHAIN_FUSION_SIGNER_PUBKEY: &str =
    "0259761672ec7ee3bdc5eca95ba5f6a493d1133b86a76163b68af30c06fe3b75c0";

/// Chain code of the chain fusion signer canister.
pub const CHAIN_FUSION_SIGNER_CHAINCODE: &str =
    "f666a98c7f70fe281ca8142f14eb4d1e0934a439237da83869e2cfd924b270c0";

/// The Bitcoin networks the signer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    /// Bitcoin mainnet.
    #[default]
    Mainnet,

    /// Bitcoin testnet3.
    Testnet,

    /// A local regtest network.
    Regtest,
}

impl BitcoinNetwork {
    /// All supported networks.
    pub const ALL: [Self; 3] = [Self::Mainnet, Self::Testnet, Self::Regtest];

    /// The `bitcoin` crate's network.
    pub const fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            Self::Mainnet => bitcoin::Network::Bitcoin,
            Self::Testnet => bitcoin::Network::Testnet,
            Self::Regtest => bitcoin::Network::Regtest,
        }
    }

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}

impl fmt::Display for BitcoinNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitcoinNetwork {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.as_str() == s)
            .ok_or_else(|| SignerError::UnsupportedNetwork(s.to_string()))
    }
}

/// The Bitcoin address types the signer serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinAddressType {
    /// Native segwit v0 pay-to-witness-pubkey-hash.
    #[default]
    P2wpkh,
}

impl BitcoinAddressType {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P2wpkh => "p2wpkh",
        }
    }
}

impl fmt::Display for BitcoinAddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BitcoinAddressType {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p2wpkh" => Ok(Self::P2wpkh),
            other => Err(SignerError::UnsupportedAddressType(other.to_string())),
        }
    }
}

/// Configuration of a [`ChainFusionSigner`](crate::ChainFusionSigner).
///
/// Keys are kept as text (hex or blob) so that a config can be written by hand; they are
/// validated by [`SignerConfig::from_toml_str`] and [`SignerConfig::root_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Root public key of the signer, compressed SEC1.
    pub public_key: String,

    /// Root chain code of the signer.
    pub chain_code: String,

    /// Network used when a request names none.
    #[serde(default)]
    pub network: BitcoinNetwork,

    /// Address type used when a request names none.
    #[serde(default)]
    pub address_type: BitcoinAddressType,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            public_key: CHAIN_FUSION_SIGNER_PUBKEY.to_string(),
            chain_code: CHAIN_FUSION_SIGNER_CHAINCODE.to_string(),
            network: BitcoinNetwork::default(),
            address_type: BitcoinAddressType::default(),
        }
    }
}

impl SignerConfig {
    /// Parses a TOML config and checks that its keys are well formed.
    pub fn from_toml_str(s: &str) -> Result<Self, SignerError> {
        let config =
            toml::from_str::<Self>(s).map_err(|e| SignerError::InvalidConfig(e.to_string()))?;
        config.root_key()?;
        Ok(config)
    }

    /// Serializes the config as TOML.
    pub fn to_toml_string(&self) -> Result<String, SignerError> {
        toml::to_string(self).map_err(|e| SignerError::InvalidConfig(e.to_string()))
    }

    /// Decodes the root key and chain code.
    pub fn root_key(&self) -> Result<PublicKeyWithChainCode<Secp256k1>, SignerError> {
        PublicKeyWithChainCode::from_string(&self.public_key, &self.chain_code)
            .map_err(|source| SignerError::InvalidKey { source })
    }
}
