//! Well-known secp256k1 master public keys.
//!
//! These are the BIP340 Schnorr master keys of the production network and of PocketIC, the
//! local test replica. Master keys have an all-zero chain code; canister keys are derived from
//! them with a path that starts with the canister's principal (see
//! [`DerivationPath::with_canister_prefix`](crate::DerivationPath::with_canister_prefix)).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    ChainCode, DerivationError, EncodedPublicKey, PublicKeyWithChainCode, Secp256k1,
    Secp256k1PublicKey,
};

/// Where a master key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasterKeyEnvironment {
    /// The production network.
    Mainnet,

    /// The PocketIC local test replica.
    #[serde(rename = "pocketic")]
    PocketIc,
}

impl MasterKeyEnvironment {
    const fn keys(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Mainnet => MAINNET_KEYS,
            Self::PocketIc => POCKETIC_KEYS,
        }
    }
}

impl fmt::Display for MasterKeyEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet"),
            Self::PocketIc => f.write_str("pocketic"),
        }
    }
}

impl FromStr for MasterKeyEnvironment {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "pocketic" => Ok(Self::PocketIc),
            other => Err(DerivationError::UnknownMasterKey(format!(
                "unknown environment {other}"
            ))),
        }
    }
}

/// `(key id, compressed public key)` pairs.
const MAINNET_KEYS: &[(&str, &str)] = &[
    (
        "key_1",
        "02246e29785f06d37a8a50c49f6152a34df74738f8c13a44f59fef4cbe90eb13ac",
    ),
    (
        "test_key_1",
        "037a651a2e5ef3d1ef63e84c4c4caa029fa4a43a347a91e4d84a8e846853d51be1",
    ),
];

const POCKETIC_KEYS: &[(&str, &str)] = &[
    (
        "key_1",
        "036ad6e838b46811ad79c37b2f4b854b7a05f406715b2935edc5d3251e7666977b",
    ),
    (
        "test_key_1",
        "03cc365e15cb552589c7175717b2ac63d1050b9bb2e5aed35432b1b1be55d3abcf",
    ),
    (
        "dfx_test_key",
        "03e6f78b1a90e361c5cc9903f73bb8acbe3bc17ad01e82554d25cf0ecd70c67484",
    ),
];

/// Lookup table for the master keys of every environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct MasterKeyRegistry;

impl MasterKeyRegistry {
    /// Returns the master key with the given id.
    pub fn lookup(
        env: MasterKeyEnvironment,
        key_id: &str,
    ) -> Result<PublicKeyWithChainCode<Secp256k1>, DerivationError> {
        let (_, public_key) = env
            .keys()
            .iter()
            .find(|(id, _)| *id == key_id)
            .ok_or_else(|| DerivationError::UnknownMasterKey(key_id.to_string()))?;

        Ok(PublicKeyWithChainCode::new(
            Secp256k1PublicKey::from_hex(public_key)?,
            ChainCode::ZERO,
        ))
    }

    /// Lists the key ids known for an environment.
    pub fn key_ids(env: MasterKeyEnvironment) -> impl Iterator<Item = &'static str> {
        env.keys().iter().map(|(id, _)| *id)
    }
}

impl PublicKeyWithChainCode<Secp256k1> {
    /// Returns a production master key.
    pub fn for_mainnet_key(key_id: &str) -> Result<Self, DerivationError> {
        MasterKeyRegistry::lookup(MasterKeyEnvironment::Mainnet, key_id)
    }

    /// Returns a PocketIC master key.
    pub fn for_pocketic_key(key_id: &str) -> Result<Self, DerivationError> {
        MasterKeyRegistry::lookup(MasterKeyEnvironment::PocketIc, key_id)
    }
}
