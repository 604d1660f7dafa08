//! Bitcoin addresses of chain fusion signer users.

use bitcoin::{Address, CompressedPublicKey};
use ic_principal::Principal;
use ic_pub_key_deriv::{
    ChainCode, EncodedPublicKey, PublicKeyWithChainCode, Secp256k1, Secp256k1PublicKey,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{btc_derivation_path, BitcoinAddressType, BitcoinNetwork, SignerError};

/// The inputs of a `btc_address_for` call, in printable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtcAddressRequest {
    /// Root public key of the signer.
    pub pubkey: Secp256k1PublicKey,

    /// Root chain code of the signer.
    pub chaincode: ChainCode,

    /// Textual principal of the user.
    pub principal: String,

    /// Network the address is for.
    pub network: BitcoinNetwork,
}

/// The result of a `btc_address_for` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtcAddressResponse {
    /// The user's address.
    pub btc_address: String,

    /// Network the address is for.
    pub network: BitcoinNetwork,
}

/// Derives the Bitcoin address of `user` under `root`.
pub(crate) fn btc_address_for(
    root: &PublicKeyWithChainCode<Secp256k1>,
    user: &Principal,
    network: BitcoinNetwork,
    address_type: BitcoinAddressType,
) -> Result<(BtcAddressRequest, BtcAddressResponse), SignerError> {
    let derived = root.derive_subkey_with_chain_code(&btc_derivation_path(user))?;

    let address = match address_type {
        BitcoinAddressType::P2wpkh => {
            let pubkey = CompressedPublicKey(*derived.public_key.point());
            Address::p2wpkh(&pubkey, network.to_bitcoin())
        }
    };

    debug!(
        %user,
        %network,
        %address_type,
        user_key = %derived.public_key.to_hex(),
        %address,
        "derived bitcoin address"
    );

    let request = BtcAddressRequest {
        pubkey: root.public_key,
        chaincode: root.chain_code,
        principal: user.to_text(),
        network,
    };
    let response = BtcAddressResponse {
        btc_address: address.to_string(),
        network,
    };

    Ok((request, response))
}
