//! Ethereum addresses of chain fusion signer users.

use alloy_primitives::Address;
use ic_principal::Principal;
use ic_pub_key_deriv::{
    ChainCode, EncodedPublicKey, PublicKeyWithChainCode, Secp256k1, Secp256k1PublicKey,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{eth_derivation_path, SignerError};

/// The inputs of an `eth_address_for` call, in printable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthAddressRequest {
    /// Root public key of the signer.
    pub pubkey: Secp256k1PublicKey,

    /// Root chain code of the signer.
    pub chaincode: ChainCode,

    /// Textual principal of the user.
    pub principal: String,
}

/// The result of an `eth_address_for` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthAddressResponse {
    /// The user's address with its EIP-55 checksum.
    pub eth_address: String,
}

/// Derives the Ethereum address of `user` under `root`.
pub(crate) fn eth_address_for(
    root: &PublicKeyWithChainCode<Secp256k1>,
    user: &Principal,
) -> Result<(EthAddressRequest, EthAddressResponse), SignerError> {
    let derived = root.derive_subkey_with_chain_code(&eth_derivation_path(user))?;

    // the address hashes the 64 byte x || y, without the 0x04 tag
    let uncompressed = derived.public_key.point().serialize_uncompressed();
    let address = Address::from_raw_public_key(&uncompressed[1..]).to_checksum(None);

    debug!(
        %user,
        user_key = %derived.public_key.to_hex(),
        %address,
        "derived ethereum address"
    );

    let request = EthAddressRequest {
        pubkey: root.public_key,
        chaincode: root.chain_code,
        principal: user.to_text(),
    };

    Ok((request, EthAddressResponse { eth_address: address }))
}
