//! Derivation paths used by the chain fusion signer.
//!
//! Every per-user key is derived from the signer's root key with a two component path: a one
//! byte domain separator naming the address family, then the raw bytes of the user's principal.
//! Changing this layout changes every address the signer hands out.

use ic_principal::Principal;
use ic_pub_key_deriv::DerivationPath;

/// Domain separator for Bitcoin addresses.
pub const BTC_DOMAIN_SEPARATOR: u8 = 0x00;

/// Domain separator for Ethereum addresses.
pub const ETH_DOMAIN_SEPARATOR: u8 = 0x01;

/// Builds the path `[domain_separator, user]`.
pub fn signer_derivation_path(domain_separator: u8, user: &Principal) -> DerivationPath {
    DerivationPath::new(vec![vec![domain_separator], user.as_slice().to_vec()])
}

/// Path of the key behind a user's Bitcoin addresses.
pub fn btc_derivation_path(user: &Principal) -> DerivationPath {
    signer_derivation_path(BTC_DOMAIN_SEPARATOR, user)
}

/// Path of the key behind a user's Ethereum address.
pub fn eth_derivation_path(user: &Principal) -> DerivationPath {
    signer_derivation_path(ETH_DOMAIN_SEPARATOR, user)
}
