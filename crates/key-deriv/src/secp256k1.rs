//! secp256k1 non-hardened child key derivation.
//!
//! Reproduces the platform's derivation for ECDSA and BIP340 keys bit for bit, including the
//! SLIP-0010 "try next" rules:
//!
//! 1. `H = HMAC-SHA512(chain_code, ckd_input || idx)`, where `ckd_input` starts as the
//!    compressed parent point.
//! 2. The offset is `H[0..32]` read big-endian and the next chain code is `H[32..64]`.
//! 3. If the offset is not below the group order, `ckd_input` becomes `0x01 || H[32..64]` and the
//!    step is repeated.
//! 4. If `point + offset * G` is the point at infinity, `ckd_input` becomes `0x01 || H[32..64]`
//!    and the step is repeated.

use std::fmt;

use ::secp256k1::{PublicKey, Scalar, SECP256K1};
use ethnum::U256;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::trace;

use crate::{ChainCode, CkdEngine, DerivationError, EncodedPublicKey};

/// Length of a compressed SEC1 public key.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;

/// The secp256k1 group order, which is also the scalar modulus.
pub const GROUP_ORDER: U256 = U256::from_words(
    0xFFFF_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF_FFFE,
    0xBAAE_DCE6_AF48_A03B_BFD2_5E8C_D036_4141,
);

/// Length of an HMAC-SHA512 output.
const HMAC_OUTPUT_LENGTH: usize = 64;

/// Upper bound on "try next" rounds within a single step.
///
/// A single retry happens with probability below 2^-127.
const MAX_CKD_ATTEMPTS: usize = 256;

type HmacSha512 = Hmac<Sha512>;

/// A secp256k1 public key, represented as a 33 byte compressed SEC1 encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secp256k1PublicKey {
    bytes: [u8; SECP256K1_PUBLIC_KEY_LENGTH],
    point: PublicKey,
}

impl Secp256k1PublicKey {
    /// Returns the decoded point.
    pub const fn point(&self) -> &PublicKey {
        &self.point
    }

    /// Returns the 33 byte compressed encoding.
    pub const fn to_bytes(&self) -> [u8; SECP256K1_PUBLIC_KEY_LENGTH] {
        self.bytes
    }
}

impl EncodedPublicKey for Secp256k1PublicKey {
    const LENGTH: usize = SECP256K1_PUBLIC_KEY_LENGTH;

    fn from_bytes(bytes: &[u8]) -> Result<Self, DerivationError> {
        if bytes.len() != Self::LENGTH {
            return Err(DerivationError::InvalidLength {
                what: "public key",
                expected: Self::LENGTH,
                actual: bytes.len(),
            });
        }
        let point =
            PublicKey::from_slice(bytes).map_err(|e| DerivationError::InvalidPoint(e.to_string()))?;
        Ok(point.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<PublicKey> for Secp256k1PublicKey {
    fn from(point: PublicKey) -> Self {
        Self {
            bytes: point.serialize(),
            point,
        }
    }
}

impl fmt::Debug for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secp256k1PublicKey")
            .field(&self.to_hex())
            .finish()
    }
}

impl fmt::Display for Secp256k1PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl_hex_serde!(Secp256k1PublicKey);

/// The secp256k1 derivation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Secp256k1;

impl Secp256k1 {
    /// Computes the next chain code and the offset for one path component.
    ///
    /// `ckd_input` is the compressed parent point, or `0x01 || chain code` on a retry. The
    /// returned offset is strictly below [`GROUP_ORDER`].
    pub fn ckd(
        idx: &[u8],
        ckd_input: &[u8; SECP256K1_PUBLIC_KEY_LENGTH],
        chain_code: &ChainCode,
    ) -> Result<(ChainCode, U256), DerivationError> {
        let mut input = *ckd_input;

        for _ in 0..MAX_CKD_ATTEMPTS {
            let mut mac = HmacSha512::new_from_slice(chain_code.as_bytes()).map_err(|_| {
                DerivationError::InternalInvariantViolation("HMAC rejected the chain code")
            })?;
            mac.update(&input);
            mac.update(idx);
            let output = mac.finalize().into_bytes();

            if output.len() != HMAC_OUTPUT_LENGTH {
                return Err(DerivationError::InternalInvariantViolation(
                    "invalid HMAC output length",
                ));
            }
            let (offset_bytes, next_chain_key) = output.split_at(HMAC_OUTPUT_LENGTH / 2);
            let offset_bytes: [u8; 32] = offset_bytes.try_into().map_err(|_| {
                DerivationError::InternalInvariantViolation("invalid HMAC output length")
            })?;
            let next_chain_code = ChainCode::from_bytes(next_chain_key).map_err(|_| {
                DerivationError::InternalInvariantViolation("invalid HMAC output length")
            })?;

            let offset = U256::from_be_bytes(offset_bytes);
            if offset < GROUP_ORDER {
                return Ok((next_chain_code, offset));
            }

            trace!(%offset, "offset is not below the group order, retrying");
            set_retry_input(&mut input, &next_chain_code);
        }

        Err(DerivationError::InternalInvariantViolation(
            "no valid offset found",
        ))
    }

    /// Derives the child point for one path component.
    ///
    /// Returns the next chain code, the offset and `point + offset * G`.
    pub fn ckd_pub(
        idx: &[u8],
        point: &PublicKey,
        chain_code: &ChainCode,
    ) -> Result<(ChainCode, U256, PublicKey), DerivationError> {
        let mut ckd_input = point.serialize();

        for _ in 0..MAX_CKD_ATTEMPTS {
            let (next_chain_code, next_offset) = Self::ckd(idx, &ckd_input, chain_code)?;
            let tweak = Scalar::from_be_bytes(next_offset.to_be_bytes()).map_err(|_| {
                DerivationError::InternalInvariantViolation("offset is not below the group order")
            })?;

            // Tweaking only fails when the sum is the point at infinity.
            match point.add_exp_tweak(SECP256K1, &tweak) {
                Ok(next_point) => return Ok((next_chain_code, next_offset, next_point)),
                Err(_) => {
                    trace!("derived point is the identity, retrying");
                    set_retry_input(&mut ckd_input, &next_chain_code);
                }
            }
        }

        Err(DerivationError::InternalInvariantViolation(
            "no valid child point found",
        ))
    }
}

impl CkdEngine for Secp256k1 {
    const CURVE: &'static str = "secp256k1";

    type PublicKey = Secp256k1PublicKey;
    type Point = PublicKey;
    type Scalar = U256;

    fn point(public_key: &Self::PublicKey) -> Self::Point {
        public_key.point
    }

    fn public_key(point: &Self::Point) -> Result<Self::PublicKey, DerivationError> {
        Ok((*point).into())
    }

    fn zero() -> Self::Scalar {
        U256::ZERO
    }

    fn add_offsets(sum: &Self::Scalar, offset: &Self::Scalar) -> Self::Scalar {
        add_mod_order(*sum, *offset)
    }

    fn ckd_pub(
        idx: &[u8],
        point: &Self::Point,
        chain_code: &ChainCode,
    ) -> Result<(ChainCode, Self::Scalar, Self::Point), DerivationError> {
        Self::ckd_pub(idx, point, chain_code)
    }
}

/// Replaces the HMAC input with `0x01 || chain_code`.
fn set_retry_input(input: &mut [u8; SECP256K1_PUBLIC_KEY_LENGTH], chain_code: &ChainCode) {
    input[0] = 0x01;
    input[1..].copy_from_slice(chain_code.as_bytes());
}

/// Adds two values below the group order, modulo the group order.
fn add_mod_order(a: U256, b: U256) -> U256 {
    let (sum, overflowed) = a.overflowing_add(b);
    if overflowed || sum >= GROUP_ORDER {
        sum.wrapping_sub(GROUP_ORDER)
    } else {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DerivationPath, PublicKeyWithChainCode};

    const PUBLIC_KEY: &str = "02b84ff3f88329a887657d0309bd1a1af9e37601e5d1a535d6fe7d42e37f79f40a";
    const CHAIN_CODE: &str = "212891bc032f28d369bacf39dc369feb516eced9a3d83498246aead1546f8cd1";

    fn u256(hex: &str) -> U256 {
        U256::from_str_radix(hex, 16).unwrap()
    }

    fn hex_path(components: &[&str]) -> DerivationPath {
        components.iter().map(|c| hex::decode(c).unwrap()).collect()
    }

    #[test]
    fn test_group_order() {
        assert_eq!(
            format!("{GROUP_ORDER:x}"),
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141"
        );
    }

    #[test]
    fn test_public_key_validation() {
        let key = Secp256k1PublicKey::from_hex(PUBLIC_KEY).unwrap();
        assert_eq!(key.to_hex(), PUBLIC_KEY);
        assert_eq!(Secp256k1PublicKey::from_blob(&key.to_blob()).unwrap(), key);
        assert_eq!(Secp256k1PublicKey::from_string(PUBLIC_KEY).unwrap(), key);

        assert!(matches!(
            Secp256k1PublicKey::from_bytes(&[2u8; 32]),
            Err(DerivationError::InvalidLength { expected: 33, actual: 32, .. })
        ));
        assert!(matches!(
            Secp256k1PublicKey::from_hex(&PUBLIC_KEY[..64]),
            Err(DerivationError::InvalidLength { expected: 66, actual: 64, .. })
        ));
        // x coordinate above the field prime
        let mut bytes = [0xffu8; 33];
        bytes[0] = 0x02;
        assert!(matches!(
            Secp256k1PublicKey::from_bytes(&bytes),
            Err(DerivationError::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_ckd_intermediate_values() {
        // (idx, input, chain code, expected chain code, expected offset)
        let vectors = [
            (
                "32",
                "02b84ff3f88329a887657d0309bd1a1af9e37601e5d1a535d6fe7d42e37f79f40a",
                "212891bc032f28d369bacf39dc369feb516eced9a3d83498246aead1546f8cd1",
                "d3b43395240d28d15c964eea25335f14a8503408a4db7f43e064f221bbe25538",
                "836D7173E13272F2E7D24D16769A6F10C98B895D5F2197AD69BE29E076A4ABB8",
            ),
            (
                "32",
                "030466da666fe067f52cb5337a72e7722123ab3fc82f92b8a5f92b89d0e9bbd6e1",
                "8b51936ff7862e556e31f1116a657469f00083497062db2e8ee9573e3346a83a",
                "dba76c03b90277cc32aaac3537bb5089866b21203704d00ac00ca9056e9b3e26",
                "CAC00A9834CCFAB17DAE8A6F56EADAC08EF6C8E005A449DADA7A79248812E681",
            ),
            (
                "343434",
                "0311ed203a11691bd67280c80855066661313681a2de6f757561b86008bbc88781",
                "dba76c03b90277cc32aaac3537bb5089866b21203704d00ac00ca9056e9b3e26",
                "c50374a8085c276b142f5bcf685d3eb952795c25562817dacce61db7f409af34",
                "3D853DAFCB4D63BAB8F78EDBE3A23CC8FDEFCF19594DA60E8C09B10DAF4AC121",
            ),
            (
                "3636363636",
                "03485ca57ebe59374af37a7d4dd7d2a151e0ab6cdc3c60cc03e808329ddf7cc61c",
                "699dd6e531b15000ddb1ddb52231542696a3e11b7e2cb3fef54ecb0c8f96ff61",
                "bc35b8515f03aa1543081e2af4e878f28b27f3ce00c035f4068702d33ee88586",
                "5E2D4DC916834E3909F64DE9EDA724222AB8488D19F4A0F7707D2AFB4BF9DAD5",
            ),
            (
                "3636363636",
                "02efef21368c880869698c42477b32cb58b1bd3ff8395a2dbab138e2c23296675e",
                "c50374a8085c276b142f5bcf685d3eb952795c25562817dacce61db7f409af34",
                "4741d01b413e340d0a253e8adf860fd28cea1eebfad71493bac7476e6d20b1ab",
                "D8472603120A3DDE9D15BD0652036ED533FDA06F63240879C4A2BBAB1E384029",
            ),
            (
                "32",
                "03d81a2def33c99ce5e60138d66e68474ab3560ee26882c26ea790bf6ecfa2a213",
                "4698afadc51f3b38434e66f35ae73d37347446cf0a0bcbda43ed7a7e0cd9efa7",
                "cdee7e11e08bbf40133987e5e6d9fd53dd032d4c7e4a358e79cb2f0a20bab3a6",
                "FFDE916B1BFCC426C1FEC9BFCA3D8DB0334B2196A775436E7E0D8909E2A27BC2",
            ),
        ];

        for (idx, input, chain_code, expected_chain_code, expected_offset) in vectors {
            let input: [u8; 33] = hex::decode(input).unwrap().try_into().unwrap();
            let (chain_code, offset) = Secp256k1::ckd(
                &hex::decode(idx).unwrap(),
                &input,
                &ChainCode::from_hex(chain_code).unwrap(),
            )
            .unwrap();
            assert_eq!(chain_code.to_hex(), expected_chain_code);
            assert_eq!(offset, u256(expected_offset));
        }
    }

    #[test]
    fn test_set_retry_input() {
        let mut input: [u8; 33] = hex::decode(PUBLIC_KEY).unwrap().try_into().unwrap();
        let chain_code = ChainCode::from_hex(CHAIN_CODE).unwrap();

        set_retry_input(&mut input, &chain_code);

        assert_eq!(input[0], 0x01);
        assert_eq!(&input[1..], chain_code.as_bytes());
    }

    #[test]
    fn test_ckd_accepts_retry_input() {
        // the input a retry feeds back: 0x01 || the chain code of the rejected round
        let rejected_chain_code =
            ChainCode::from_hex("d3b43395240d28d15c964eea25335f14a8503408a4db7f43e064f221bbe25538")
                .unwrap();
        let mut input = [0u8; 33];
        set_retry_input(&mut input, &rejected_chain_code);

        let chain_code = ChainCode::from_hex(CHAIN_CODE).unwrap();
        let idx = [0x32];

        let mut mac = HmacSha512::new_from_slice(chain_code.as_bytes()).unwrap();
        mac.update(&[0x01]);
        mac.update(rejected_chain_code.as_bytes());
        mac.update(&idx);
        let expected = mac.finalize().into_bytes();
        let expected_offset = U256::from_be_bytes(expected[..32].try_into().unwrap());
        assert!(expected_offset < GROUP_ORDER);

        let (next_chain_code, offset) = Secp256k1::ckd(&idx, &input, &chain_code).unwrap();
        assert_eq!(offset, expected_offset);
        assert_eq!(next_chain_code.as_bytes().as_slice(), &expected[32..]);
    }

    #[test]
    fn test_ckd_pub_single_step() {
        let key = Secp256k1PublicKey::from_hex(PUBLIC_KEY).unwrap();
        let (chain_code, offset, point) = Secp256k1::ckd_pub(
            &[0x32],
            key.point(),
            &ChainCode::from_hex(CHAIN_CODE).unwrap(),
        )
        .unwrap();

        assert_eq!(
            chain_code.to_hex(),
            "d3b43395240d28d15c964eea25335f14a8503408a4db7f43e064f221bbe25538"
        );
        assert_eq!(
            offset,
            u256("836D7173E13272F2E7D24D16769A6F10C98B895D5F2197AD69BE29E076A4ABB8")
        );
        assert_eq!(
            Secp256k1PublicKey::from(point).to_hex(),
            "0294ec9089b53c8d937cfb18ccdb4e9f39dcf2fae87eb24deb8143bcb2168150d9"
        );
    }

    #[test]
    fn test_derive_offset() {
        let key = Secp256k1PublicKey::from_hex(PUBLIC_KEY).unwrap();
        let path = hex_path(&["32", "343434", "3636363636"]);

        let (point, offset, chain_code) = path
            .derive_offset::<Secp256k1>(key.point(), &ChainCode::from_hex(CHAIN_CODE).unwrap())
            .unwrap();

        assert_eq!(
            Secp256k1PublicKey::from(point).to_hex(),
            "024bf78e40bb51d2c6c14c11aa8f3af1549741de5acdf925e6dc230dfc5daa22d9"
        );
        assert_eq!(
            offset,
            u256("5846fde4ab7e56e02a9631b460221746a74e236a8a5dee9681b1b1c646d6b661")
        );
        assert_eq!(
            chain_code.to_hex(),
            "bc35b8515f03aa1543081e2af4e878f28b27f3ce00c035f4068702d33ee88586"
        );

        // The accumulated offset moves the root point straight to the derived one.
        let tweak = Scalar::from_be_bytes(offset.to_be_bytes()).unwrap();
        assert_eq!(key.point().add_exp_tweak(SECP256K1, &tweak).unwrap(), point);
    }

    #[test]
    fn test_derive_subkey_with_chain_code() {
        let root = PublicKeyWithChainCode::<Secp256k1>::from_hex(PUBLIC_KEY, CHAIN_CODE).unwrap();
        let path = DerivationPath::from_blob(Some("2/444/66666")).unwrap();
        assert_eq!(path, hex_path(&["32", "343434", "3636363636"]));

        let derived = root.derive_subkey_with_chain_code(&path).unwrap();
        assert_eq!(
            derived.to_hex(),
            (
                "024bf78e40bb51d2c6c14c11aa8f3af1549741de5acdf925e6dc230dfc5daa22d9".to_string(),
                "bc35b8515f03aa1543081e2af4e878f28b27f3ce00c035f4068702d33ee88586".to_string()
            )
        );

        // deterministic
        assert_eq!(root.derive_subkey_with_chain_code(&path).unwrap(), derived);
    }

    #[test]
    fn test_empty_path_is_identity() {
        let root = PublicKeyWithChainCode::<Secp256k1>::from_hex(PUBLIC_KEY, CHAIN_CODE).unwrap();
        let derived = root
            .derive_subkey_with_chain_code(&DerivationPath::default())
            .unwrap();
        assert_eq!(derived, root);
    }

    #[test]
    fn test_add_mod_order() {
        let max = GROUP_ORDER - U256::ONE;
        assert_eq!(add_mod_order(max, U256::ONE), U256::ZERO);
        assert_eq!(add_mod_order(max, max), GROUP_ORDER - U256::new(2));
        assert_eq!(add_mod_order(U256::ONE, U256::ONE), U256::new(2));
    }

    #[test]
    fn test_serde_as_hex() {
        let root = PublicKeyWithChainCode::<Secp256k1>::from_hex(PUBLIC_KEY, CHAIN_CODE).unwrap();
        let json = serde_json::to_string(&root).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"public_key":"{PUBLIC_KEY}","chain_code":"{CHAIN_CODE}"}}"#)
        );
        let back: PublicKeyWithChainCode<Secp256k1> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root);
    }
}
