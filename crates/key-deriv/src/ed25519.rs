//! ed25519 non-hardened child key derivation.
//!
//! Each step expands `HKDF-SHA512(salt = chain_code, ikm = point || idx, info = "Ed25519")` to
//! 96 bytes. The first 64 bytes, read big-endian and reduced modulo the group order, are the
//! offset; the last 32 bytes are the next chain code.

use std::fmt;

use curve25519_dalek::{
    edwards::{CompressedEdwardsY, EdwardsPoint},
    traits::IsIdentity,
    Scalar,
};
use hkdf::Hkdf;
use sha2::Sha512;

use crate::{ChainCode, CkdEngine, DerivationError, EncodedPublicKey};

/// Length of an encoded ed25519 point.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// HKDF info string for every derivation step.
const HKDF_INFO: &[u8] = b"Ed25519";

/// Length of the HKDF output: a 64 byte offset followed by a 32 byte chain code.
const OKM_LENGTH: usize = 96;

/// An ed25519 public key. Never the identity point.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519PublicKey {
    bytes: [u8; ED25519_PUBLIC_KEY_LENGTH],
    point: EdwardsPoint,
}

impl Ed25519PublicKey {
    /// Returns the decoded point.
    pub const fn point(&self) -> &EdwardsPoint {
        &self.point
    }

    /// Returns the 32 byte encoding.
    pub const fn to_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_LENGTH] {
        self.bytes
    }
}

impl EncodedPublicKey for Ed25519PublicKey {
    const LENGTH: usize = ED25519_PUBLIC_KEY_LENGTH;

    fn from_bytes(bytes: &[u8]) -> Result<Self, DerivationError> {
        let bytes: [u8; ED25519_PUBLIC_KEY_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| DerivationError::InvalidLength {
                    what: "public key",
                    expected: Self::LENGTH,
                    actual: bytes.len(),
                })?;
        let point = CompressedEdwardsY(bytes).decompress().ok_or_else(|| {
            DerivationError::InvalidPoint("bytes are not an encoded ed25519 point".to_string())
        })?;
        // dalek accepts y >= p and a sign bit on x = 0, which re-encode to other bytes
        if point.compress().to_bytes() != bytes {
            return Err(DerivationError::InvalidPoint(
                "non-canonical ed25519 point encoding".to_string(),
            ));
        }
        Self::try_from(point)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<EdwardsPoint> for Ed25519PublicKey {
    type Error = DerivationError;

    fn try_from(point: EdwardsPoint) -> Result<Self, Self::Error> {
        if point.is_identity() {
            return Err(DerivationError::InvalidPoint(
                "the identity point is not a public key".to_string(),
            ));
        }
        Ok(Self {
            bytes: point.compress().to_bytes(),
            point,
        })
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ed25519PublicKey")
            .field(&self.to_hex())
            .finish()
    }
}

impl fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl_hex_serde!(Ed25519PublicKey);

/// The ed25519 derivation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ed25519;

impl Ed25519 {
    /// Reduces the first 64 bytes of the HKDF output, read big-endian, modulo the group order.
    pub fn offset_from_okm(okm: &[u8; OKM_LENGTH]) -> Scalar {
        let mut wide = [0u8; 64];
        wide.copy_from_slice(&okm[..64]);
        // dalek reads scalars little-endian
        wide.reverse();
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    /// Derives the child point for one path component.
    ///
    /// Returns the next chain code, the offset and `point + offset * B`. A child at the identity
    /// point is reported as [`DerivationError::InvalidPoint`].
    pub fn ckd_pub(
        idx: &[u8],
        point: &EdwardsPoint,
        chain_code: &ChainCode,
    ) -> Result<(ChainCode, Scalar, EdwardsPoint), DerivationError> {
        let mut ikm = Vec::with_capacity(ED25519_PUBLIC_KEY_LENGTH + idx.len());
        ikm.extend_from_slice(point.compress().as_bytes());
        ikm.extend_from_slice(idx);

        let hkdf = Hkdf::<Sha512>::new(Some(chain_code.as_bytes()), &ikm);
        let mut okm = [0u8; OKM_LENGTH];
        hkdf.expand(HKDF_INFO, &mut okm)
            .map_err(|_| DerivationError::InternalInvariantViolation("invalid HKDF output length"))?;

        let offset = Self::offset_from_okm(&okm);
        let next_chain_code = ChainCode::from_bytes(&okm[64..]).map_err(|_| {
            DerivationError::InternalInvariantViolation("invalid HKDF output length")
        })?;

        let next_point = point + EdwardsPoint::mul_base(&offset);
        if next_point.is_identity() {
            return Err(DerivationError::InvalidPoint(
                "derived point is the identity".to_string(),
            ));
        }

        Ok((next_chain_code, offset, next_point))
    }
}

impl CkdEngine for Ed25519 {
    const CURVE: &'static str = "ed25519";

    type PublicKey = Ed25519PublicKey;
    type Point = EdwardsPoint;
    type Scalar = Scalar;

    fn point(public_key: &Self::PublicKey) -> Self::Point {
        public_key.point
    }

    fn public_key(point: &Self::Point) -> Result<Self::PublicKey, DerivationError> {
        Ed25519PublicKey::try_from(*point)
    }

    fn zero() -> Self::Scalar {
        Scalar::ZERO
    }

    fn add_offsets(sum: &Self::Scalar, offset: &Self::Scalar) -> Self::Scalar {
        sum + offset
    }

    fn ckd_pub(
        idx: &[u8],
        point: &Self::Point,
        chain_code: &ChainCode,
    ) -> Result<(ChainCode, Self::Scalar, Self::Point), DerivationError> {
        Self::ckd_pub(idx, point, chain_code)
    }
}
