//! The child key derivation capability shared by both curves.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::{ChainCode, DerivationError, EncodedPublicKey};

/// A curve together with its single-step child key derivation.
///
/// Implementors are zero-sized markers; all state flows through the arguments.
pub trait CkdEngine: fmt::Debug + Clone + Copy + PartialEq + Eq + 'static {
    /// Curve name, used in logs.
    const CURVE: &'static str;

    /// The encoded public key type of this curve.
    type PublicKey: EncodedPublicKey
        + fmt::Debug
        + Clone
        + PartialEq
        + Eq
        + Serialize
        + DeserializeOwned;

    /// A decoded curve point.
    type Point: fmt::Debug + Clone;

    /// An offset, reduced modulo the group order.
    type Scalar: fmt::Debug + Clone + PartialEq;

    /// Decodes a public key into its point.
    fn point(public_key: &Self::PublicKey) -> Self::Point;

    /// Encodes a point as a public key.
    fn public_key(point: &Self::Point) -> Result<Self::PublicKey, DerivationError>;

    /// The additive identity of the scalar field.
    fn zero() -> Self::Scalar;

    /// Adds two offsets modulo the group order.
    fn add_offsets(sum: &Self::Scalar, offset: &Self::Scalar) -> Self::Scalar;

    /// Derives one path component.
    ///
    /// Returns the next chain code, the offset applied in this step and the next point, where
    /// `next_point = point + offset * G`.
    fn ckd_pub(
        idx: &[u8],
        point: &Self::Point,
        chain_code: &ChainCode,
    ) -> Result<(ChainCode, Self::Scalar, Self::Point), DerivationError>;
}
