//! Derivation paths.
//!
//! A path is an ordered list of opaque byte strings. The engines give the bytes no meaning;
//! callers encode domain separators, principals or labels before building a path.
//!
//! The text form joins the blob encoding of each component with `/`:
//!
//! | Path                          | Text        |
//! |-------------------------------|-------------|
//! | `[]`                          | *absent*    |
//! | `["hello"]`                   | `hello`     |
//! | `[[], [], "aloha", []]`       | `//aloha/`  |
//! | `["SETI@home"]`               | `SETI\40home` |
//!
//! The empty path has no text form, so that a path with a single empty component (text `""`)
//! survives a round trip.

use std::str::FromStr;

use ic_principal::Principal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    encoding::{decode_blob, encode_blob},
    ChainCode, CkdEngine, DerivationError,
};

/// One component of a derivation path.
pub type PathComponent = Vec<u8>;

/// Separator between blob-encoded components.
const SEPARATOR: &str = "/";

/// An ordered sequence of path components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<PathComponent>);

impl DerivationPath {
    /// Creates a path from its components.
    pub const fn new(components: Vec<PathComponent>) -> Self {
        Self(components)
    }

    /// Creates a path for a key used by a canister: the canister's principal bytes come first,
    /// followed by the given components.
    ///
    /// This is how the platform scopes threshold keys to the canister that requested them.
    pub fn with_canister_prefix<I, C>(canister_id: &Principal, components: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<PathComponent>,
    {
        let prefix = Self(vec![canister_id.as_slice().to_vec()]);
        let rest: Self = components.into_iter().map(Into::into).collect();
        prefix.concat(&rest)
    }

    /// Parses a path from its text form. `None` is the empty path.
    ///
    /// # Example
    ///
    /// ```
    /// use ic_pub_key_deriv::DerivationPath;
    ///
    /// let path = DerivationPath::from_blob(Some(r"part1/SETI\40home")).unwrap();
    /// assert_eq!(path.components(), &[b"part1".to_vec(), b"SETI@home".to_vec()]);
    ///
    /// assert!(DerivationPath::from_blob(None).unwrap().is_empty());
    /// ```
    pub fn from_blob(blob: Option<&str>) -> Result<Self, DerivationError> {
        let Some(blob) = blob else {
            return Ok(Self::default());
        };
        blob.split(SEPARATOR)
            .map(decode_blob)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Returns the text form, or `None` for the empty path.
    pub fn to_blob(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.0.iter().map(|c| encode_blob(c)).collect();
        Some(parts.join(SEPARATOR))
    }

    /// Returns a new path with the components of `other` appended to ours.
    pub fn concat(&self, other: &Self) -> Self {
        Self(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    /// Returns the components in derivation order.
    pub fn components(&self) -> &[PathComponent] {
        &self.0
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the zero-component path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the components in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Folds the path over `point` and `chain_code`.
    ///
    /// Returns the final point, the sum of all step offsets modulo the group order and the final
    /// chain code. The offset sum is only of diagnostic interest; for any path,
    /// `point_out == point_in + offset * G`.
    pub fn derive_offset<E: CkdEngine>(
        &self,
        point: &E::Point,
        chain_code: &ChainCode,
    ) -> Result<(E::Point, E::Scalar, ChainCode), DerivationError> {
        let mut point = point.clone();
        let mut sum = E::zero();
        let mut chain_code = *chain_code;

        for (step, idx) in self.iter().enumerate() {
            let (next_chain_code, offset, next_point) = E::ckd_pub(idx, &point, &chain_code)?;
            sum = E::add_offsets(&sum, &offset);
            point = next_point;
            chain_code = next_chain_code;
            trace!(curve = E::CURVE, %step, idx_len = idx.len(), "derived path component");
        }

        Ok((point, sum, chain_code))
    }
}

impl From<Vec<PathComponent>> for DerivationPath {
    fn from(components: Vec<PathComponent>) -> Self {
        Self(components)
    }
}

impl FromIterator<PathComponent> for DerivationPath {
    fn from_iter<T: IntoIterator<Item = PathComponent>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses a present text form, same as [`DerivationPath::from_blob`] with `Some(s)`.
///
/// Every string parses to at least one component: `""` is `[[]]`, never the empty path. There is
/// no `Display` counterpart, because the empty path has no text; use
/// [`DerivationPath::to_blob`], which returns `None` for it.
impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_blob(Some(s))
    }
}

impl Serialize for DerivationPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_blob().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let blob = Option::<String>::deserialize(deserializer)?;
        Self::from_blob(blob.as_deref()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn blob_vectors() -> Vec<(Option<&'static str>, DerivationPath)> {
        vec![
            (None, DerivationPath::default()),
            (Some("hello"), DerivationPath::new(vec![b"hello".to_vec()])),
            (
                Some("multi/part/path"),
                DerivationPath::new(vec![b"multi".to_vec(), b"part".to_vec(), b"path".to_vec()]),
            ),
            (
                Some("//aloha/"),
                DerivationPath::new(vec![vec![], vec![], b"aloha".to_vec(), vec![]]),
            ),
            (Some(""), DerivationPath::new(vec![vec![]])),
            (
                Some(r"\00\ff/SETI\40home"),
                DerivationPath::new(vec![vec![0x00, 0xff], b"SETI@home".to_vec()]),
            ),
        ]
    }

    #[test]
    fn test_to_blob() {
        for (blob, path) in blob_vectors() {
            assert_eq!(path.to_blob().as_deref(), blob, "path: {path:?}");
        }
    }

    #[test]
    fn test_from_blob() {
        for (blob, path) in blob_vectors() {
            assert_eq!(DerivationPath::from_blob(blob).unwrap(), path, "blob: {blob:?}");
        }
    }

    #[test]
    fn test_from_blob_rejects_incomplete_escape() {
        assert_eq!(
            DerivationPath::from_blob(Some(r"ok/bad\4")),
            Err(DerivationError::IncompleteEscape)
        );
    }

    #[test]
    fn test_concat() {
        let a = DerivationPath::new(vec![vec![0]]);
        let b = DerivationPath::new(vec![b"x".to_vec(), b"y".to_vec()]);
        let joined = a.concat(&b);
        assert_eq!(joined.components(), &[vec![0], b"x".to_vec(), b"y".to_vec()]);
        // inputs are untouched
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
        assert_eq!(DerivationPath::default().concat(&b), b);
    }

    #[test]
    fn test_with_canister_prefix() {
        let canister = Principal::from_text("h5jwf-5iaaa-aaaan-qmvoa-cai").unwrap();
        let path = DerivationPath::with_canister_prefix(&canister, [b"Hello".as_slice()]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.components()[0], canister.as_slice());
        assert_eq!(path.components()[1], b"Hello");
    }

    #[test]
    fn test_from_str() {
        let path: DerivationPath = "a/b".parse().unwrap();
        assert_eq!(path.to_blob().as_deref(), Some("a/b"));

        // an empty string is one empty component, not the empty path
        let single_empty: DerivationPath = "".parse().unwrap();
        assert_eq!(single_empty, DerivationPath::new(vec![vec![]]));
        assert_eq!(single_empty.to_blob().as_deref(), Some(""));
        assert_eq!(DerivationPath::default().to_blob(), None);

        for path in [single_empty, path] {
            let text = path.to_blob().unwrap();
            assert_eq!(text.parse::<DerivationPath>().unwrap(), path);
        }
    }

    #[test]
    fn test_serde_uses_null_for_empty_path() {
        assert_eq!(serde_json::to_string(&DerivationPath::default()).unwrap(), "null");
        let path = DerivationPath::new(vec![b"hello".to_vec(), vec![]]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"hello/\"");
        assert_eq!(serde_json::from_str::<DerivationPath>(&json).unwrap(), path);
        assert_eq!(
            serde_json::from_str::<DerivationPath>("null").unwrap(),
            DerivationPath::default()
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn blob_roundtrip(
            components in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..16),
                0..6,
            )
        ) {
            let path = DerivationPath::new(components);
            let blob = path.to_blob();
            prop_assert_eq!(DerivationPath::from_blob(blob.as_deref()).unwrap(), path);
        }
    }
}
