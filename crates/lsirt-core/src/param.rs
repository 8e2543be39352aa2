//! # Parameter Column Keys
//!
//! The sampler names each scalar of a latent coordinate matrix
//! `<prefix>[<entity>,<dimension>]` with 1-based indices, e.g. `xi[3,2]`.
//! Every stage that looks up or writes coordinate columns goes through
//! [`ParamKey`] so the token format lives in exactly one place.
//!
//! ## Wire Format
//!
//! `bracket-v1`: prefix, `[`, entity index, `,`, dimension index, `]`.
//! No whitespace, no zero indices. Any other rendering (CmdStan's dotted
//! `xi.3.2`, for instance) is rejected rather than guessed at.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParamKeyError;

/// Version tag of the column token format produced and accepted here.
pub const PARAM_KEY_FORMAT: &str = "bracket-v1";

/// A `(prefix, entity, dimension)` coordinate column key, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamKey {
    prefix: String,
    entity: usize,
    dimension: usize,
}

impl ParamKey {
    /// Build a key from 1-based indices.
    pub fn new(prefix: impl Into<String>, entity: usize, dimension: usize) -> Self {
        Self {
            prefix: prefix.into(),
            entity,
            dimension,
        }
    }

    /// Build a key from 0-based matrix indices (`[row, col]`).
    pub fn from_matrix_index(prefix: impl Into<String>, row: usize, col: usize) -> Self {
        Self::new(prefix, row + 1, col + 1)
    }

    /// The coordinate family prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 1-based entity index.
    pub fn entity(&self) -> usize {
        self.entity
    }

    /// 1-based dimension index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The column name this key maps to.
    pub fn column_name(&self) -> String {
        self.to_string()
    }

    /// Parse a column name.
    ///
    /// # Errors
    ///
    /// [`ParamKeyError::Malformed`] if the name is not `prefix[i,d]`,
    /// [`ParamKeyError::ZeroIndex`] if either index is zero.
    pub fn parse(name: &str) -> Result<Self, ParamKeyError> {
        let malformed = || ParamKeyError::Malformed(name.to_string());

        let body = name.strip_suffix(']').ok_or_else(malformed)?;
        let open = body.rfind('[').ok_or_else(malformed)?;
        let prefix = &body[..open];
        let (entity, dimension) = body[open + 1..].split_once(',').ok_or_else(malformed)?;

        if prefix.is_empty() || prefix.contains(char::is_whitespace) {
            return Err(malformed());
        }
        let entity = parse_index(entity).ok_or_else(malformed)?;
        let dimension = parse_index(dimension).ok_or_else(malformed)?;
        if entity == 0 || dimension == 0 {
            return Err(ParamKeyError::ZeroIndex(name.to_string()));
        }

        Ok(Self::new(prefix, entity, dimension))
    }
}

/// Digits only; `usize::from_str` alone would accept a leading `+`.
fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl std::fmt::Display for ParamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{},{}]", self.prefix, self.entity, self.dimension)
    }
}

impl FromStr for ParamKey {
    type Err = ParamKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any rendered key parses back to itself.
        #[test]
        fn rendered_keys_parse(prefix in "[a-z_][a-z0-9_]{0,12}", entity in 1usize..10_000, dimension in 1usize..16) {
            let key = ParamKey::new(prefix, entity, dimension);
            prop_assert_eq!(ParamKey::parse(&key.column_name()), Ok(key));
        }

        /// Parsing never panics on arbitrary input.
        #[test]
        fn parse_never_panics(raw in ".{0,32}") {
            let _ = ParamKey::parse(&raw);
        }
    }
}
