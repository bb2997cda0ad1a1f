//! Identifier types for catalog entities.
//!
//! Ids are stable integers assigned by the remote catalog; they are never
//! minted locally.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a pokemon in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PokemonId(i64);

impl PokemonId {
    /// Creates an id from a raw integer.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PokemonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PokemonId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<i64> for PokemonId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Lookup key for a pokemon: either its unique name or its numeric id.
/// The remote catalog resolves both through the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PokemonKey {
    Id(PokemonId),
    Name(String),
}

impl PokemonKey {
    /// Parses a path-style key: all-digit strings become ids, anything else
    /// is treated as a name.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => Self::Id(PokemonId::new(id)),
            Err(_) => Self::Name(raw.to_string()),
        }
    }
}

impl From<PokemonId> for PokemonKey {
    fn from(id: PokemonId) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for PokemonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}
