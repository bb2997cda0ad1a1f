//! The full pokemon record as the remote catalog serves it.
//!
//! Only the fields this engine persists are decoded; unknown remote fields
//! are ignored. The same struct doubles as the store's write input.

use crate::ids::PokemonId;
use crate::views::PokemonSummary;
use serde::{Deserialize, Serialize};

/// A named reference to another catalog resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// Sprite image references for a pokemon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
}

/// A type assignment with its display slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: i64,
    #[serde(rename = "type")]
    pub type_ref: NamedResource,
}

/// An ability assignment, flagged hidden or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySlot {
    #[serde(default)]
    pub is_hidden: bool,
    pub ability: NamedResource,
}

/// A learnable move with its per-version-group learn conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    #[serde(rename = "move")]
    pub move_ref: NamedResource,
    #[serde(default)]
    pub version_group_details: Vec<MoveVersionDetail>,
}

/// How a move is learned in one version group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveVersionDetail {
    #[serde(default)]
    pub level_learned_at: i64,
    pub version_group: NamedResource,
    pub move_learn_method: NamedResource,
}

/// A base stat value with its effort yield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub stat: NamedResource,
    #[serde(default)]
    pub effort: i64,
    pub base_stat: i64,
}

/// The full catalog record for one pokemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: PokemonId,
    pub name: String,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub moves: Vec<MoveEntry>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
}

impl Pokemon {
    /// Derives the summary view directly from the record, without a store
    /// round trip.
    #[must_use]
    pub fn summary(&self) -> PokemonSummary {
        let mut types: Vec<_> = self.types.clone();
        types.sort_by_key(|t| t.slot);
        PokemonSummary {
            id: self.id,
            name: self.name.clone(),
            height: self.height,
            weight: self.weight,
            sprite_url: self.sprites.front_default.clone(),
            types: types.into_iter().map(|t| t.type_ref.name).collect(),
        }
    }
}
