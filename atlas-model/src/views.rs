//! Read views served to callers.

use crate::ids::PokemonId;
use serde::{Deserialize, Serialize};

/// The brief view of a pokemon: identity, scalar attributes and type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub id: PokemonId,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
}

/// One base stat line in the detailed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub name: String,
    pub effort: i64,
    pub base_stat: i64,
}

/// One ability line in the detailed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityLine {
    pub name: String,
    pub is_hidden: bool,
}

/// One move line in the detailed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    pub name: String,
    pub version_group: String,
    pub learn_method: String,
    pub level_learned_at: i64,
}

/// One reconstructed evolution edge, with both endpoint names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStep {
    pub from_id: PokemonId,
    pub from_name: String,
    pub to_id: PokemonId,
    pub to_name: String,
    pub min_level: Option<i64>,
    pub trigger: Option<String>,
}

/// The detailed view: every persisted attribute of a pokemon plus the
/// complete evolution chain of the line it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDetailed {
    pub id: PokemonId,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub sprite_url: Option<String>,
    pub types: Vec<String>,
    pub stats: Vec<StatLine>,
    pub abilities: Vec<AbilityLine>,
    pub moves: Vec<MoveLine>,
    pub evolution_chain: Vec<EvolutionStep>,
}
