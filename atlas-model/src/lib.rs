//! Domain types for the poke-atlas catalog engine.
//!
//! This crate defines the plain data types shared by the remote client, the
//! local store and the repository:
//! - `PokemonId` / `PokemonKey` identifiers (ids are assigned by the remote
//!   catalog and immutable)
//! - The full remote `Pokemon` record with its nested collections
//! - `PokemonSummary` / `PokemonDetailed` read views
//! - The flat `EvolutionGraph` (node list + edge list) and the walk that
//!   flattens the remote chain document into it
//!
//! No I/O lives here; everything is serde-serializable plain data.

mod graph;
mod ids;
mod pokemon;
mod views;

pub use graph::{
    ChainLink, EvolutionChainDocument, EvolutionDetail, EvolutionEdge, EvolutionGraph,
    EvolutionNode, id_from_resource_url,
};
pub use ids::{PokemonId, PokemonKey};
pub use pokemon::{
    AbilitySlot, MoveEntry, MoveVersionDetail, NamedResource, Pokemon, Sprites, StatEntry,
    TypeSlot,
};
pub use views::{AbilityLine, EvolutionStep, MoveLine, PokemonDetailed, PokemonSummary, StatLine};

/// Errors that can occur while interpreting remote catalog data.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A resource URL did not end in a numeric identifier.
    #[error("malformed resource url: {0}")]
    MalformedResourceUrl(String),
}
