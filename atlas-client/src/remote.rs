//! The remote source seam consumed by the repository.

use crate::error::ClientResult;
use async_trait::async_trait;
use atlas_model::{EvolutionGraph, Pokemon, PokemonId, PokemonKey};
use serde::{Deserialize, Serialize};

/// One entry of a page listing: the record's unique name plus the absolute
/// URL it resolves at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub name: String,
    pub url: String,
}

/// Read access to the remote catalog.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches one record by name or id.
    async fn fetch_pokemon(&self, key: &PokemonKey) -> ClientResult<Pokemon>;

    /// Fetches one record at an absolute URL taken from a page listing.
    async fn fetch_by_url(&self, url: &str) -> ClientResult<Pokemon>;

    /// Fetches the page listing covering ids `(offset, offset+limit]`.
    /// Entries are resolved individually afterwards.
    async fn fetch_page(&self, offset: u32, limit: u32) -> ClientResult<Vec<PageEntry>>;

    /// Fetches the evolution graph containing the given id, flattened to
    /// node and edge lists.
    async fn fetch_evolution_graph(&self, id: PokemonId) -> ClientResult<EvolutionGraph>;
}
