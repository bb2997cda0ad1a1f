//! PokeAPI-backed implementation of `RemoteSource`.

use crate::error::{ClientError, ClientResult};
use crate::remote::{PageEntry, RemoteSource};
use async_trait::async_trait;
use atlas_model::{EvolutionChainDocument, EvolutionGraph, Pokemon, PokemonId, PokemonKey};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Configuration for the remote catalog client.
#[derive(Debug, Clone)]
pub struct PokeApiConfig {
    /// Base URL of the catalog API (e.g. `https://pokeapi.co`).
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://pokeapi.co".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Remote catalog client backed by reqwest.
pub struct PokeApiClient {
    config: PokeApiConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    results: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct ResourceLink {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpeciesDocument {
    evolution_chain: ResourceLink,
}

impl PokeApiClient {
    /// Creates a client with the given configuration.
    pub fn new(config: PokeApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");
        Self { config, client }
    }

    /// GETs a URL and decodes the JSON body, mapping statuses onto the
    /// client error taxonomy.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("fetching {what}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(format!("reading {what}: {e}")))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Malformed(format!("{what}: {e}")))
    }
}

#[async_trait]
impl RemoteSource for PokeApiClient {
    async fn fetch_pokemon(&self, key: &PokemonKey) -> ClientResult<Pokemon> {
        let url = format!("{}/api/v2/pokemon/{key}", self.config.api_base_url);
        debug!(%key, "fetching pokemon from remote");
        self.get_json(&url, &format!("pokemon {key}")).await
    }

    async fn fetch_by_url(&self, url: &str) -> ClientResult<Pokemon> {
        self.get_json(url, "pokemon").await
    }

    async fn fetch_page(&self, offset: u32, limit: u32) -> ClientResult<Vec<PageEntry>> {
        let url = format!(
            "{}/api/v2/pokemon?offset={offset}&limit={limit}",
            self.config.api_base_url
        );
        debug!(offset, limit, "fetching page listing from remote");
        let page: PageResponse = self.get_json(&url, "pokemon page").await?;
        Ok(page.results)
    }

    async fn fetch_evolution_graph(&self, id: PokemonId) -> ClientResult<EvolutionGraph> {
        // The chain document hangs off the species record, so resolving a
        // graph is two requests: species -> chain URL -> chain.
        let species_url = format!("{}/api/v2/pokemon-species/{id}", self.config.api_base_url);
        debug!(%id, "fetching evolution chain from remote");
        let species: SpeciesDocument = self
            .get_json(&species_url, &format!("species {id}"))
            .await?;
        let chain: EvolutionChainDocument = self
            .get_json(&species.evolution_chain.url, &format!("evolution chain for {id}"))
            .await?;
        EvolutionGraph::from_chain(&chain)
            .map_err(|e| ClientError::Malformed(format!("evolution chain for {id}: {e}")))
    }
}
