//! The repository — cache-aside orchestration of client and store.

use crate::error::{AtlasError, AtlasResult};
use atlas_client::{DEFAULT_FETCH_CONCURRENCY, RemoteSource, fetch_all_bounded};
use atlas_model::{
    EvolutionGraph, PokemonDetailed, PokemonId, PokemonKey, PokemonSummary,
};
use atlas_store::{SqliteStore, StoreError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for the synchronization engine.
#[derive(Debug, Clone)]
pub struct RepoConfig {
    /// Ceiling on concurrent remote fetches during bulk population.
    pub fetch_concurrency: usize,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

/// The synchronization engine: answers the three query shapes from the
/// local store, populating it from the remote catalog on demand.
pub struct Repository {
    client: Arc<dyn RemoteSource>,
    store: SqliteStore,
    config: RepoConfig,
}

impl Repository {
    /// Creates an engine with the default configuration.
    pub fn new(client: Arc<dyn RemoteSource>, store: SqliteStore) -> Self {
        Self::with_config(client, store, RepoConfig::default())
    }

    /// Creates an engine with a custom configuration.
    pub fn with_config(
        client: Arc<dyn RemoteSource>,
        store: SqliteStore,
        config: RepoConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Runs a store operation on the blocking pool. The inner result is
    /// kept separate so call sites can treat a not-found as a cache miss
    /// rather than a terminal error.
    async fn blocking_store<T, F>(&self, op: F) -> AtlasResult<Result<T, StoreError>>
    where
        F: FnOnce(SqliteStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(store))
            .await
            .map_err(|e| AtlasError::Storage(format!("store task failed: {e}")))
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Looks up one pokemon by name or id: local store first, remote on
    /// miss, persisting what the remote returned.
    pub async fn get_pokemon(&self, key: &PokemonKey) -> AtlasResult<PokemonSummary> {
        let lookup = key.clone();
        match self
            .blocking_store(move |store| store.get_summary(&lookup))
            .await?
        {
            Ok(summary) => {
                debug!(%key, "summary served from local store");
                return Ok(summary);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        info!(%key, "local miss, fetching from remote");
        let fetched = self.client.fetch_pokemon(key).await?;
        let record = fetched.clone();
        self.blocking_store(move |store| store.upsert_pokemon(&record))
            .await??;

        Ok(fetched.summary())
    }

    /// Reads the summaries covering ids `(offset, offset+limit]`. A stored
    /// range that does not exactly cover those ids is treated as a full
    /// miss: the whole page is refetched, persisted, and the range re-read.
    /// Partial local hits are deliberately discarded, not merged.
    pub async fn get_pokemons(&self, offset: u32, limit: u32) -> AtlasResult<Vec<PokemonSummary>> {
        let local = self
            .blocking_store(move |store| store.get_range(offset, limit))
            .await??;
        if local.len() == limit as usize {
            debug!(offset, limit, "range served from local store");
            return Ok(local);
        }

        info!(
            offset,
            limit,
            stored = local.len(),
            "range incomplete, fetching page from remote"
        );
        let entries = self.client.fetch_page(offset, limit).await?;
        let fetched =
            fetch_all_bounded(Arc::clone(&self.client), entries, self.config.fetch_concurrency)
                .await?;
        self.blocking_store(move |store| {
            for pokemon in &fetched {
                store.upsert_pokemon(pokemon)?;
            }
            Ok(())
        })
        .await??;

        let reread = self
            .blocking_store(move |store| store.get_range(offset, limit))
            .await??;
        Ok(reread)
    }

    /// Reads the detailed view, fetching the entity and its evolution graph
    /// from the remote as needed. A failed chain fetch degrades to the
    /// entity without chain data; everything else surfaces as an error.
    pub async fn get_pokemon_detailed(&self, id: PokemonId) -> AtlasResult<PokemonDetailed> {
        let detailed = match self
            .blocking_store(move |store| store.get_detailed(id))
            .await?
        {
            Ok(detailed) => detailed,
            Err(e) if e.is_not_found() => {
                info!(%id, "local miss, fetching from remote");
                let fetched = self.client.fetch_pokemon(&PokemonKey::Id(id)).await?;
                self.blocking_store(move |store| store.upsert_pokemon(&fetched))
                    .await??;
                self.blocking_store(move |store| store.get_detailed(id))
                    .await??
            }
            Err(e) => return Err(e.into()),
        };

        if !detailed.evolution_chain.is_empty() {
            return Ok(detailed);
        }

        // No chain rows yet: the graph has not been synchronized for this
        // line. Fetch it; this is the one field allowed to degrade.
        let graph = match self.client.fetch_evolution_graph(id).await {
            Ok(graph) => graph,
            Err(e) => {
                warn!(%id, error = %e, "evolution chain fetch failed, serving entity without chain");
                return Ok(detailed);
            }
        };
        if graph.is_empty() {
            debug!(%id, "evolution graph has no edges");
            return Ok(detailed);
        }

        self.persist_graph(&graph).await?;

        let reread = self
            .blocking_store(move |store| store.get_detailed(id))
            .await??;
        Ok(reread)
    }

    // ── Graph persistence ────────────────────────────────────────

    /// Durably stores the edges of an evolution graph.
    ///
    /// Protocol: attempt the transactional edge write; on a missing-endpoint
    /// constraint violation, fetch and persist the absent endpoints, then
    /// retry exactly once. A second failure is surfaced unchanged.
    async fn persist_graph(&self, graph: &EvolutionGraph) -> AtlasResult<()> {
        let attempt = graph.clone();
        match self
            .blocking_store(move |store| store.upsert_evolution_edges(&attempt))
            .await?
        {
            Ok(()) => return Ok(()),
            Err(e) if e.is_constraint_violation() => {
                warn!(error = %e, "edge persist hit missing endpoints, repairing");
            }
            Err(e) => return Err(e.into()),
        }

        self.repair_missing_endpoints(graph).await?;

        let retry = graph.clone();
        self.blocking_store(move |store| store.upsert_evolution_edges(&retry))
            .await??;
        Ok(())
    }

    /// Fetches and persists every graph endpoint absent from the store.
    /// Best-effort per node: a failed fetch is logged and the loop moves on,
    /// leaving the retry to decide whether the repair sufficed.
    async fn repair_missing_endpoints(&self, graph: &EvolutionGraph) -> AtlasResult<()> {
        for node_id in graph.node_ids() {
            let present = self
                .blocking_store(move |store| store.contains(node_id))
                .await??;
            if present {
                continue;
            }

            info!(%node_id, "fetching missing evolution endpoint");
            match self.client.fetch_pokemon(&PokemonKey::Id(node_id)).await {
                Ok(fetched) => {
                    if let Err(e) = self
                        .blocking_store(move |store| store.upsert_pokemon(&fetched))
                        .await?
                    {
                        warn!(%node_id, error = %e, "failed to persist repaired endpoint");
                    }
                }
                Err(e) => warn!(%node_id, error = %e, "failed to fetch missing endpoint"),
            }
        }
        Ok(())
    }
}
