use anyhow::Context;
use atlas_api::{ServerConfig, router};
use atlas_client::{PokeApiClient, PokeApiConfig, RemoteSource};
use atlas_repo::Repository;
use atlas_store::SqliteStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let store = SqliteStore::open(&config.db_path)
        .with_context(|| format!("opening local store at {}", config.db_path))?;
    store.init().context("initializing store schema")?;

    let client: Arc<dyn RemoteSource> = Arc::new(PokeApiClient::new(PokeApiConfig {
        api_base_url: config.api_base_url.clone(),
        ..Default::default()
    }));
    let repo = Arc::new(Repository::new(client, store));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "poke-atlas listening");
    axum::serve(listener, router(repo))
        .await
        .context("serving HTTP")?;

    Ok(())
}
