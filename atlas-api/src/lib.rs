//! HTTP API for poke-atlas.
//!
//! A thin axum layer over the synchronization engine: three GET routes,
//! parameter validation, and a small error-to-status mapping. All catalog
//! logic lives in `atlas-repo`.

mod config;
mod error;
mod handlers;

pub use config::ServerConfig;
pub use error::ApiError;

use atlas_repo::Repository;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Builds the application router over a shared repository.
pub fn router(repo: Arc<Repository>) -> Router {
    Router::new()
        .route("/pokemon/{name}", get(handlers::get_pokemon))
        .route("/pokemon/{id}/detailed", get(handlers::get_pokemon_detailed))
        .route("/pokemons/{offset}", get(handlers::get_pokemons))
        .with_state(repo)
}
