//! Server configuration.

use std::env;

/// Configuration for the API server, loadable from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub bind_addr: String,
    /// Path of the SQLite database file.
    pub db_path: String,
    /// Base URL of the remote catalog API.
    pub api_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            db_path: "./atlas.db".to_string(),
            api_base_url: "https://pokeapi.co".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from `ATLAS_BIND_ADDR`, `ATLAS_DB_PATH` and
    /// `POKEAPI_BASE_URL`, falling back to the defaults for unset values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var("ATLAS_BIND_ADDR").unwrap_or(defaults.bind_addr),
            db_path: env::var("ATLAS_DB_PATH").unwrap_or(defaults.db_path),
            api_base_url: env::var("POKEAPI_BASE_URL").unwrap_or(defaults.api_base_url),
        }
    }
}
