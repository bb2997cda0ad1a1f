//! Synchronization engine for the poke-atlas catalog.
//!
//! The repository mediates between the remote catalog client and the local
//! SQLite store. Reads are cache-aside: the store is consulted first and the
//! remote source is only hit on a miss or an incomplete range, after which
//! the store is repopulated and re-read. Evolution graphs are persisted
//! lazily with a bounded dependency-repair protocol.

mod error;
mod repository;

pub use error::{AtlasError, AtlasResult};
pub use repository::{RepoConfig, Repository};
