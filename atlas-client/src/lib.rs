//! Remote catalog client for poke-atlas.
//!
//! Talks to the PokeAPI-shaped remote source: single-record fetches by name
//! or id, page listings by offset, evolution chain documents, and a
//! bounded-concurrency batch resolver for populating whole pages.
//!
//! The `RemoteSource` trait is the seam the repository consumes; the
//! `PokeApiClient` is its reqwest-backed production implementation. The base
//! URL is configurable so tests can point the client at a mock server.

mod batch;
mod error;
mod pokeapi;
mod remote;

pub use batch::{DEFAULT_FETCH_CONCURRENCY, fetch_all_bounded};
pub use error::{ClientError, ClientResult};
pub use pokeapi::{PokeApiClient, PokeApiConfig};
pub use remote::{PageEntry, RemoteSource};
