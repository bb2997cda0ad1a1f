//! SQLite local store for the poke-atlas catalog.
//!
//! Fully normalized persistence: one table per attribute kind joined back to
//! the entity table, plus the evolution edge table. Every write is
//! insert-or-ignore inside a single transaction, so concurrent and repeated
//! population is idempotent and a failed write never leaves a partial
//! record behind. Reads include a contiguity-validated range lookup and the
//! two-pass recursive chain reconstruction.

mod error;
mod store;

pub use error::{StoreError, StoreResult};
pub use store::SqliteStore;
