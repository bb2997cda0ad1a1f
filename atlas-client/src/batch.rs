//! Bounded concurrent batch fetcher.
//!
//! Resolves a set of page entries in parallel under a fixed concurrency
//! ceiling. Results arrive on an unordered completion channel; the first
//! error fails the whole batch, but every in-flight result is still drained
//! before returning so no task outlives the call.

use crate::error::{ClientError, ClientResult};
use crate::remote::{PageEntry, RemoteSource};
use atlas_model::Pokemon;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::debug;

/// Default ceiling on in-flight remote fetches.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

/// Fetches every entry, at most `max_in_flight` at a time.
///
/// On success returns exactly one record per entry, in completion order
/// (not input order). Any single failure fails the batch: the caller gets
/// the first error and zero records.
pub async fn fetch_all_bounded(
    source: Arc<dyn RemoteSource>,
    entries: Vec<PageEntry>,
    max_in_flight: usize,
) -> ClientResult<Vec<Pokemon>> {
    let total = entries.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let (tx, mut rx) = mpsc::channel::<ClientResult<Pokemon>>(total);

    for entry in entries {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                // The semaphore is never closed while fetches run.
                Err(_) => return,
            };
            let result = source.fetch_by_url(&entry.url).await;
            let _ = tx.send(result).await;
        });
    }
    drop(tx);

    // Drain every completion even after an error: tasks hold a channel
    // sender until they finish, and abandoning the receiver would leave
    // them racing a closed channel mid-batch.
    let mut fetched = Vec::with_capacity(total);
    let mut first_error: Option<ClientError> = None;
    while let Some(result) = rx.recv().await {
        match result {
            Ok(pokemon) => fetched.push(pokemon),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            debug!(count = fetched.len(), "batch fetch complete");
            Ok(fetched)
        }
    }
}
