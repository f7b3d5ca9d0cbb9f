//! Request-scoped batching loader
//!
//! Solves the N+1 problem: when GraphQL resolves a list of emotes and every
//! emote resolves its `owner` field, each resolver calls `load(owner_id)`
//! concurrently. The loader collects those calls for one wait window and
//! issues a single batched fetch with the deduplicated key list.
//!
//! The pattern works as follows:
//! 1. The first `load` after the previous flush opens a new pending batch and
//!    arms the window timer.
//! 2. Every `load` inside the window joins the batch; a repeated key adds a
//!    waiter but no new fetch-list entry.
//! 3. When the timer fires (or the batch hits its size cap, whichever comes
//!    first) the batch is swapped out under the lock and the fetcher runs
//!    exactly once, outside the lock, with keys in first-seen order.
//! 4. Each key's result is delivered to every waiter registered for it.
//!
//! A loader instance lives for exactly one GraphQL operation; the result
//! cache it keeps exists to avoid redundant fetches within that one request,
//! never as a durable cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Error taxonomy for a single `load`.
///
/// Clone-able so a whole-batch failure can be broadcast to every waiter,
/// mirroring how fetch errors are shared via `Arc`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    /// The underlying batched fetch itself failed; every waiter in the batch
    /// receives this same error.
    #[error("batch fetch failed: {0}")]
    Fetch(Arc<anyhow::Error>),

    /// One key failed to decode or resolve; only that key's waiters see it.
    #[error("failed to resolve key {0}: {1}")]
    Key(String, String),

    /// The key was absent and the entity type treats absence as an error
    /// rather than a sentinel value.
    #[error("{0} {1} not found")]
    NotFound(&'static str, String),

    /// The operation was torn down before the batch could complete.
    #[error("load canceled before batch completed")]
    Canceled,
}

impl LoadError {
    pub fn fetch(err: anyhow::Error) -> Self {
        Self::Fetch(Arc::new(err))
    }
}

/// Per-key outcome of a batched fetch: present, absent, or failed.
pub type KeyOutcome<V> = Result<Option<V>, LoadError>;

/// The batched fetch seam a loader is constructed around.
///
/// `fetch` receives the deduplicated key list in first-seen order and must
/// return one outcome per key, positionally aligned. `absent` decides the
/// not-found policy for the entity type: a placeholder sentinel value or an
/// explicit error.
#[async_trait]
pub trait BatchFetch: Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    async fn fetch(&self, keys: &[Self::Key]) -> Result<Vec<KeyOutcome<Self::Value>>, LoadError>;

    /// Resolution for a key the fetch reported as absent.
    fn absent(&self, key: &Self::Key) -> Result<Self::Value, LoadError>;
}

/// Batching parameters for one loader.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// How long the first `load` holds the batch open for others to join.
    pub wait_window: Duration,
    /// Flush early once this many distinct keys are pending.
    pub max_batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            wait_window: Duration::from_millis(10),
            max_batch_size: 100,
        }
    }
}

type Waiter<V> = oneshot::Sender<Result<V, LoadError>>;

/// The single open/closing batch a loader holds at a time.
struct Pending<K, V> {
    /// Distinguishes this batch from its successors so a late timer cannot
    /// flush a batch it did not open.
    id: u64,
    /// Deduplicated, first-seen order.
    keys: Vec<K>,
    /// Every waiter per key; duplicate loads add waiters, not keys.
    waiters: HashMap<K, Vec<Waiter<V>>>,
}

struct State<K, V> {
    pending: Option<Pending<K, V>>,
    next_batch_id: u64,
    /// Request-scoped results: successful fetches and primed values.
    cache: HashMap<K, V>,
}

/// A generic batching loader, one instance per entity type per operation.
///
/// Cheap to clone; clones share the same pending batch and cache.
pub struct BatchLoader<F: BatchFetch> {
    fetcher: Arc<F>,
    config: LoaderConfig,
    state: Arc<Mutex<State<F::Key, F::Value>>>,
}

impl<F: BatchFetch> Clone for BatchLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            config: self.config,
            state: self.state.clone(),
        }
    }
}

impl<F: BatchFetch> BatchLoader<F> {
    pub fn new(fetcher: F, config: LoaderConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
            state: Arc::new(Mutex::new(State {
                pending: None,
                next_batch_id: 0,
                cache: HashMap::new(),
            })),
        }
    }

    /// Load one value, joining the current batch (or opening a new one) and
    /// suspending until it flushes. Safe to call from many tasks at once.
    pub async fn load(&self, key: F::Key) -> Result<F::Value, LoadError> {
        // The guard must be confined to a block scope (not merely dropped)
        // so the async fn stays `Send`.
        let (rx, to_dispatch, opened_batch) = {
            let mut state = self.state.lock();

            if let Some(value) = state.cache.get(&key) {
                return Ok(value.clone());
            }

            let (tx, rx) = oneshot::channel();
            let mut batch_full = false;
            let mut opened_batch = None;

            match state.pending.as_mut() {
                Some(pending) => {
                    if !pending.waiters.contains_key(&key) {
                        pending.keys.push(key.clone());
                    }
                    pending.waiters.entry(key).or_default().push(tx);
                    batch_full = pending.keys.len() >= self.config.max_batch_size;
                }
                None => {
                    let id = state.next_batch_id;
                    state.next_batch_id += 1;

                    let mut waiters: HashMap<F::Key, Vec<Waiter<F::Value>>> = HashMap::new();
                    waiters.insert(key.clone(), vec![tx]);
                    state.pending = Some(Pending {
                        id,
                        keys: vec![key],
                        waiters,
                    });
                    opened_batch = Some(id);
                }
            }

            let to_dispatch = if batch_full { state.pending.take() } else { None };
            (rx, to_dispatch, opened_batch)
        };

        if let Some(batch) = to_dispatch {
            let loader = self.clone();
            tokio::spawn(async move { loader.dispatch(batch).await });
        }
        if let Some(id) = opened_batch {
            let loader = self.clone();
            let window = self.config.wait_window;
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                loader.flush(id).await;
            });
        }

        // Sender dropped without a result means the batch was torn down
        // before it could complete.
        rx.await.unwrap_or(Err(LoadError::Canceled))
    }

    /// Load many keys; results are positionally aligned and one failing key
    /// never blocks the others.
    pub async fn load_all(
        &self,
        keys: impl IntoIterator<Item = F::Key>,
    ) -> Vec<Result<F::Value, LoadError>> {
        futures::future::join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Seed a result so later loads in the same operation see it without a
    /// fetch. Used after mutations that already hold the written value.
    pub fn prime(&self, key: F::Key, value: F::Value) {
        self.state.lock().cache.insert(key, value);
    }

    /// Flush the pending batch if it is still the one the window timer armed.
    async fn flush(&self, batch_id: u64) {
        let batch = {
            let mut state = self.state.lock();
            match state.pending {
                Some(ref pending) if pending.id == batch_id => state.pending.take(),
                _ => None,
            }
        };
        if let Some(batch) = batch {
            self.dispatch(batch).await;
        }
    }

    /// Run the fetch (outside the lock) and distribute results to waiters.
    async fn dispatch(&self, batch: Pending<F::Key, F::Value>) {
        let Pending { keys, mut waiters, .. } = batch;

        tracing::debug!(batch_size = keys.len(), "flushing loader batch");

        let outcomes = match self.fetcher.fetch(&keys).await {
            Ok(outcomes) if outcomes.len() == keys.len() => outcomes,
            Ok(outcomes) => {
                tracing::error!(
                    expected = keys.len(),
                    got = outcomes.len(),
                    "batch fetch returned misaligned results"
                );
                let err = LoadError::fetch(anyhow::anyhow!(
                    "fetch returned {} results for {} keys",
                    outcomes.len(),
                    keys.len()
                ));
                Self::fail_all(waiters, err);
                return;
            }
            Err(err) => {
                Self::fail_all(waiters, err);
                return;
            }
        };

        // Resolve each key to its final result, then cache the successes so
        // later loads in this operation short-circuit. Absent keys are not
        // cached: a mutation later in the request may create them.
        let mut resolved: Vec<(F::Key, Result<F::Value, LoadError>)> =
            Vec::with_capacity(keys.len());
        {
            let mut state = self.state.lock();
            for (key, outcome) in keys.into_iter().zip(outcomes) {
                let result = match outcome {
                    Ok(Some(value)) => {
                        state.cache.insert(key.clone(), value.clone());
                        Ok(value)
                    }
                    Ok(None) => self.fetcher.absent(&key),
                    Err(err) => Err(err),
                };
                resolved.push((key, result));
            }
        }

        for (key, result) in resolved {
            if let Some(senders) = waiters.remove(&key) {
                for tx in senders {
                    // A waiter that gave up (dropped its receiver) is fine.
                    let _ = tx.send(result.clone());
                }
            }
        }
    }

    fn fail_all(waiters: HashMap<F::Key, Vec<Waiter<F::Value>>>, err: LoadError) {
        for senders in waiters.into_values() {
            for tx in senders {
                let _ = tx.send(Err(err.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test fetcher recording every batch it receives.
    struct RecordingFetch {
        calls: AtomicUsize,
        batches: Mutex<Vec<Vec<String>>>,
        fail_whole_batch: bool,
        fail_key: Option<String>,
    }

    impl RecordingFetch {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                batches: Mutex::new(Vec::new()),
                fail_whole_batch: false,
                fail_key: None,
            }
        }
    }

    #[async_trait]
    impl BatchFetch for Arc<RecordingFetch> {
        type Key = String;
        type Value = String;

        async fn fetch(&self, keys: &[String]) -> Result<Vec<KeyOutcome<String>>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.batches.lock().push(keys.to_vec());

            if self.fail_whole_batch {
                return Err(LoadError::fetch(anyhow::anyhow!("store unavailable")));
            }

            Ok(keys
                .iter()
                .map(|k| {
                    if Some(k) == self.fail_key.as_ref() {
                        Err(LoadError::Key(k.clone(), "bad document".into()))
                    } else if k.starts_with("missing") {
                        Ok(None)
                    } else {
                        Ok(Some(format!("v{k}")))
                    }
                })
                .collect())
        }

        fn absent(&self, key: &String) -> Result<String, LoadError> {
            Ok(format!("sentinel:{key}"))
        }
    }

    fn loader(fetch: Arc<RecordingFetch>) -> BatchLoader<Arc<RecordingFetch>> {
        BatchLoader::new(
            fetch,
            LoaderConfig {
                wait_window: Duration::from_millis(25),
                max_batch_size: 100,
            },
        )
    }

    // =========================================================================
    // Batching and Deduplication
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_loads_share_one_fetch() {
        let fetch = Arc::new(RecordingFetch::new());
        let loader = loader(fetch.clone());

        let (a, b, a2) = tokio::join!(
            loader.load("A".to_string()),
            loader.load("B".to_string()),
            loader.load("A".to_string()),
        );

        assert_eq!(a.unwrap(), "vA");
        assert_eq!(b.unwrap(), "vB");
        assert_eq!(a2.unwrap(), "vA");

        assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);
        // Deduplicated, first-seen order.
        assert_eq!(fetch.batches.lock()[0], vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loads_after_flush_open_a_new_batch() {
        let fetch = Arc::new(RecordingFetch::new());
        let loader = loader(fetch.clone());

        // Cached key resolves without a second fetch; a new key opens batch 2.
        loader.load("A".to_string()).await.unwrap();
        loader.load("A".to_string()).await.unwrap();
        loader.load("B".to_string()).await.unwrap();

        assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
        let batches = fetch.batches.lock();
        assert_eq!(*batches, vec![vec!["A".to_string()], vec!["B".to_string()]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_batch_size_flushes_early() {
        let fetch = Arc::new(RecordingFetch::new());
        let loader = BatchLoader::new(
            fetch.clone(),
            LoaderConfig {
                wait_window: Duration::from_secs(3600),
                max_batch_size: 2,
            },
        );

        // Window never fires inside this test; only the size cap can flush.
        let (a, b) = tokio::join!(loader.load("A".to_string()), loader.load("B".to_string()));
        assert_eq!(a.unwrap(), "vA");
        assert_eq!(b.unwrap(), "vB");
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);
    }

    // =========================================================================
    // Absence and Priming
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_absent_key_resolves_to_sentinel() {
        let fetch = Arc::new(RecordingFetch::new());
        let loader = loader(fetch.clone());

        let value = loader.load("missing-1".to_string()).await.unwrap();
        assert_eq!(value, "sentinel:missing-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_absent_key_is_not_cached() {
        let fetch = Arc::new(RecordingFetch::new());
        let loader = loader(fetch.clone());

        loader.load("missing-1".to_string()).await.unwrap();
        loader.load("missing-1".to_string()).await.unwrap();
        // Second load fetches again: the entity may have appeared meanwhile.
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prime_skips_the_fetch() {
        let fetch = Arc::new(RecordingFetch::new());
        let loader = loader(fetch.clone());

        loader.prime("A".to_string(), "primed".to_string());
        let value = loader.load("A".to_string()).await.unwrap();

        assert_eq!(value, "primed");
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 0);
    }

    // =========================================================================
    // Failure Semantics
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_whole_batch_failure_reaches_every_waiter() {
        let mut fetch = RecordingFetch::new();
        fetch.fail_whole_batch = true;
        let loader = loader(Arc::new(fetch));

        let (a, b) = tokio::join!(loader.load("A".to_string()), loader.load("B".to_string()));
        assert_matches!(a, Err(LoadError::Fetch(_)));
        assert_matches!(b, Err(LoadError::Fetch(_)));

        // Nothing cached from the failed batch: the next load fetches again.
        let retry = loader.load("A".to_string()).await;
        assert_matches!(retry, Err(LoadError::Fetch(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_failure_is_isolated() {
        let mut fetch = RecordingFetch::new();
        fetch.fail_key = Some("B".to_string());
        let loader = loader(Arc::new(fetch));

        let (a, b, c) = tokio::join!(
            loader.load("A".to_string()),
            loader.load("B".to_string()),
            loader.load("C".to_string()),
        );
        assert_eq!(a.unwrap(), "vA");
        assert_matches!(b, Err(LoadError::Key(key, _)) if key == "B");
        assert_eq!(c.unwrap(), "vC");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_all_is_positional() {
        let mut fetch = RecordingFetch::new();
        fetch.fail_key = Some("B".to_string());
        let loader = loader(Arc::new(fetch));

        let results = loader
            .load_all(["A".to_string(), "B".to_string(), "A".to_string()])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "vA");
        assert_matches!(&results[1], Err(LoadError::Key(_, _)));
        assert_eq!(results[2].as_ref().unwrap(), "vA");
    }
}
