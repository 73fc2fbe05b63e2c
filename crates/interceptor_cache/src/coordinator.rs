//! The task that owns the cache mapping.
//!
//! Every read and write goes through one loop that takes messages from a set
//! queue and a get queue and handles each to completion before taking the
//! next. Only messages cross into the task; the map itself is never shared.

use std::time::Duration;

use interceptor_config::{CacheConfig, WhenFull};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, trace};

use crate::entry::CacheEntry;
use crate::handle::CacheHandle;
use crate::message::{GetRequest, SetRequest};
use crate::store::MemoryCacheStore;

/// An idle coordinator: queue sizes and policies, nothing running yet.
#[derive(Debug, Clone)]
pub struct CacheCoordinator {
    set_capacity: usize,
    get_capacity: usize,
    when_full: WhenFull,
    get_timeout: Option<Duration>,
}

impl CacheCoordinator {
    pub fn new(cfg: &CacheConfig) -> Self {
        Self::with_capacity(cfg.set_queue_capacity(), cfg.get_queue_capacity())
            .when_full(cfg.when_full())
            .get_timeout(cfg.get_timeout())
    }

    /// Capacities below 1 are raised to 1; a queue always holds something.
    pub fn with_capacity(set_capacity: usize, get_capacity: usize) -> Self {
        Self {
            set_capacity: set_capacity.max(1),
            get_capacity: get_capacity.max(1),
            when_full: WhenFull::default(),
            get_timeout: None,
        }
    }

    pub fn when_full(mut self, policy: WhenFull) -> Self {
        self.when_full = policy;
        self
    }

    pub fn get_timeout(mut self, limit: Option<Duration>) -> Self {
        self.get_timeout = limit;
        self
    }

    /// Create the mapping and spawn the coordination loop.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(self) -> RunningCache {
        let (set_tx, set_rx) = mpsc::channel(self.set_capacity);
        let (get_tx, get_rx) = mpsc::channel(self.get_capacity);
        let shutdown = CancellationToken::new();

        info!(
            target: "interceptor::cache",
            set_capacity = self.set_capacity,
            get_capacity = self.get_capacity,
            when_full = ?self.when_full,
            "Starting cache coordinator"
        );

        let task = tokio::spawn(run(set_rx, get_rx, shutdown.clone(), self.set_capacity));
        let handle = CacheHandle::new(set_tx, get_tx, self.when_full, self.get_timeout);

        RunningCache {
            handle,
            _guard: shutdown.clone().drop_guard(),
            shutdown,
            task,
        }
    }
}

impl Default for CacheCoordinator {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

/// Lifecycle owner of a started coordinator.
///
/// Dropping it stops the coordinator; handles that outlive it then report
/// the cache as unavailable.
#[derive(Debug)]
pub struct RunningCache {
    handle: CacheHandle,
    shutdown: CancellationToken,
    // Cancels `shutdown` when the owner is dropped.
    _guard: DropGuard,
    task: JoinHandle<usize>,
}

impl RunningCache {
    pub fn handle(&self) -> CacheHandle {
        self.handle.clone()
    }

    /// Signal the loop to stop without waiting for it.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Stop the loop and wait for it to exit. Returns the number of entries
    /// held at that point. Lookups still queued are answered as unavailable.
    pub async fn shutdown(self) -> Result<usize, JoinError> {
        self.stop();
        self.task.await
    }
}

enum Message {
    Set(SetRequest),
    Get(GetRequest),
}

/// Next message from either queue, whichever is ready first. `None` once both
/// queues are closed.
async fn next_message(
    sets: &mut mpsc::Receiver<SetRequest>,
    gets: &mut mpsc::Receiver<GetRequest>,
) -> Option<Message> {
    tokio::select! {
        Some(set) = sets.recv() => Some(Message::Set(set)),
        Some(get) = gets.recv() => Some(Message::Get(get)),
        else => None,
    }
}

async fn run(
    mut sets: mpsc::Receiver<SetRequest>,
    mut gets: mpsc::Receiver<GetRequest>,
    shutdown: CancellationToken,
    set_capacity: usize,
) -> usize {
    let mut store = MemoryCacheStore::new();

    loop {
        let message = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            message = next_message(&mut sets, &mut gets) => message,
        };

        match message {
            Some(Message::Set(set)) => apply_set(&mut store, set),
            Some(Message::Get(get)) => {
                apply_pending_sets(&mut store, &mut sets, set_capacity);
                answer_get(&store, get);
            }
            None => break,
        }
    }

    info!(
        target: "interceptor::cache",
        entries = store.len(),
        "Cache coordinator stopped"
    );
    store.len()
}

fn apply_set(store: &mut MemoryCacheStore, set: SetRequest) {
    let bytes = set.body.len();
    let key = set.key;
    trace!(target: "interceptor::cache", key = %key, bytes, "Storing response body");
    if store.insert(key, CacheEntry::new(set.body)) {
        trace!(target: "interceptor::cache", bytes, "Replaced earlier entry");
    }
}

/// Apply sets that were already queued when a get was taken, so a get issued
/// after a `set` call returned always observes it. At most one queue's worth.
fn apply_pending_sets(
    store: &mut MemoryCacheStore,
    sets: &mut mpsc::Receiver<SetRequest>,
    limit: usize,
) {
    for _ in 0..limit {
        match sets.try_recv() {
            Ok(set) => apply_set(store, set),
            Err(_) => break,
        }
    }
}

fn answer_get(store: &MemoryCacheStore, get: GetRequest) {
    let found = store.get(&get.key).map(|entry| entry.body().clone());
    debug!(
        target: "interceptor::cache",
        key = %get.key,
        hit = found.is_some(),
        "Cache lookup"
    );

    if get.reply.send(found).is_err() {
        debug!(
            target: "interceptor::cache",
            key = %get.key,
            "Lookup caller went away before the reply"
        );
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use interceptor_config::{CacheConfig, WhenFull};
    use tokio::sync::oneshot;

    use super::CacheCoordinator;
    use crate::error::CacheError;
    use crate::key::CacheKey;
    use crate::message::GetRequest;

    #[tokio::test]
    async fn fresh_cache_misses() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();

        assert_eq!(cache.get("GET", "/x").await, Ok(None));
        assert_eq!(cache.lookup("GET", "/x").await, Ok((false, Bytes::new())));
    }

    #[tokio::test]
    async fn round_trip_is_byte_exact() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();
        let body: Vec<u8> = (0..=255).collect();

        cache.set("GET", "http://x/y", body.clone()).await.unwrap();

        let (found, got) = cache.lookup("GET", "http://x/y").await.unwrap();
        assert!(found);
        assert_eq!(got.as_ref(), body.as_slice());
    }

    #[tokio::test]
    async fn method_is_part_of_the_key() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();

        cache.set("GET", "http://x/y", vec![0x41u8, 0x42]).await.unwrap();

        assert_eq!(
            cache.lookup("GET", "http://x/y").await,
            Ok((true, Bytes::from_static(&[0x41, 0x42])))
        );
        assert_eq!(
            cache.lookup("PUT", "http://x/y").await,
            Ok((false, Bytes::new()))
        );
        assert_eq!(cache.get("get", "http://x/y").await, Ok(None));
    }

    #[tokio::test]
    async fn distinct_keys_do_not_leak() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();

        cache.set("GET:", "x", &b"left"[..]).await.unwrap();
        cache.set("GET", "/a", &b"a"[..]).await.unwrap();

        assert_eq!(cache.get("GET", ":x").await, Ok(None));
        assert_eq!(cache.get("GET", "/b").await, Ok(None));
        assert_eq!(cache.get("POST", "/a").await, Ok(None));
        assert_eq!(
            cache.get("GET:", "x").await,
            Ok(Some(Bytes::from_static(b"left")))
        );
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();

        cache.set("GET", "/a", &b"first"[..]).await.unwrap();
        cache.set("GET", "/a", &b"second"[..]).await.unwrap();

        assert_eq!(
            cache.get("GET", "/a").await,
            Ok(Some(Bytes::from_static(b"second")))
        );
    }

    #[tokio::test]
    async fn empty_body_is_still_a_hit() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();

        cache.set("HEAD", "/a", Bytes::new()).await.unwrap();

        assert_eq!(cache.lookup("HEAD", "/a").await, Ok((true, Bytes::new())));
    }

    #[tokio::test]
    async fn instances_are_isolated() {
        let first = CacheCoordinator::default().start();
        let second = CacheCoordinator::default().start();

        first.handle().set("GET", "/a", &b"1"[..]).await.unwrap();

        assert!(first.handle().get("GET", "/a").await.unwrap().is_some());
        assert_eq!(second.handle().get("GET", "/a").await, Ok(None));
    }

    #[tokio::test]
    async fn abandoned_lookup_does_not_stall() {
        let running = CacheCoordinator::with_capacity(1, 1).start();
        let cache = running.handle();
        cache.set("GET", "/a", &b"1"[..]).await.unwrap();

        // A caller that gave up before the reply.
        let (reply, rx) = oneshot::channel();
        drop(rx);
        cache
            .gets
            .send(GetRequest {
                key: CacheKey::new("GET", "/a"),
                reply,
            })
            .await
            .unwrap();

        assert_eq!(
            cache.get("GET", "/a").await,
            Ok(Some(Bytes::from_static(b"1")))
        );
    }

    #[tokio::test]
    async fn shutdown_makes_cache_unavailable() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();
        cache.set("GET", "/a", &b"1"[..]).await.unwrap();
        assert!(cache.get("GET", "/a").await.unwrap().is_some());
        assert!(cache.is_available());

        let entries = running.shutdown().await.expect("clean stop");
        assert_eq!(entries, 1);

        assert!(!cache.is_available());
        assert_eq!(cache.get("GET", "/a").await, Err(CacheError::Unavailable));
        assert_eq!(
            cache.set("GET", "/a", &b"2"[..]).await,
            Err(CacheError::Unavailable)
        );
        assert_eq!(
            cache.try_set("GET", "/a", &b"2"[..]),
            Err(CacheError::Unavailable)
        );
    }

    #[tokio::test]
    async fn dropping_the_owner_stops_the_loop() {
        let running = CacheCoordinator::default().start();
        let cache = running.handle();
        drop(running);

        assert_eq!(cache.get("GET", "/a").await, Err(CacheError::Unavailable));
    }

    #[tokio::test]
    async fn built_from_config() {
        let cfg = CacheConfig {
            set_queue_capacity: 2,
            get_queue_capacity: 2,
            when_full: WhenFull::Reject,
            get_timeout_ms: 500,
        };
        let running = CacheCoordinator::new(&cfg).start();
        let cache = running.handle();

        cache.set("GET", "/a", &b"1"[..]).await.unwrap();
        assert_eq!(
            cache.get("GET", "/a").await,
            Ok(Some(Bytes::from_static(b"1")))
        );
    }
}
