//! Caller-side entry points into a running coordinator.

use std::time::Duration;

use bytes::Bytes;
use interceptor_config::WhenFull;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;
use crate::message::{GetRequest, SetRequest};

/// Cheap, cloneable access to a cache coordinator.
///
/// Handles only come out of [`crate::CacheCoordinator::start`], so there is no
/// way to talk to a coordinator that was never started. Once the coordinator
/// stops, every operation fails with [`CacheError::Unavailable`].
#[derive(Clone, Debug)]
pub struct CacheHandle {
    pub(crate) sets: mpsc::Sender<SetRequest>,
    pub(crate) gets: mpsc::Sender<GetRequest>,
    when_full: WhenFull,
    default_timeout: Option<Duration>,
}

impl CacheHandle {
    pub(crate) fn new(
        sets: mpsc::Sender<SetRequest>,
        gets: mpsc::Sender<GetRequest>,
        when_full: WhenFull,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sets,
            gets,
            when_full,
            default_timeout,
        }
    }

    /// Store `body` for `(method, url)`, replacing any previous body.
    ///
    /// Returns once the message is queued, not once it is applied. When the
    /// set queue is full this waits for room under [`WhenFull::Block`] and
    /// fails with [`CacheError::Overloaded`] under [`WhenFull::Reject`].
    pub async fn set(
        &self,
        method: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> CacheResult<()> {
        let req = SetRequest {
            key: CacheKey::new(method, url),
            body: body.into(),
        };

        match self.when_full {
            WhenFull::Block => self
                .sets
                .send(req)
                .await
                .map_err(|_| CacheError::Unavailable),
            WhenFull::Reject => self.enqueue_now(req),
        }
    }

    /// Like [`set`](Self::set) but never waits, whatever the configured policy.
    pub fn try_set(
        &self,
        method: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> CacheResult<()> {
        self.enqueue_now(SetRequest {
            key: CacheKey::new(method, url),
            body: body.into(),
        })
    }

    /// Look up the body stored for `(method, url)`. `Ok(None)` is a miss.
    ///
    /// Uses the configured lookup deadline, if any.
    pub async fn get(
        &self,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> CacheResult<Option<Bytes>> {
        let key = CacheKey::new(method, url);
        match self.default_timeout {
            Some(limit) => self.request_within(key, limit).await,
            None => self.request(key).await,
        }
    }

    /// Look up with an explicit deadline. The coordinator is not affected when
    /// the deadline passes; its reply is simply discarded.
    pub async fn get_timeout(
        &self,
        method: impl Into<String>,
        url: impl Into<String>,
        limit: Duration,
    ) -> CacheResult<Option<Bytes>> {
        self.request_within(CacheKey::new(method, url), limit).await
    }

    /// Look up as a `(found, body)` pair; the body is empty on a miss.
    pub async fn lookup(
        &self,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> CacheResult<(bool, Bytes)> {
        Ok(match self.get(method, url).await? {
            Some(body) => (true, body),
            None => (false, Bytes::new()),
        })
    }

    /// False once the coordinator has stopped.
    pub fn is_available(&self) -> bool {
        !self.sets.is_closed() && !self.gets.is_closed()
    }

    fn enqueue_now(&self, req: SetRequest) -> CacheResult<()> {
        match self.sets.try_send(req) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(req)) => {
                warn!(
                    target: "interceptor::cache",
                    key = %req.key,
                    bytes = req.body.len(),
                    "Set queue full; dropping body"
                );
                Err(CacheError::Overloaded)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CacheError::Unavailable),
        }
    }

    async fn request(&self, key: CacheKey) -> CacheResult<Option<Bytes>> {
        let (reply, rx) = oneshot::channel();
        self.gets
            .send(GetRequest { key, reply })
            .await
            .map_err(|_| CacheError::Unavailable)?;

        // The sender is dropped unanswered only if the coordinator stopped.
        rx.await.map_err(|_| CacheError::Unavailable)
    }

    async fn request_within(&self, key: CacheKey, limit: Duration) -> CacheResult<Option<Bytes>> {
        tokio::time::timeout(limit, self.request(key))
            .await
            .map_err(|_| CacheError::TimedOut(limit))?
    }
}
