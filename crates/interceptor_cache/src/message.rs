//! Messages crossing into the coordinator task.

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::key::CacheKey;

/// Insert-or-overwrite request. No reply.
#[derive(Debug)]
pub(crate) struct SetRequest {
    pub(crate) key: CacheKey,
    pub(crate) body: Bytes,
}

/// Lookup request carrying its own reply slot.
///
/// The reply is a one-shot send, so a caller that stopped waiting never
/// blocks the coordinator.
#[derive(Debug)]
pub(crate) struct GetRequest {
    pub(crate) key: CacheKey,
    pub(crate) reply: oneshot::Sender<Option<Bytes>>,
}
