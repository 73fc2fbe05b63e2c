use bytes::Bytes;

/// Stored response body. Cloning shares the underlying buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CacheEntry {
    body: Bytes,
}

impl CacheEntry {
    pub(crate) fn new(body: Bytes) -> Self {
        Self { body }
    }

    pub(crate) fn body(&self) -> &Bytes {
        &self.body
    }
}
