use std::time::Duration;

use serde::Deserialize;

// =======================================================
// CACHE CONFIG + DEFAULTS
// =======================================================

/// What a `set` does when the set queue is full.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum WhenFull {
    /// Wait for room in the queue.
    #[default]
    #[serde(rename = "block")]
    Block,
    /// Give up immediately with an overload error.
    #[serde(rename = "reject")]
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Pending `set` messages the coordinator may hold.
    pub set_queue_capacity: usize,
    /// Pending `get` messages the coordinator may hold.
    pub get_queue_capacity: usize,
    pub when_full: WhenFull,
    /// Deadline for a lookup reply, in milliseconds. 0 waits indefinitely.
    pub get_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            set_queue_capacity: 50,
            get_queue_capacity: 50,
            when_full: WhenFull::Block,
            get_timeout_ms: 0,
        }
    }
}

impl CacheConfig {
    pub fn set_queue_capacity(&self) -> usize {
        self.set_queue_capacity
    }

    pub fn get_queue_capacity(&self) -> usize {
        self.get_queue_capacity
    }

    pub fn when_full(&self) -> WhenFull {
        self.when_full
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        (self.get_timeout_ms > 0).then(|| Duration::from_millis(self.get_timeout_ms))
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &CacheConfig) {
        if self.set_queue_capacity == 0 {
            self.set_queue_capacity = defaults.set_queue_capacity;
        }
        if self.get_queue_capacity == 0 {
            self.get_queue_capacity = defaults.get_queue_capacity;
        }
    }
}
