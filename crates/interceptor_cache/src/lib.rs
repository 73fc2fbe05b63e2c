//! Response cache for the intercepting proxy.
//!
//! Bodies are stored per `(method, url)` by a single coordinator task. Callers
//! talk to it through a [`CacheHandle`]:
//!
//! ```no_run
//! # async fn demo() -> Result<(), interceptor_cache::CacheError> {
//! use interceptor_cache::CacheCoordinator;
//!
//! let running = CacheCoordinator::default().start();
//! let cache = running.handle();
//!
//! cache.set("GET", "http://x/y", vec![0x41u8, 0x42]).await?;
//! assert_eq!(cache.lookup("GET", "http://x/y").await?.0, true);
//! assert_eq!(cache.get("PUT", "http://x/y").await?, None);
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod entry;
mod error;
mod handle;
mod key;
mod message;
mod store;

pub use coordinator::{CacheCoordinator, RunningCache};
pub use error::{CacheError, CacheResult};
pub use handle::CacheHandle;
pub use key::CacheKey;
