mod cache;
mod global;
mod interceptor;
mod validation;

pub use cache::{CacheConfig, WhenFull};
pub use global::GlobalConfig;
pub use interceptor::InterceptorConfig;
pub use validation::{ConfigReport, validate};
