use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Directive used when `RUST_LOG` is unset: dependencies at `warn`, our own
/// `interceptor::*` targets at `level`.
pub fn default_filter(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    format!("warn,interceptor={level}")
}

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::default_filter;

    #[test]
    fn filter_covers_workspace_targets() {
        assert_eq!(
            default_filter(" DEBUG "),
            "warn,interceptor=debug"
        );
    }
}
