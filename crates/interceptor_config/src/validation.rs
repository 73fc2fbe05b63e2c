use crate::{InterceptorConfig, WhenFull};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Queue capacities above this buffer a lot of bodies before backpressure kicks in.
const LARGE_QUEUE_CAPACITY: usize = 10_000;

/// Validation output for a loaded interceptor configuration.
#[derive(Debug, Default)]
pub struct ConfigReport {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl ConfigReport {
    /// Returns true when no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true when at least one error was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Render warnings and errors into a readable, multi-line string.
    pub fn format(&self) -> String {
        let mut out = String::new();
        if !self.errors.is_empty() {
            out.push_str("Errors:\n");
            for err in &self.errors {
                out.push_str("  - ");
                out.push_str(err);
                out.push('\n');
            }
        }
        if !self.warnings.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("Warnings:\n");
            for warn in &self.warnings {
                out.push_str("  - ");
                out.push_str(warn);
                out.push('\n');
            }
        }
        out
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Validate an interceptor configuration and return a report of issues.
pub fn validate(cfg: &InterceptorConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    validate_global(cfg, &mut report);
    validate_cache(cfg, &mut report);

    report
}

fn validate_global(cfg: &InterceptorConfig, report: &mut ConfigReport) {
    let level = cfg.global.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        report.error(format!(
            "global.log_level '{}' is not one of {}",
            cfg.global.log_level,
            LOG_LEVELS.join(", ")
        ));
    }
}

fn validate_cache(cfg: &InterceptorConfig, report: &mut ConfigReport) {
    let cache = &cfg.cache;

    if cache.set_queue_capacity == 0 {
        report.error("cache.set_queue_capacity must be greater than 0");
    } else if cache.set_queue_capacity > LARGE_QUEUE_CAPACITY {
        report.warn(format!(
            "cache.set_queue_capacity {} is very large; pending bodies are held in memory",
            cache.set_queue_capacity
        ));
    }

    if cache.get_queue_capacity == 0 {
        report.error("cache.get_queue_capacity must be greater than 0");
    } else if cache.get_queue_capacity > LARGE_QUEUE_CAPACITY {
        report.warn(format!(
            "cache.get_queue_capacity {} is very large",
            cache.get_queue_capacity
        ));
    }

    if cache.when_full == WhenFull::Reject && cache.set_queue_capacity < 4 {
        report.warn(format!(
            "cache.when_full = reject with set_queue_capacity {}; most bursts will be dropped",
            cache.set_queue_capacity
        ));
    }
}
