use serde::Deserialize;

use crate::validation::{ConfigReport, validate};
use crate::{CacheConfig, GlobalConfig};

/// Prefix for environment overrides, e.g. `INTERCEPTOR__CACHE__WHEN_FULL=reject`.
const ENV_PREFIX: &str = "INTERCEPTOR";

// =======================================================
// INTERCEPTOR CONFIG — main config
// =======================================================
#[derive(Debug, Clone, Deserialize)]
pub struct InterceptorConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        let mut cfg = Self {
            global: GlobalConfig::default(),
            cache: CacheConfig::default(),
        };
        cfg.apply_defaults();
        cfg
    }
}

impl InterceptorConfig {
    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    /// Validate the configuration and return a report of warnings and errors.
    pub fn validate(&self) -> ConfigReport {
        validate(self)
    }

    /// Load an INI file (optional) layered with `INTERCEPTOR__*` environment variables.
    pub fn from_file(file_name: &str) -> Result<Self, config::ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::new(file_name, config::FileFormat::Ini).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(built)
    }

    /// Parse INI text directly. No environment layering.
    pub fn from_ini_str(contents: &str) -> Result<Self, config::ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Ini))
            .build()?;

        Self::finish(built)
    }

    pub fn from_file_or_default(file_name: &str) -> Self {
        match Self::from_file(file_name) {
            Ok(cfg) => {
                let report = cfg.validate();
                if report.has_errors() {
                    eprintln!("Invalid config in '{file_name}':");
                    eprintln!("{}", report.format());
                    eprintln!("Using default config (in-memory)...");
                    InterceptorConfig::default()
                } else {
                    if !report.warnings().is_empty() {
                        eprintln!("Config warnings in '{file_name}':");
                        eprintln!("{}", report.format());
                    }
                    cfg
                }
            }
            Err(e) => {
                eprintln!("Error reading config '{file_name}': {e}");
                eprintln!("Using default config (in-memory)...");
                InterceptorConfig::default()
            }
        }
    }

    fn finish(built: config::Config) -> Result<Self, config::ConfigError> {
        let mut cfg: InterceptorConfig = built.try_deserialize()?;
        cfg.apply_defaults();
        Ok(cfg)
    }

    fn apply_defaults(&mut self) {
        let def_global = GlobalConfig::default();
        self.global.apply_defaults_from(&def_global);

        let def_cache = CacheConfig::default();
        self.cache.apply_defaults_from(&def_cache);
    }

    pub fn print(&self) {
        println!("============= INTERCEPTOR CONFIG =============");
        println!("\n[global]");
        println!("  log_level            = {}", self.global.log_level);
        println!("\n[cache]");
        println!("  set_queue_capacity   = {}", self.cache.set_queue_capacity);
        println!("  get_queue_capacity   = {}", self.cache.get_queue_capacity);
        println!("  when_full            = {:?}", self.cache.when_full);
        println!("  get_timeout_ms       = {}", self.cache.get_timeout_ms);
        println!("==============================================");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::InterceptorConfig;
    use crate::WhenFull;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = InterceptorConfig::default();
        assert_eq!(cfg.global().log_level(), "info");
        assert_eq!(cfg.cache().set_queue_capacity(), 50);
        assert_eq!(cfg.cache().get_queue_capacity(), 50);
        assert_eq!(cfg.cache().when_full(), WhenFull::Block);
        assert_eq!(cfg.cache().get_timeout(), None);
    }

    #[test]
    fn parses_ini_sections() {
        let ini = "\
[global]
log_level = debug

[cache]
set_queue_capacity = 8
get_queue_capacity = 16
when_full = reject
get_timeout_ms = 250
";
        let cfg = InterceptorConfig::from_ini_str(ini).expect("valid ini");
        assert_eq!(cfg.global().log_level(), "debug");
        assert_eq!(cfg.cache().set_queue_capacity(), 8);
        assert_eq!(cfg.cache().get_queue_capacity(), 16);
        assert_eq!(cfg.cache().when_full(), WhenFull::Reject);
        assert_eq!(cfg.cache().get_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn zero_capacities_fall_back_to_defaults() {
        let ini = "\
[cache]
set_queue_capacity = 0
get_queue_capacity = 0
";
        let cfg = InterceptorConfig::from_ini_str(ini).expect("valid ini");
        assert_eq!(cfg.cache().set_queue_capacity(), 50);
        assert_eq!(cfg.cache().get_queue_capacity(), 50);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let ini = "\
[cache]
when_full = shrug
";
        assert!(InterceptorConfig::from_ini_str(ini).is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let cfg = InterceptorConfig::from_file("does-not-exist/interceptor.conf")
            .expect("optional file");
        assert_eq!(cfg.cache().set_queue_capacity(), 50);
    }
}
