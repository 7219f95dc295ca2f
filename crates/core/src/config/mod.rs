//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFCACHE_*)
//! 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::partition::PartitionNames;

mod validation;

pub use validation::ConfigError;

/// Inline icon cached at install time. Never touches the network.
pub const INLINE_ICON: &str = "data:image/svg+xml,<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 24 24\" fill=\"%23336791\"><path d=\"M23.111 5.441c-.248-2.135-1.735-3.928-3.797-4.584C17.678.375 15.99.057 14.269.057c-1.721 0-3.409.318-5.045.8C7.162 1.513 5.675 3.306 5.427 5.441c-.248 2.135.46 4.254 1.806 5.736.598.659 1.306 1.181 2.089 1.537v7.229c0 .829.672 1.5 1.5 1.5h4.356c.828 0 1.5-.671 1.5-1.5v-7.229c.783-.356 1.491-.878 2.089-1.537 1.346-1.482 2.054-3.601 1.806-5.736z\"/></svg>";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFCACHE_*)
/// 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite partition store.
    ///
    /// Set via OFFCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Application prefix used in partition names (`<app>-<role>-<version>`).
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Version tag of the current partitions, e.g. `v1.0.0`.
    ///
    /// Bumping it makes every partition of the previous version stale.
    #[serde(default = "default_version")]
    pub version: String,

    /// Origin that relative manifest paths and request paths resolve against.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path prefixes that always go to the network first.
    #[serde(default = "default_always_fresh")]
    pub always_fresh: Vec<String>,

    /// Assets cached into the static partition at install.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Seconds between periodic stale-partition sweeps.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Activate right after a successful install instead of waiting for
    /// clients of the previous version to go away.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offcache.sqlite")
}

fn default_app_name() -> String {
    "postgresql".into()
}

fn default_version() -> String {
    "v1.0.0".into()
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_always_fresh() -> Vec<String> {
    vec!["/api/".into(), "/contact".into(), "/form".into()]
}

fn default_manifest() -> Vec<String> {
    vec![
        "/".into(),
        "/index.html".into(),
        "/style.css".into(),
        "/script.js".into(),
        "/manifest.json".into(),
        INLINE_ICON.into(),
    ]
}

fn default_cleanup_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_user_agent() -> String {
    "offcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            app_name: default_app_name(),
            version: default_version(),
            origin: default_origin(),
            always_fresh: default_always_fresh(),
            manifest: default_manifest(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            skip_waiting: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Interval of the periodic cleanup task.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Current partition names derived from app name and version.
    pub fn partition_names(&self) -> PartitionNames {
        PartitionNames::new(&self.app_name, &self.version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFCACHE_`
    /// 2. TOML file from `OFFCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFCACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./offcache.sqlite"));
        assert_eq!(config.app_name, "postgresql");
        assert_eq!(config.version, "v1.0.0");
        assert_eq!(config.always_fresh, vec!["/api/", "/contact", "/form"]);
        assert_eq!(config.manifest.len(), 6);
        assert!(config.manifest.iter().any(|m| m.starts_with("data:")));
        assert_eq!(config.cleanup_interval_secs, 86_400);
        assert_eq!(config.user_agent, "offcache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.skip_waiting);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_partition_names_from_config() {
        let config = AppConfig::default();
        let names = config.partition_names();
        assert_eq!(names.static_name(), "postgresql-static-v1.0.0");
        assert_eq!(names.dynamic_name(), "postgresql-dynamic-v1.0.0");
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("OFFCACHE_VERSION", "v2.0.0");
            jail.set_env("OFFCACHE_CLEANUP_INTERVAL_SECS", "60");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.version, "v2.0.0");
            assert_eq!(config.cleanup_interval(), Duration::from_secs(60));
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "offcache.toml",
                r#"
                app_name = "docs"
                always_fresh = ["/search"]
                "#,
            )?;
            jail.set_env("OFFCACHE_CONFIG_FILE", "offcache.toml");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.app_name, "docs");
            assert_eq!(config.always_fresh, vec!["/search"]);
            assert_eq!(config.version, "v1.0.0");
            Ok(())
        });
    }
}
