//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `app_name` is empty or contains whitespace
    /// - `version` does not start with `v`
    /// - `origin` is not an http(s) URL
    /// - an `always_fresh` prefix does not start with `/`
    /// - `manifest` is empty
    /// - `cleanup_interval_secs` is 0
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.is_empty() || self.app_name.contains(char::is_whitespace) {
            return Err(invalid("app_name", "must be non-empty and contain no whitespace"));
        }

        // Periodic cleanup recognizes versioned partitions by the `-v` marker.
        if !self.version.starts_with('v') || self.version.len() < 2 {
            return Err(invalid("version", "must look like v<tag>, e.g. v1.0.0"));
        }

        match url::Url::parse(&self.origin) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => return Err(invalid("origin", format!("unsupported scheme: {}", u.scheme()))),
            Err(e) => return Err(invalid("origin", e.to_string())),
        }

        if let Some(bad) = self.always_fresh.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("always_fresh", format!("prefix must start with '/': {bad}")));
        }

        if self.manifest.is_empty() {
            return Err(invalid("manifest", "must list at least one asset"));
        }

        if self.cleanup_interval_secs == 0 {
            return Err(invalid("cleanup_interval_secs", "must be at least 1 second"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if !self.skip_waiting {
            tracing::warn!(
                version = %self.version,
                "skip_waiting is disabled; a new version stays waiting until activated explicitly"
            );
        }

        Ok(())
    }
}
