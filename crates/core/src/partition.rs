//! Partition naming and staleness rules.
//!
//! Partitions are named `<app>-<role>-<version>`. Exactly one static and one
//! dynamic partition are current; everything else is a candidate for
//! deletion.

use serde::{Deserialize, Serialize};

/// Marker that identifies a version-tagged partition name.
pub const VERSION_MARKER: &str = "-v";

/// Semantic role of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Populated once at install from the manifest.
    Static,
    /// Filled lazily by strategy write-backs.
    Dynamic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Static => "static",
            Role::Dynamic => "dynamic",
        }
    }
}

/// The current partition names for one deployed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNames {
    static_name: String,
    dynamic_name: String,
}

impl PartitionNames {
    /// Derive names following the `<app>-<role>-<version>` convention.
    pub fn new(app: &str, version: &str) -> Self {
        Self {
            static_name: format!("{app}-{}-{version}", Role::Static.as_str()),
            dynamic_name: format!("{app}-{}-{version}", Role::Dynamic.as_str()),
        }
    }

    /// Use explicit names, bypassing the convention.
    pub fn with_names(static_name: impl Into<String>, dynamic_name: impl Into<String>) -> Self {
        Self { static_name: static_name.into(), dynamic_name: dynamic_name.into() }
    }

    pub fn static_name(&self) -> &str {
        &self.static_name
    }

    pub fn dynamic_name(&self) -> &str {
        &self.dynamic_name
    }

    /// True for the current static or dynamic partition.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }

    /// Activation rule: anything that is not current goes.
    pub fn is_obsolete(&self, name: &str) -> bool {
        !self.is_current(name)
    }

    /// Periodic sweep rule: only version-tagged names that are not current.
    ///
    /// Partitions created by other tenants of the store without a version
    /// marker survive the sweep.
    pub fn is_stale_version(&self, name: &str) -> bool {
        name.contains(VERSION_MARKER) && !self.is_current(name)
    }
}
