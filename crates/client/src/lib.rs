//! Client side of offcache.
//!
//! This crate provides the network layer, the fetch strategies and the
//! lifecycle controller that drives install, activation and cleanup.

pub mod cleanup;
pub mod clients;
pub mod fetch;
pub mod lifecycle;
pub mod partitions;
pub mod strategy;

#[cfg(test)]
mod testing;

pub use cleanup::CleanupTask;
pub use clients::ClientRegistry;
pub use fetch::{FetchClient, FetchConfig, Network};
pub use lifecycle::{ActivationReport, InstallReport, Lifecycle, Phase};
pub use partitions::PartitionManager;
pub use strategy::{Resolved, StrategyEngine};
