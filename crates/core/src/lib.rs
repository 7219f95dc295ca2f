//! Core types and shared functionality for offcache.
//!
//! This crate provides:
//! - Partition store with SQLite backend
//! - Request routing policy
//! - Partition naming and staleness rules
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod notify;
pub mod partition;
pub mod request;
pub mod response;
pub mod route;

pub use cache::{CacheDb, CacheStore, MemoryStore, PartitionInfo, RequestKey};
pub use config::AppConfig;
pub use error::Error;
pub use partition::{PartitionNames, Role};
pub use request::{Destination, ResourceRequest};
pub use response::{ResponseSource, StoredResponse};
pub use route::{RouteDecision, Router, Strategy};
