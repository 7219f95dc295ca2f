//! SQLite-backed partition store for cached responses.
//!
//! This module provides a persistent cache of response snapshots using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named partitions created on demand and deleted as a unit
//! - Request keys hashed from method and URL with SHA-256
//! - Atomic batch writes for install-time population
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - An in-memory store with the same semantics

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod partitions;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::RequestKey;
pub use memory::MemoryStore;
pub use partitions::PartitionInfo;
pub use store::CacheStore;
