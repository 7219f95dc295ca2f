//! Cache lifecycle MCP tools.
//!
//! Install and activate drive the lifecycle events; cleanup and partitions
//! inspect and sweep the partition store.

pub mod lifecycle;
pub mod partitions;

pub use lifecycle::{activate_impl, install_impl};
pub use partitions::{cleanup_impl, partitions_impl};
