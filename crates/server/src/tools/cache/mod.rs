//! Cache-related MCP tools.
//!
//! This module provides tools for purging the page cache and inspecting keys.

pub mod key;
pub mod purge;

pub use key::{CacheKeyParams, key_impl};
pub use purge::{CachePurgeParams, purge_impl};
