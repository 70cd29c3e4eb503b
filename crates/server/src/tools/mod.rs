//! MCP tool implementations.
//!
//! This module contains all tools exposed by the purgekit server.

pub mod cache;
