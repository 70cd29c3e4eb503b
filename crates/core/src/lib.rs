//! Core types and shared functionality for purgekit.
//!
//! This crate provides:
//! - Cache key derivation and the invalidation engine
//! - Redis and in-memory store clients
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{PurgeContext, PurgeResult, PurgeScope, Purger};
pub use config::{AppConfig, ConnectionConfig};
pub use error::Error;
