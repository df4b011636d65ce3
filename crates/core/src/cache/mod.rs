//! SQLite-backed response cache, versioned by deployment generation.
//!
//! This module provides the persistent keyed store behind the request
//! handler, with async access via tokio-rusqlite. It supports:
//!
//! - Request-keyed storage (SHA-256 over origin + path)
//! - Named cache generations, one per deployment
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Full-generation wipe of everything but the current deployment
//!
//! Entries are written wholesale and overwritten wholesale (UPSERT, last
//! write wins). There is no read-modify-write anywhere, so SQLite's per-key
//! atomicity is the only coordination needed between concurrent requests.

pub mod connection;
pub mod entries;
pub mod generations;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheStore;
pub use entries::StoredResponse;
pub use generations::GenerationCache;
