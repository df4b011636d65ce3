//! Core types and shared functionality for waycache.
//!
//! This crate provides:
//! - Generation-versioned response cache with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStore, GenerationCache, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
