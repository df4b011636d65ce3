//! Request routing and cache lifecycle for waycache.
//!
//! This crate is the policy engine: it classifies each incoming request into
//! one of three resolution strategies and executes it against the cache
//! store and the network transport.
//!
//! - `NetworkOnly`: straight to the network, the cache is never touched
//! - `NetworkThenCache`: fresh-first; cache is the offline fallback
//! - `CacheThenNetwork`: cache-first; network fills misses
//!
//! The hosting runtime drives the three entry points: [`LifecycleController::install`]
//! and [`LifecycleController::activate`] on rollout, [`RequestHandler::handle`]
//! per intercepted request. The crate owns no event loop.

pub mod classify;
pub mod handler;
pub mod lifecycle;

pub use classify::{Classifier, Strategy};
pub use handler::{RequestHandler, Served, Source};
pub use lifecycle::{HostControl, LifecycleController, NoopHost};

#[cfg(test)]
pub(crate) mod testing;
