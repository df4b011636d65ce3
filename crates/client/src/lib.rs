//! Network transport for waycache.
//!
//! This crate provides the HTTP transport used by the worker crate, behind a
//! trait so strategy code can be exercised against a scripted stand-in, plus
//! URL resolution for route rules and pre-cache manifests.

pub mod fetch;

pub use fetch::url::{UrlError, resolve};
pub use fetch::{
    Bytes, HeaderMap, HeaderName, HeaderValue, HttpTransport, Method, NetResponse, StatusCode, Transport,
    TransportConfig, TransportError,
};
