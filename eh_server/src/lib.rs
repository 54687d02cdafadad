//! HTTP server for the esports tournament hub.
//!
//! Exposed as a library so integration tests can build the router against an
//! in-memory store.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
