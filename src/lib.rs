//! Library entrypoint for sportsdata.
//!
//! Exposes all modules so integration tests can import them.

pub mod api;
pub mod config;
pub mod core;
pub mod entities;
pub mod pipeline;
pub mod sink;
