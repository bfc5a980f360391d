//! HTTP access to the stats, odds and ingestion services.

pub mod client;
pub mod errors;

pub use client::{Endpoints, StatsClient};
pub use errors::FetchError;
