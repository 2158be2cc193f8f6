//! Corriere is a resilient content-access layer for headless CMS backends.
//!
//! Reads flow through layered protection: a TTL cache with
//! stale-while-revalidate semantics, retry with exponential backoff for
//! transient backend failures, and a versioned static fallback dataset so
//! callers always get well-formed content. [`api::ContentApi`] is the entry
//! point; everything else supports it.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod fallback;
pub mod metrics;
pub(crate) mod sync;
pub mod telemetry;

pub use api::{ContentApi, ContentResult, Diagnostics, LookupResult};
pub use config::Settings;
pub use domain::types::{ContentSource, Locale};
