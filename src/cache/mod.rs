//! Request-signature cache with TTL freshness and a stale-while-revalidate
//! window.
//!
//! The store maps a request signature (`METHOD:endpoint:body`) to a
//! timestamped payload. An entry is *fresh* while its age is below the
//! configured TTL and *usable-stale* while its age is below the
//! stale-while-revalidate window; beyond that it is dead weight until the
//! next refresh replaces it wholesale.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `corriere.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! stale_while_revalidate_seconds = 600
//! max_age_seconds = 3600
//! ```

mod config;
mod keys;
mod store;

pub use config::CachePolicy;
pub use keys::RequestSignature;
pub use store::{CacheStats, CacheStore};
