//! Cache policy configuration.
//!
//! Freshness windows are expressed in seconds, mirroring `corriere.toml`.

use std::time::Duration;

use serde::Deserialize;

// Default values for the cache policy
const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_STALE_WHILE_REVALIDATE_SECONDS: u64 = 600;
const DEFAULT_MAX_AGE_SECONDS: u64 = 3600;

/// Freshness policy for cached backend responses.
///
/// `ttl_seconds < stale_while_revalidate_seconds < max_age_seconds` is the
/// expected ordering; it is asserted in tests rather than enforced here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Enable the request cache entirely.
    pub enabled: bool,
    /// Window during which an entry is fresh and served without I/O.
    pub ttl_seconds: u64,
    /// Window during which an expired entry may still be served while a
    /// background refresh runs.
    pub stale_while_revalidate_seconds: u64,
    /// Advisory upper bound on entry age; carried for operators, the stale
    /// window is what gates serving.
    pub max_age_seconds: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            stale_while_revalidate_seconds: DEFAULT_STALE_WHILE_REVALIDATE_SECONDS,
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CachePolicy {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl_seconds: settings.ttl_seconds,
            stale_while_revalidate_seconds: settings.stale_while_revalidate_seconds,
            max_age_seconds: settings.max_age_seconds,
        }
    }
}

impl CachePolicy {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn stale_window(&self) -> Duration {
        Duration::from_secs(self.stale_while_revalidate_seconds)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let policy = CachePolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.ttl_seconds, 300);
        assert_eq!(policy.stale_while_revalidate_seconds, 600);
        assert_eq!(policy.max_age_seconds, 3600);
    }

    #[test]
    fn default_windows_are_ordered() {
        let policy = CachePolicy::default();
        assert!(policy.ttl() < policy.stale_window());
        assert!(policy.stale_window() < policy.max_age());
    }
}
