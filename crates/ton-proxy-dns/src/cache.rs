//! Resolved-address cache with soft and hard expiry.
//!
//! ```text
//! age < soft        -> Fresh: serve, no refresh
//! soft <= age < hard -> Stale: serve, refresh in background
//! age >= hard       -> Miss: resolve before answering
//! ```
//!
//! Entries are never evicted; they go stale and get overwritten on refresh.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Default age below which an entry is served without refreshing.
pub const DEFAULT_SOFT_TTL: Duration = Duration::from_secs(270);

/// Default age at which an entry is no longer served.
pub const DEFAULT_HARD_TTL: Duration = Duration::from_secs(300);

/// The last known resolution of a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// `<adnl-id>.adnl` or `<bag-id>.bag`.
    pub address: String,
    pub created_at: Instant,
}

impl CacheEntry {
    /// Time elapsed since the entry was written.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Fresh(String),
    Stale(String),
    Miss,
}

/// Host to address map keyed by the host string exactly as requested.
#[derive(Debug)]
pub struct DnsCache {
    entries: HashMap<String, CacheEntry>,
    soft_ttl: Duration,
    hard_ttl: Duration,
}

impl DnsCache {
    /// Create an empty cache with the given soft and hard TTLs.
    pub fn new(soft_ttl: Duration, hard_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            soft_ttl,
            hard_ttl,
        }
    }

    /// Classify the entry for `host` at time `now`.
    pub fn lookup(&self, host: &str, now: Instant) -> CacheLookup {
        let Some(entry) = self.entries.get(host) else {
            return CacheLookup::Miss;
        };

        let age = entry.age(now);
        if age < self.soft_ttl {
            CacheLookup::Fresh(entry.address.clone())
        } else if age < self.hard_ttl {
            CacheLookup::Stale(entry.address.clone())
        } else {
            CacheLookup::Miss
        }
    }

    /// Store (or overwrite) the address for `host`.
    pub fn insert(&mut self, host: &str, address: String, now: Instant) {
        self.entries.insert(
            host.to_string(),
            CacheEntry {
                address,
                created_at: now,
            },
        );
    }

    /// Get the entry for `host` regardless of its age.
    pub fn get(&self, host: &str) -> Option<&CacheEntry> {
        self.entries.get(host)
    }

    /// Number of cached hosts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new(DEFAULT_SOFT_TTL, DEFAULT_HARD_TTL)
    }
}
