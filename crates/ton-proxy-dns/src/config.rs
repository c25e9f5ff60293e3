//! Resolver configuration.

use std::time::Duration;

use crate::cache::{DEFAULT_HARD_TTL, DEFAULT_SOFT_TTL};
use crate::categories::CATEGORY_SITE;
use crate::error::ConfigError;

/// Default maximum number of resolver hops per resolution.
pub const DEFAULT_MAX_HOPS: usize = 4;

/// Default TTL hint passed to the RPC client with every hop.
pub const DEFAULT_TTL_HINT: u32 = 16;

/// Default delay between failed liveness checks.
pub const DEFAULT_SYNC_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration for [`DnsResolver`](crate::DnsResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Age below which cached answers are served without refreshing.
    pub soft_ttl: Duration,
    /// Age from which cached answers are no longer served.
    pub hard_ttl: Duration,
    /// Maximum number of hops before giving up.
    pub max_hops: usize,
    /// Record category tag requested on every hop.
    pub category: String,
    /// TTL hint forwarded to the RPC client.
    pub ttl_hint: u32,
    /// Delay before retrying a failed liveness check.
    pub sync_retry_delay: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            soft_ttl: DEFAULT_SOFT_TTL,
            hard_ttl: DEFAULT_HARD_TTL,
            max_hops: DEFAULT_MAX_HOPS,
            category: CATEGORY_SITE.to_string(),
            ttl_hint: DEFAULT_TTL_HINT,
            sync_retry_delay: DEFAULT_SYNC_RETRY_DELAY,
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both cache thresholds.
    pub fn with_ttls(mut self, soft_ttl: Duration, hard_ttl: Duration) -> Self {
        self.soft_ttl = soft_ttl;
        self.hard_ttl = hard_ttl;
        self
    }

    /// Set the hop limit.
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Set the requested record category tag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the TTL hint passed with every hop query.
    pub fn with_ttl_hint(mut self, ttl_hint: u32) -> Self {
        self.ttl_hint = ttl_hint;
        self
    }

    /// Set the delay between failed liveness checks.
    pub fn with_sync_retry_delay(mut self, delay: Duration) -> Self {
        self.sync_retry_delay = delay;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hard_ttl.is_zero() {
            return Err(ConfigError::ZeroHardTtl);
        }
        if self.soft_ttl > self.hard_ttl {
            return Err(ConfigError::SoftTtlAboveHard {
                soft: self.soft_ttl,
                hard: self.hard_ttl,
            });
        }
        if self.max_hops == 0 {
            return Err(ConfigError::ZeroMaxHops);
        }
        Ok(())
    }
}
