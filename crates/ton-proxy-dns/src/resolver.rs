//! Recursive TON DNS resolver with a soft/hard TTL cache.
//!
//! The resolver walks the delegation chain one hop at a time:
//!
//! ```text
//! Host: "sub.test.ton"
//! Chain: "ton\0test\0sub\0"
//!
//! Hop 0: root resolver with "ton\0test\0sub\0"
//!   -> next_resolver R1, remaining "test\0sub\0"
//!
//! Hop 1: R1 with "test\0sub\0"
//!   -> next_resolver R2, remaining "sub\0"
//!
//! Hop 2: R2 with "sub\0"
//!   -> adnl_address / storage_address, done
//! ```
//!
//! Resolver records are on-chain data anyone can publish, so the walk is
//! capped at [`ResolverConfig::max_hops`] hops.
//!
//! Successful answers are cached per host. A cached answer younger than the
//! soft TTL is served as is; between the soft and hard TTL it is served while
//! a background task re-resolves the host; past the hard TTL the caller waits
//! for a fresh resolution.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::adnl::AdnlNodeId;
use crate::cache::{CacheEntry, CacheLookup, DnsCache};
use crate::categories::{record_category, DnsCategory};
use crate::chain::{chain_to_domain, prepare_chain};
use crate::config::ResolverConfig;
use crate::error::{ConfigError, DnsError, DnsResult, RpcError};
use crate::records::{MsgAddressInt, ResolvedRecord};

/// The blockchain RPC client used for resolution.
///
/// Implementations run the `dnsresolve` get-method and decode its result; the
/// resolver never sees cells or stacks.
#[async_trait]
pub trait DnsRpc: Send + Sync + 'static {
    /// Check that the client is synced with the network.
    async fn sync(&self) -> Result<(), RpcError>;

    /// Run one resolution step.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Contract to query; `None` means the root resolver
    /// * `chain` - Remaining name chain, see [`prepare_chain`]
    /// * `category` - Record category selector
    /// * `ttl` - TTL hint for the client's own caching
    async fn resolve_hop(
        &self,
        resolver: Option<&MsgAddressInt>,
        chain: &[u8],
        category: &DnsCategory,
        ttl: u32,
    ) -> Result<Vec<ResolvedRecord>, RpcError>;
}

/// State of one in-flight resolution between hops.
#[derive(Debug)]
struct HopState {
    full_host: String,
    chain: Vec<u8>,
    resolver: Option<MsgAddressInt>,
    depth: usize,
}

enum HopOutcome {
    Delegated(HopState),
    Resolved(String),
}

/// State shared with background refresh tasks.
struct Shared<R: DnsRpc> {
    rpc: Arc<R>,
    cache: RwLock<DnsCache>,
    config: ResolverConfig,
    category: DnsCategory,
}

impl<R: DnsRpc> Shared<R> {
    /// Resolve `host` over the network and cache the answer.
    async fn resolve_uncached(&self, host: &str) -> DnsResult<String> {
        let mut state = HopState {
            full_host: host.to_string(),
            chain: prepare_chain(host),
            resolver: None,
            depth: 0,
        };

        loop {
            match self.resolve_hop(state).await? {
                HopOutcome::Delegated(next) => state = next,
                HopOutcome::Resolved(address) => {
                    debug!("Resolved {} to {}", host, address);
                    self.cache
                        .write()
                        .await
                        .insert(host, address.clone(), Instant::now());
                    return Ok(address);
                }
            }
        }
    }

    async fn resolve_hop(&self, state: HopState) -> DnsResult<HopOutcome> {
        if state.depth >= self.config.max_hops {
            debug!("Resolution of {} gave up after {} hops", state.full_host, state.depth);
            return Err(DnsError::DepthExceeded {
                max_hops: self.config.max_hops,
            });
        }

        match &state.resolver {
            Some(resolver) => debug!(
                "Resolving {:?} of {} via {} (hop {})",
                chain_to_domain(&state.chain),
                state.full_host,
                resolver,
                state.depth
            ),
            None => debug!("Resolving {} via root resolver", state.full_host),
        }
        trace!("Chain bytes: {}", hex::encode(&state.chain));

        let records = self
            .rpc
            .resolve_hop(
                state.resolver.as_ref(),
                &state.chain,
                &self.category,
                self.config.ttl_hint,
            )
            .await?;

        let Some(record) = records.into_iter().next() else {
            return Err(DnsError::NoRecordsFound(state.full_host));
        };

        match record {
            ResolvedRecord::NextResolver { resolver, remaining } => {
                Ok(HopOutcome::Delegated(HopState {
                    full_host: state.full_host,
                    chain: remaining,
                    resolver: Some(resolver),
                    depth: state.depth + 1,
                }))
            }
            ResolvedRecord::AdnlAddress { raw_id } => {
                let id = AdnlNodeId::parse(&raw_id)?;
                Ok(HopOutcome::Resolved(format!("{}.adnl", id.serialize())))
            }
            ResolvedRecord::StorageAddress { bag_id } => {
                Ok(HopOutcome::Resolved(format!("{}.bag", hex::encode(bag_id))))
            }
            ResolvedRecord::Unsupported { prefix } => Err(DnsError::UnsupportedRecord { prefix }),
        }
    }
}

/// TON DNS resolver for the proxy.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ton_proxy_dns::{DnsResolver, MockDnsRpc, ResolvedRecord, ResolverConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let rpc = Arc::new(MockDnsRpc::new());
/// rpc.configure_host("files.ton", ResolvedRecord::storage_address([0x12; 32]));
///
/// let dns = DnsResolver::new(rpc, ResolverConfig::default()).unwrap();
/// let address = dns.resolve("files.ton").await.unwrap();
/// assert_eq!(address, format!("{}.bag", "12".repeat(32)));
/// # }
/// ```
pub struct DnsResolver<R: DnsRpc> {
    shared: Arc<Shared<R>>,
    sync_task: Option<JoinHandle<()>>,
}

impl<R: DnsRpc> DnsResolver<R> {
    /// Create a resolver without starting the liveness check.
    pub fn new(rpc: Arc<R>, config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let category = record_category(&config.category);
        let cache = DnsCache::new(config.soft_ttl, config.hard_ttl);

        Ok(Self {
            shared: Arc::new(Shared {
                rpc,
                cache: RwLock::new(cache),
                config,
                category,
            }),
            sync_task: None,
        })
    }

    /// Create a resolver and spawn the liveness check.
    ///
    /// Must be called from within a tokio runtime. The check is aborted when
    /// the resolver is dropped.
    pub fn start(rpc: Arc<R>, config: ResolverConfig) -> Result<Self, ConfigError> {
        let retry_delay = config.sync_retry_delay;
        let mut resolver = Self::new(Arc::clone(&rpc), config)?;
        resolver.sync_task = Some(tokio::spawn(async move {
            run_sync_loop(rpc, retry_delay).await;
        }));
        Ok(resolver)
    }

    /// Resolve `host` to `<adnl-id>.adnl` or `<bag-id>.bag`.
    pub async fn resolve(&self, host: &str) -> DnsResult<String> {
        let lookup = self.shared.cache.read().await.lookup(host, Instant::now());

        match lookup {
            CacheLookup::Fresh(address) => {
                debug!("Cache hit for {}: {}", host, address);
                Ok(address)
            }
            CacheLookup::Stale(address) => {
                debug!("Stale cache hit for {}, refreshing in background", host);
                self.spawn_refresh(host);
                Ok(address)
            }
            CacheLookup::Miss => self.shared.resolve_uncached(host).await,
        }
    }

    fn spawn_refresh(&self, host: &str) {
        let shared = Arc::clone(&self.shared);
        let host = host.to_string();

        tokio::spawn(async move {
            if let Err(e) = shared.resolve_uncached(&host).await {
                debug!("Background refresh of {} failed: {}", host, e);
            }
        });
    }

    /// Get the cached entry for `host`, whatever its age.
    pub async fn cached(&self, host: &str) -> Option<CacheEntry> {
        self.shared.cache.read().await.get(host).cloned()
    }

    /// Number of cached hosts.
    pub async fn cache_len(&self) -> usize {
        self.shared.cache.read().await.len()
    }

    /// Get the resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.shared.config
    }

    /// Get a reference to the RPC client.
    pub fn rpc(&self) -> &Arc<R> {
        &self.shared.rpc
    }
}

impl<R: DnsRpc> Drop for DnsResolver<R> {
    fn drop(&mut self) {
        if let Some(task) = self.sync_task.take() {
            task.abort();
        }
    }
}

/// Run the liveness check until it succeeds, retrying after `retry_delay`.
///
/// Returns the number of attempts made.
pub async fn run_sync_loop<R: DnsRpc + ?Sized>(rpc: Arc<R>, retry_delay: Duration) -> usize {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match rpc.sync().await {
            Ok(()) => {
                info!("RPC client synced after {} attempt(s)", attempts);
                return attempts;
            }
            Err(e) => {
                warn!("Sync error: {}", e);
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}
