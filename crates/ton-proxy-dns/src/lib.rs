//! TON DNS resolution for RLDP HTTP proxies.
//!
//! This crate turns `.ton` host names into the endpoints a proxy can connect
//! to: an ADNL node (`<adnl-id>.adnl`) for TON Sites served by a node, or a
//! TON Storage bag (`<bag-id>.bag`) for sites stored as bags.
//!
//! # Resolution Process
//!
//! 1. Convert the host to its name chain (reversed, null-terminated labels)
//! 2. Ask the root resolver for the `site` category
//! 3. Follow `next_resolver` records, at most four hops
//! 4. Turn the terminal record into an address string and cache it
//!
//! The blockchain queries themselves go through a [`DnsRpc`] implementation
//! supplied by the caller.
//!
//! # Caching
//!
//! | Age of cached answer | Behaviour |
//! |----------------------|-----------|
//! | < 270 s | served, nothing else happens |
//! | 270 s .. 300 s | served, host re-resolved in the background |
//! | >= 300 s | caller waits for a fresh resolution |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ton_proxy_dns::{AdnlNodeId, DnsResolver, MockDnsRpc, ResolvedRecord, ResolverConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let site = AdnlNodeId::new([0x22; 32]);
//!
//! let rpc = Arc::new(MockDnsRpc::new());
//! rpc.configure_host("mysite.ton", ResolvedRecord::adnl_address(site.serialize()));
//!
//! let dns = DnsResolver::new(rpc, ResolverConfig::default()).unwrap();
//! let address = dns.resolve("mysite.ton").await.unwrap();
//! assert_eq!(address, format!("{}.adnl", site));
//! # }
//! ```

pub mod adnl;
pub mod cache;
pub mod categories;
pub mod chain;
pub mod config;
pub mod error;
pub mod mock;
pub mod records;
pub mod resolver;

// Re-export main types for convenience
pub use adnl::{AdnlNodeId, ADNL_ID_BASE32_LEN};

pub use cache::{CacheEntry, CacheLookup, DnsCache, DEFAULT_HARD_TTL, DEFAULT_SOFT_TTL};

pub use categories::{
    record_category, DnsCategory, CATEGORY_NEXT_RESOLVER, CATEGORY_SITE, CATEGORY_STORAGE,
    CATEGORY_WALLET,
};

pub use chain::{chain_to_domain, prepare_chain};

pub use config::{ResolverConfig, DEFAULT_MAX_HOPS, DEFAULT_SYNC_RETRY_DELAY, DEFAULT_TTL_HINT};

pub use error::{ConfigError, DnsError, DnsResult, RpcError};

pub use mock::{HopCall, MockDnsRpc};

pub use records::{
    BagId, MsgAddressInt, ResolvedRecord, WorkchainId, PREFIX_ADNL_ADDRESS, PREFIX_NEXT_RESOLVER,
    PREFIX_SMC_ADDRESS, PREFIX_STORAGE_ADDRESS,
};

pub use resolver::{run_sync_loop, DnsResolver, DnsRpc};
