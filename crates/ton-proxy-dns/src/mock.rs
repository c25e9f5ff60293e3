//! A scripted RPC client for testing.
//!
//! [`MockDnsRpc`] answers `resolve_hop` from a list of predefined responses
//! keyed by (resolver, chain prefix) and records every call it receives.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::categories::DnsCategory;
use crate::chain::prepare_chain;
use crate::error::RpcError;
use crate::records::{MsgAddressInt, ResolvedRecord};
use crate::resolver::DnsRpc;

/// One `resolve_hop` call as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopCall {
    pub resolver: Option<MsgAddressInt>,
    pub chain: Vec<u8>,
    pub category: DnsCategory,
    pub ttl: u32,
}

#[derive(Debug, Clone)]
struct MockHopEntry {
    resolver: Option<MsgAddressInt>,
    chain_prefix: Vec<u8>,
    response: Result<Vec<ResolvedRecord>, RpcError>,
}

#[derive(Debug, Default)]
struct MockState {
    entries: Vec<MockHopEntry>,
    hop_calls: Vec<HopCall>,
    sync_failures: usize,
    sync_calls: usize,
    latency: Duration,
}

/// A mock RPC client.
///
/// Responses added later take precedence over earlier ones for the same
/// resolver and chain, so a test can re-script a name mid-way. A hop that
/// matches nothing gets an empty record list.
#[derive(Debug, Default)]
pub struct MockDnsRpc {
    state: Mutex<MockState>,
}

impl MockDnsRpc {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer hops on `resolver` whose chain starts with `chain_prefix`.
    ///
    /// `None` stands for the root resolver.
    pub fn add_records(
        &self,
        resolver: Option<MsgAddressInt>,
        chain_prefix: impl Into<Vec<u8>>,
        records: Vec<ResolvedRecord>,
    ) {
        self.state().entries.push(MockHopEntry {
            resolver,
            chain_prefix: chain_prefix.into(),
            response: Ok(records),
        });
    }

    /// Answer matching hops with a single record.
    pub fn add_record(
        &self,
        resolver: Option<MsgAddressInt>,
        chain_prefix: impl Into<Vec<u8>>,
        record: ResolvedRecord,
    ) {
        self.add_records(resolver, chain_prefix, vec![record]);
    }

    /// Fail matching hops with `error`.
    pub fn add_error(
        &self,
        resolver: Option<MsgAddressInt>,
        chain_prefix: impl Into<Vec<u8>>,
        error: RpcError,
    ) {
        self.state().entries.push(MockHopEntry {
            resolver,
            chain_prefix: chain_prefix.into(),
            response: Err(error),
        });
    }

    /// Script the usual delegation chain for `host`, ending in `record`.
    ///
    /// The root resolver consumes the first label and delegates to a
    /// per-depth resolver ([`resolver_at`](Self::resolver_at)), which consumes the
    /// next label, and so on. The last label's resolver returns `record`.
    pub fn configure_host(&self, host: &str, record: ResolvedRecord) {
        let chain = prepare_chain(host);
        let label_count = chain.iter().filter(|&&byte| byte == 0).count();

        let mut resolver = None;
        let mut pos = 0;

        for depth in 1..=label_count {
            let label_len = chain[pos..]
                .iter()
                .position(|&byte| byte == 0)
                .map_or(chain.len() - pos, |i| i + 1);

            if depth == label_count {
                self.add_record(resolver.clone(), chain[pos..].to_vec(), record.clone());
                break;
            }

            let next = Self::resolver_at(depth);
            self.add_record(
                resolver.clone(),
                chain[pos..].to_vec(),
                ResolvedRecord::next_resolver(next.clone(), chain[pos + label_len..].to_vec()),
            );
            resolver = Some(next);
            pos += label_len;
        }
    }

    /// The resolver [`configure_host`](Self::configure_host) uses at `depth`.
    ///
    /// A masterchain address whose last 8 bytes hold `depth` big-endian, so
    /// every depth gets its own resolver.
    pub fn resolver_at(depth: usize) -> MsgAddressInt {
        let mut address = [0u8; 32];
        address[24..].copy_from_slice(&(depth as u64).to_be_bytes());
        MsgAddressInt::masterchain(address)
    }

    /// Delay every `resolve_hop` answer by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    /// Make the next `count` liveness checks fail.
    pub fn fail_sync(&self, count: usize) {
        self.state().sync_failures = count;
    }

    /// Drop every scripted response, keeping the call log.
    pub fn clear(&self) {
        self.state().entries.clear();
    }

    /// Number of `resolve_hop` calls so far.
    pub fn hop_count(&self) -> usize {
        self.state().hop_calls.len()
    }

    /// Every `resolve_hop` call so far, oldest first.
    pub fn hop_calls(&self) -> Vec<HopCall> {
        self.state().hop_calls.clone()
    }

    /// Number of `sync` calls so far.
    pub fn sync_count(&self) -> usize {
        self.state().sync_calls
    }
}

#[async_trait]
impl DnsRpc for MockDnsRpc {
    async fn sync(&self) -> Result<(), RpcError> {
        let mut state = self.state();
        state.sync_calls += 1;

        if state.sync_failures > 0 {
            state.sync_failures -= 1;
            return Err(RpcError::Network("liteserver unreachable".to_string()));
        }
        Ok(())
    }

    async fn resolve_hop(
        &self,
        resolver: Option<&MsgAddressInt>,
        chain: &[u8],
        category: &DnsCategory,
        ttl: u32,
    ) -> Result<Vec<ResolvedRecord>, RpcError> {
        let (response, latency) = {
            let mut state = self.state();
            state.hop_calls.push(HopCall {
                resolver: resolver.cloned(),
                chain: chain.to_vec(),
                category: *category,
                ttl,
            });

            let response = state
                .entries
                .iter()
                .rev()
                .find(|entry| {
                    entry.resolver.as_ref() == resolver && chain.starts_with(&entry.chain_prefix)
                })
                .map(|entry| entry.response.clone());

            (response, state.latency)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        response.unwrap_or_else(|| Ok(Vec::new()))
    }
}
