//! End-to-end resolution scenarios against the scripted RPC client.
//!
//! Cache expiry is driven by tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{advance, Instant};
use ton_proxy_dns::{
    AdnlNodeId, DnsError, DnsResolver, MockDnsRpc, MsgAddressInt, ResolvedRecord, ResolverConfig,
    RpcError,
};

// ============================================================================
// Helpers
// ============================================================================

fn setup() -> (Arc<MockDnsRpc>, DnsResolver<MockDnsRpc>) {
    let rpc = Arc::new(MockDnsRpc::new());
    let dns = DnsResolver::new(Arc::clone(&rpc), ResolverConfig::default()).unwrap();
    (rpc, dns)
}

/// Let spawned refresh tasks run to completion.
///
/// With a paused clock the runtime only auto-advances once every task is idle.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn bag_address(bag_id: [u8; 32]) -> String {
    format!("{}.bag", hex::encode(bag_id))
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_site_via_next_resolver() {
    let (rpc, dns) = setup();
    let r1 = MsgAddressInt::basechain([0x51; 32]);
    let x = AdnlNodeId::new([0xAB; 32]);

    rpc.add_record(
        None,
        b"ton\0site\0".to_vec(),
        ResolvedRecord::next_resolver(r1.clone(), b"ton\0".to_vec()),
    );
    rpc.add_record(Some(r1.clone()), b"ton\0".to_vec(), ResolvedRecord::adnl_address(x.serialize()));

    let address = dns.resolve("site.ton").await.unwrap();

    assert_eq!(address, format!("{}.adnl", x.serialize()));
    assert_eq!(dns.cache_len().await, 1);
    assert_eq!(dns.cached("site.ton").await.unwrap().address, address);

    let calls = rpc.hop_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].resolver, Some(r1));
    assert_eq!(calls[1].chain, b"ton\0");
}

#[tokio::test]
async fn test_bag_direct_from_root() {
    let (rpc, dns) = setup();
    let y = [0xC4; 32];
    rpc.add_record(None, b"ton\0bag\0".to_vec(), ResolvedRecord::storage_address(y));

    let address = dns.resolve("bag.ton").await.unwrap();

    assert_eq!(address, bag_address(y));
    assert_eq!(address, format!("{}.bag", "c4".repeat(32)));
    assert_eq!(rpc.hop_count(), 1);
}

#[tokio::test]
async fn test_empty_record_list_writes_no_cache() {
    let (rpc, dns) = setup();
    rpc.add_records(None, b"ton\0".to_vec(), Vec::new());

    let result = dns.resolve("empty.ton").await;

    assert!(matches!(result, Err(DnsError::NoRecordsFound(_))));
    assert_eq!(dns.cache_len().await, 0);
    assert!(dns.cached("empty.ton").await.is_none());
}

#[tokio::test]
async fn test_endless_delegation_hits_depth_limit() {
    let (rpc, dns) = setup();
    for depth in 0..10 {
        let resolver = (depth > 0).then(|| MockDnsRpc::resolver_at(depth));
        rpc.add_record(
            resolver,
            Vec::new(),
            ResolvedRecord::next_resolver(MockDnsRpc::resolver_at(depth + 1), b"deep\0".to_vec()),
        );
    }

    let result = dns.resolve("deep.ton").await;

    assert!(matches!(result, Err(DnsError::DepthExceeded { max_hops: 4 })));
    assert_eq!(rpc.hop_count(), 4);
}

#[tokio::test]
async fn test_failed_resolution_keeps_previous_entry() {
    let (rpc, dns) = setup();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));
    dns.resolve("site.ton").await.unwrap();

    rpc.add_error(None, Vec::new(), RpcError::Network("down".to_string()));
    assert!(dns.resolve("other.ton").await.is_err());

    assert_eq!(dns.cache_len().await, 1);
    assert_eq!(dns.cached("site.ton").await.unwrap().address, bag_address([1; 32]));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_cold_resolutions_are_independent() {
    let (rpc, dns) = setup();
    rpc.set_latency(Duration::from_millis(50));
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([7; 32]));

    let (a, b) = tokio::join!(dns.resolve("site.ton"), dns.resolve("site.ton"));

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(rpc.hop_count(), 4);
    assert_eq!(dns.cache_len().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_resolver_is_shareable_across_tasks() {
    let (rpc, dns) = setup();
    rpc.configure_host("a.ton", ResolvedRecord::storage_address([0xA; 32]));
    rpc.configure_host("b.ton", ResolvedRecord::storage_address([0xB; 32]));

    let dns = Arc::new(dns);
    let handles: Vec<_> = ["a.ton", "b.ton"]
        .into_iter()
        .map(|host| {
            let dns = Arc::clone(&dns);
            tokio::spawn(async move { dns.resolve(host).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap().ends_with(".bag"));
    }
    assert_eq!(dns.cache_len().await, 2);
}

// ============================================================================
// Cache expiry
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fresh_entry_served_without_rpc() {
    let (rpc, dns) = setup();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));

    let first = dns.resolve("site.ton").await.unwrap();
    let hops = rpc.hop_count();

    advance(Duration::from_secs(100)).await;
    let second = dns.resolve("site.ton").await.unwrap();
    settle().await;

    assert_eq!(first, second);
    assert_eq!(rpc.hop_count(), hops);
}

#[tokio::test(start_paused = true)]
async fn test_stale_entry_served_and_refreshed_in_background() {
    let (rpc, dns) = setup();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));

    let old = dns.resolve("site.ton").await.unwrap();
    let t0 = dns.cached("site.ton").await.unwrap().created_at;
    let hops = rpc.hop_count();

    // The name moves to a new bag; the stale answer is still served once.
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([2; 32]));
    advance(Duration::from_secs(280)).await;
    let refreshed_at = Instant::now();

    let served = dns.resolve("site.ton").await.unwrap();
    assert_eq!(served, old);

    settle().await;

    // Exactly one more hop sequence, and the entry now carries the new answer.
    assert_eq!(rpc.hop_count(), hops * 2);
    let entry = dns.cached("site.ton").await.unwrap();
    assert_eq!(entry.address, bag_address([2; 32]));
    assert_eq!(entry.created_at, refreshed_at);
    assert!(entry.created_at > t0);

    let next = dns.resolve("site.ton").await.unwrap();
    assert_eq!(next, bag_address([2; 32]));
    assert_eq!(rpc.hop_count(), hops * 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_background_refresh_is_discarded() {
    let (rpc, dns) = setup();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));
    let old = dns.resolve("site.ton").await.unwrap();
    let t0 = dns.cached("site.ton").await.unwrap().created_at;

    rpc.add_error(None, Vec::new(), RpcError::Network("down".to_string()));
    advance(Duration::from_secs(285)).await;

    assert_eq!(dns.resolve("site.ton").await.unwrap(), old);
    settle().await;

    let entry = dns.cached("site.ton").await.unwrap();
    assert_eq!(entry.address, old);
    assert_eq!(entry.created_at, t0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_resolved_before_answering() {
    let (rpc, dns) = setup();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));
    dns.resolve("site.ton").await.unwrap();
    let hops = rpc.hop_count();

    rpc.configure_host("site.ton", ResolvedRecord::storage_address([2; 32]));
    advance(Duration::from_secs(310)).await;

    let address = dns.resolve("site.ton").await.unwrap();

    assert_eq!(address, bag_address([2; 32]));
    assert_eq!(rpc.hop_count(), hops * 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_entry_failure_is_not_masked() {
    let (rpc, dns) = setup();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));
    dns.resolve("site.ton").await.unwrap();

    rpc.clear();
    advance(Duration::from_secs(310)).await;

    let result = dns.resolve("site.ton").await;
    assert!(matches!(result, Err(DnsError::NoRecordsFound(_))));
}

#[tokio::test(start_paused = true)]
async fn test_custom_ttls() {
    let rpc = Arc::new(MockDnsRpc::new());
    let config = ResolverConfig::new().with_ttls(Duration::from_secs(10), Duration::from_secs(20));
    let dns = DnsResolver::new(Arc::clone(&rpc), config).unwrap();
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));

    dns.resolve("site.ton").await.unwrap();
    let hops = rpc.hop_count();

    advance(Duration::from_secs(25)).await;
    rpc.clear();

    assert!(dns.resolve("site.ton").await.is_err());
    assert_eq!(rpc.hop_count(), hops + 1);
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_start_retries_sync_in_background() {
    let rpc = Arc::new(MockDnsRpc::new());
    rpc.fail_sync(2);
    rpc.configure_host("site.ton", ResolvedRecord::storage_address([1; 32]));

    let dns = DnsResolver::start(Arc::clone(&rpc), ResolverConfig::default()).unwrap();

    // Resolution does not wait for the liveness check.
    assert!(dns.resolve("site.ton").await.is_ok());

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(rpc.sync_count(), 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(rpc.sync_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_resolver_stops_sync_retries() {
    let rpc = Arc::new(MockDnsRpc::new());
    rpc.fail_sync(usize::MAX);

    let dns = DnsResolver::start(Arc::clone(&rpc), ResolverConfig::default()).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(rpc.sync_count(), 1);

    drop(dns);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(rpc.sync_count(), 1);
}
