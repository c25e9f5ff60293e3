//! Error types for TON DNS resolution.

use thiserror::Error;

/// Result type for name resolution.
pub type DnsResult<T> = Result<T, DnsError>;

/// Errors surfaced to callers of [`DnsResolver::resolve`](crate::DnsResolver::resolve).
#[derive(Debug, Error)]
pub enum DnsError {
    /// The resolver chain kept delegating past the hop limit.
    #[error("DNS resolution depth limit exceeded ({max_hops} hops)")]
    DepthExceeded { max_hops: usize },

    /// A hop returned no records for the requested category.
    #[error("no DNS entries found for {0}")]
    NoRecordsFound(String),

    /// A terminal ADNL record carried an identifier that does not parse.
    #[error("Failed to parse ADNL address: {0}")]
    MalformedAddress(String),

    /// A hop returned a record kind this resolver cannot turn into an endpoint.
    #[error("unsupported DNS record type: prefix 0x{prefix:04x}")]
    UnsupportedRecord { prefix: u16 },

    /// The RPC collaborator failed to run the query.
    #[error("RPC failure: {0}")]
    RpcFailure(#[from] RpcError),
}

/// Errors reported by a [`DnsRpc`](crate::DnsRpc) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Transport-level failure (connection lost, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The liteserver answered with something that could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The resolver contract get-method did not exit cleanly.
    #[error("contract execution failed with exit code {exit_code}")]
    Execution { exit_code: i32 },
}

/// Invalid [`ResolverConfig`](crate::ResolverConfig) values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("soft TTL ({soft:?}) must not exceed hard TTL ({hard:?})")]
    SoftTtlAboveHard {
        soft: std::time::Duration,
        hard: std::time::Duration,
    },

    #[error("hard TTL must be non-zero")]
    ZeroHardTtl,

    #[error("max hops must be at least 1")]
    ZeroMaxHops,
}
