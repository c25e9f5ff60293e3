//! Name-chain encoding for DNS resolution.
//!
//! Resolver contracts consume names in an internal format:
//! - Labels are reversed so the root-most label comes first
//! - Each label is followed by a null byte
//! - Example: "test.ton" -> b"ton\0test\0"
//! - Example: "sub.test.ton" -> b"ton\0test\0sub\0"
//!
//! Each hop consumes a prefix of this chain and hands back the rest, so the
//! encoding is computed once per resolution.

/// Convert a host name into the chain consumed by the root resolver.
///
/// Empty labels (leading, trailing or doubled dots) are dropped. A name with no
/// labels at all yields just the terminator byte.
///
/// # Examples
///
/// ```
/// use ton_proxy_dns::chain::prepare_chain;
///
/// assert_eq!(prepare_chain("test.ton"), b"ton\0test\0");
/// assert_eq!(prepare_chain("sub.test.ton."), b"ton\0test\0sub\0");
/// assert_eq!(prepare_chain(""), b"\0");
/// ```
pub fn prepare_chain(name: &str) -> Vec<u8> {
    let labels: Vec<&str> = name.split('.').filter(|label| !label.is_empty()).collect();

    if labels.is_empty() {
        return vec![0];
    }

    let mut chain = Vec::with_capacity(name.len() + 1);
    for label in labels.iter().rev() {
        chain.extend_from_slice(label.as_bytes());
        chain.push(0);
    }

    chain
}

/// Render a (possibly partially consumed) chain back in dotted form.
///
/// Used for logging the remaining part of a name between hops. Invalid UTF-8
/// is replaced rather than rejected.
///
/// # Examples
///
/// ```
/// use ton_proxy_dns::chain::chain_to_domain;
///
/// assert_eq!(chain_to_domain(b"ton\0test\0"), "test.ton");
/// assert_eq!(chain_to_domain(b"\0"), "");
/// ```
pub fn chain_to_domain(chain: &[u8]) -> String {
    let labels: Vec<String> = chain
        .split(|&byte| byte == 0)
        .filter(|label| !label.is_empty())
        .map(|label| String::from_utf8_lossy(label).into_owned())
        .rev()
        .collect();

    labels.join(".")
}
