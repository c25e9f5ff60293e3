//! DNS record categories.
//!
//! Every record stored in a TON DNS contract lives under a category, which is
//! the SHA256 hash of a short string tag. The proxy asks for the `site`
//! category on every hop by default.

use sha2::{Digest, Sha256};

/// DNS category as a 32-byte identifier.
pub type DnsCategory = [u8; 32];

/// Tag of the next-resolver category.
pub const CATEGORY_NEXT_RESOLVER: &str = "dns_next_resolver";

/// Tag of the wallet/smart-contract category.
pub const CATEGORY_WALLET: &str = "wallet";

/// Tag of the TON Site category (ADNL address or storage bag).
pub const CATEGORY_SITE: &str = "site";

/// Tag of the TON Storage category.
pub const CATEGORY_STORAGE: &str = "storage";

/// Compute the category selector for a record tag.
///
/// # Examples
///
/// ```
/// use ton_proxy_dns::categories::record_category;
///
/// let site = record_category("site");
/// assert_eq!(hex::encode(site), "fbae041b02c41ed0fd8a4efb039bc780dd6af4a1f0c420f42561ae705dda43fe");
/// ```
pub fn record_category(name: &str) -> DnsCategory {
    let digest = Sha256::digest(name.as_bytes());
    let mut category = [0u8; 32];
    category.copy_from_slice(&digest);
    category
}
