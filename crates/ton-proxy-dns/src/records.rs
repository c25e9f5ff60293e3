//! Records returned by a single resolution hop.
//!
//! The RPC client runs `dnsresolve` on a resolver contract and decodes the
//! resulting cell into a [`ResolvedRecord`]. The TL-B record kinds are:
//!
//! ```tlb
//! dns_smc_address#9fd3 smc_addr:MsgAddressInt flags:(## 8) { flags = 0 } = DNSRecord;
//! dns_next_resolver#ba93 resolver:MsgAddressInt = DNSRecord;
//! dns_adnl_address#ad01 adnl_addr:bits256 flags:(## 8) { flags <= 1 } proto_list:flags.0?ProtoList = DNSRecord;
//! dns_storage_address#7473 bag_id:bits256 = DNSRecord;
//! ```
//!
//! Only the last three lead anywhere for a proxy; everything else arrives as
//! [`ResolvedRecord::Unsupported`].

/// TL-B prefix for smart contract address record.
pub const PREFIX_SMC_ADDRESS: u16 = 0x9fd3;

/// TL-B prefix for next resolver record.
pub const PREFIX_NEXT_RESOLVER: u16 = 0xba93;

/// TL-B prefix for ADNL address record.
pub const PREFIX_ADNL_ADDRESS: u16 = 0xad01;

/// TL-B prefix for storage address record.
pub const PREFIX_STORAGE_ADDRESS: u16 = 0x7473;

/// TON workchain ID type.
pub type WorkchainId = i32;

/// A TON Storage bag ID (256-bit identifier).
pub type BagId = [u8; 32];

/// Address of a resolver contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsgAddressInt {
    /// The workchain ID (-1 for masterchain, 0 for basechain).
    pub workchain: WorkchainId,
    /// The 256-bit account address within the workchain.
    pub address: [u8; 32],
}

impl MsgAddressInt {
    pub fn new(workchain: WorkchainId, address: [u8; 32]) -> Self {
        Self { workchain, address }
    }

    /// Create an address in the masterchain (workchain -1).
    pub fn masterchain(address: [u8; 32]) -> Self {
        Self::new(-1, address)
    }

    /// Create an address in the basechain (workchain 0).
    pub fn basechain(address: [u8; 32]) -> Self {
        Self::new(0, address)
    }

    /// Raw `workchain:hex_address` form.
    pub fn to_raw_string(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.address))
    }
}

impl std::fmt::Display for MsgAddressInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_raw_string())
    }
}

/// A decoded DNS record for one hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRecord {
    /// Delegation to another resolver contract.
    NextResolver {
        /// Contract to query on the next hop.
        resolver: MsgAddressInt,
        /// The part of the name chain this hop did not consume.
        remaining: Vec<u8>,
    },

    /// TON Site hosted behind an ADNL node.
    AdnlAddress {
        /// The id as produced by the RPC client, not yet validated.
        raw_id: String,
    },

    /// TON Site stored as a TON Storage bag.
    StorageAddress {
        bag_id: BagId,
    },

    /// Any record kind the proxy has no use for.
    Unsupported {
        /// The record's TL-B prefix.
        prefix: u16,
    },
}

impl ResolvedRecord {
    /// Get the TL-B prefix for this record type.
    pub fn prefix(&self) -> u16 {
        match self {
            ResolvedRecord::NextResolver { .. } => PREFIX_NEXT_RESOLVER,
            ResolvedRecord::AdnlAddress { .. } => PREFIX_ADNL_ADDRESS,
            ResolvedRecord::StorageAddress { .. } => PREFIX_STORAGE_ADDRESS,
            ResolvedRecord::Unsupported { prefix } => *prefix,
        }
    }

    /// Whether this record ends resolution with an endpoint.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolvedRecord::AdnlAddress { .. } | ResolvedRecord::StorageAddress { .. }
        )
    }

    /// Create a NextResolver record.
    pub fn next_resolver(resolver: MsgAddressInt, remaining: impl Into<Vec<u8>>) -> Self {
        ResolvedRecord::NextResolver {
            resolver,
            remaining: remaining.into(),
        }
    }

    /// Create an AdnlAddress record.
    pub fn adnl_address(raw_id: impl Into<String>) -> Self {
        ResolvedRecord::AdnlAddress {
            raw_id: raw_id.into(),
        }
    }

    /// Create a StorageAddress record.
    pub fn storage_address(bag_id: BagId) -> Self {
        ResolvedRecord::StorageAddress { bag_id }
    }

    /// Create an Unsupported record.
    pub fn unsupported(prefix: u16) -> Self {
        ResolvedRecord::Unsupported { prefix }
    }
}
