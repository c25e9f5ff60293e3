//! ADNL node identifiers.
//!
//! The canonical textual form of a short ADNL id is 55 base32 characters:
//!
//! ```text
//! [0x2d tag][32-byte id][CRC16-XMODEM] -> 35 bytes -> 56 base32 chars
//! ```
//!
//! The first character is always `f` (from the tag byte) and is dropped.
//! [`AdnlNodeId::parse`] accepts only this form.

use crate::error::{DnsError, DnsResult};

/// Tag byte prepended to the id before checksumming.
const ADNL_ID_TAG: u8 = 0x2d;

/// Length of the canonical base32 form.
pub const ADNL_ID_BASE32_LEN: usize = 55;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// A 256-bit ADNL node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdnlNodeId([u8; 32]);

impl AdnlNodeId {
    /// Wrap raw id bytes.
    pub fn new(id: [u8; 32]) -> Self {
        Self(id)
    }

    /// Get the raw id bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse an id from its canonical base32 form.
    ///
    /// Anything else, including hex or padded text, is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use ton_proxy_dns::adnl::AdnlNodeId;
    ///
    /// let id = AdnlNodeId::new([0xAB; 32]);
    /// let text = id.serialize();
    /// assert_eq!(AdnlNodeId::parse(&text).unwrap(), id);
    /// assert!(AdnlNodeId::parse(&"ab".repeat(32)).is_err());
    /// ```
    pub fn parse(raw: &str) -> DnsResult<Self> {
        if raw.len() != ADNL_ID_BASE32_LEN {
            return Err(DnsError::MalformedAddress(format!(
                "expected {} base32 characters, got {}",
                ADNL_ID_BASE32_LEN,
                raw.len()
            )));
        }

        Self::parse_base32(raw)
    }

    fn parse_base32(raw: &str) -> DnsResult<Self> {
        let mut text = String::with_capacity(ADNL_ID_BASE32_LEN + 1);
        text.push('f');
        text.push_str(raw);

        let bytes = base32_decode(&text)?;
        if bytes.len() != 35 {
            return Err(DnsError::MalformedAddress(format!(
                "decoded to {} bytes, expected 35",
                bytes.len()
            )));
        }

        if bytes[0] != ADNL_ID_TAG {
            return Err(DnsError::MalformedAddress(format!(
                "invalid tag byte 0x{:02x}",
                bytes[0]
            )));
        }

        let expected_crc = ((bytes[33] as u16) << 8) | (bytes[34] as u16);
        let actual_crc = crc16_xmodem(&bytes[..33]);
        if expected_crc != actual_crc {
            return Err(DnsError::MalformedAddress(format!(
                "CRC16 mismatch: expected {:04x}, got {:04x}",
                expected_crc, actual_crc
            )));
        }

        let mut id = [0u8; 32];
        id.copy_from_slice(&bytes[1..33]);
        Ok(Self(id))
    }

    /// Serialize to the canonical 55-character base32 form.
    pub fn serialize(&self) -> String {
        let mut data = Vec::with_capacity(35);
        data.push(ADNL_ID_TAG);
        data.extend_from_slice(&self.0);

        let crc = crc16_xmodem(&data);
        data.push((crc >> 8) as u8);
        data.push(crc as u8);

        let mut text = base32_encode(&data);
        text.remove(0);
        text
    }
}

impl std::fmt::Display for AdnlNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

impl std::str::FromStr for AdnlNodeId {
    type Err = DnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unpadded lowercase RFC 4648 base32.
fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }

    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    out
}

/// Decode unpadded base32, accepting either case.
fn base32_decode(text: &str) -> DnsResult<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for c in text.bytes() {
        let value = match c {
            b'a'..=b'z' => c - b'a',
            b'A'..=b'Z' => c - b'A',
            b'2'..=b'7' => c - b'2' + 26,
            _ => {
                return Err(DnsError::MalformedAddress(format!(
                    "invalid base32 character {:?}",
                    c as char
                )));
            }
        };

        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    Ok(out)
}

/// CRC16-XMODEM checksum.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
