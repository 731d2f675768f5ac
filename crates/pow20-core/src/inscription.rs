//! BSV-20 transfer inscription encoding.
//!
//! Inscriptions ride in a provably unspendable OP_FALSE OP_IF ... OP_ENDIF
//! envelope that downstream indexers read but the ledger never executes.

use alloc::vec::Vec;
use crate::ascii::int_to_ascii;

/// Protocol tag carried in every descriptor.
pub const PROTOCOL_TAG: &str = "bsv-20";

/// OP_FALSE OP_IF PUSH3 "ord" OP_1 PUSH18 "application/bsv-20" OP_0
const ENVELOPE_PREAMBLE: [u8; 27] = [
    0x00, 0x63, 0x03, b'o', b'r', b'd', 0x51, 0x12,
    b'a', b'p', b'p', b'l', b'i', b'c', b'a', b't', b'i', b'o', b'n',
    b'/', b'b', b's', b'v', b'-', b'2', b'0', 0x00,
];

const OP_ENDIF: u8 = 0x68;

/// The descriptor length prefix is a single byte.
const MAX_DESCRIPTOR_LEN: usize = 255;

/// Inscription encoding failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    /// The JSON descriptor exceeds the one-byte length prefix.
    DescriptorTooLong(usize),
}

impl core::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodingError::DescriptorTooLong(len) => {
                write!(f, "inscription descriptor is {} bytes, max {}", len, MAX_DESCRIPTOR_LEN)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodingError {}

/// Build the transfer inscription script for `amount` units of token `id`.
///
/// Layout: envelope preamble, one length byte, the JSON descriptor
/// `{"p":"bsv-20","op":"transfer","id":"<id>","amt":"<decimal>"}`, OP_ENDIF.
pub fn build_inscription(id: &str, amount: u64) -> Result<Vec<u8>, EncodingError> {
    let amt = int_to_ascii(amount);

    let mut descriptor = Vec::with_capacity(48 + id.len() + amt.len());
    descriptor.extend_from_slice(b"{\"p\":\"");
    descriptor.extend_from_slice(PROTOCOL_TAG.as_bytes());
    descriptor.extend_from_slice(b"\",\"op\":\"transfer\",\"id\":\"");
    descriptor.extend_from_slice(id.as_bytes());
    descriptor.extend_from_slice(b"\",\"amt\":\"");
    descriptor.extend_from_slice(amt.as_bytes());
    descriptor.extend_from_slice(b"\"}");

    if descriptor.len() > MAX_DESCRIPTOR_LEN {
        return Err(EncodingError::DescriptorTooLong(descriptor.len()));
    }

    let mut script = Vec::with_capacity(ENVELOPE_PREAMBLE.len() + 2 + descriptor.len());
    script.extend_from_slice(&ENVELOPE_PREAMBLE);
    script.push(descriptor.len() as u8);
    script.extend_from_slice(&descriptor);
    script.push(OP_ENDIF);
    Ok(script)
}
