//! Ledger output serialization.
//!
//! Each output is (value: u64-LE, script length: varint, script bytes).
//! The commitment engine manipulates these bytes directly, so the layout
//! here is the one the ledger itself hashes.

use alloc::vec::Vec;

/// A transaction output: value plus raw locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Output value in base units.
    pub value: u64,
    /// Raw locking script bytes.
    pub script: Vec<u8>,
}

impl TxOut {
    /// Append the serialized output to `out`.
    pub fn serialize_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.value.to_le_bytes());
        encode_varint(self.script.len() as u64, out);
        out.extend_from_slice(&self.script);
    }

    /// The serialized output bytes.
    pub fn serialized(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 9 + self.script.len());
        self.serialize_into(&mut out);
        out
    }
}

/// Malformed serialized output data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputParseError {
    /// Data ended inside an output.
    UnexpectedEnd,
}

impl core::fmt::Display for OutputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OutputParseError::UnexpectedEnd => write!(f, "serialized outputs truncated"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutputParseError {}

/// Encode a variable-length integer.
pub fn encode_varint(value: u64, out: &mut Vec<u8>) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Decode a varint at `data[pos..]`, returning the value and bytes consumed.
pub fn read_varint(data: &[u8], pos: usize) -> Result<(u64, usize), OutputParseError> {
    let first = *data.get(pos).ok_or(OutputParseError::UnexpectedEnd)?;
    let take = |width: usize| -> Result<&[u8], OutputParseError> {
        data.get(pos + 1..pos + 1 + width)
            .ok_or(OutputParseError::UnexpectedEnd)
    };
    match first {
        0xfd => {
            let bytes = take(2)?;
            Ok((u64::from(u16::from_le_bytes([bytes[0], bytes[1]])), 3))
        }
        0xfe => {
            let bytes = take(4)?;
            Ok((
                u64::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
                5,
            ))
        }
        0xff => {
            let bytes = take(8)?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            Ok((u64::from_le_bytes(raw), 9))
        }
        v => Ok((u64::from(v), 1)),
    }
}

/// Count serialized outputs in a byte run, verifying the framing.
///
/// The run must consist of zero or more complete outputs with nothing left
/// over.
pub fn count_outputs(data: &[u8]) -> Result<u64, OutputParseError> {
    let mut pos = 0usize;
    let mut count = 0u64;
    while pos < data.len() {
        if data.len() - pos < 8 {
            return Err(OutputParseError::UnexpectedEnd);
        }
        pos += 8;

        let (script_len, consumed) = read_varint(data, pos)?;
        pos += consumed;

        let script_len =
            usize::try_from(script_len).map_err(|_| OutputParseError::UnexpectedEnd)?;
        if data.len() - pos < script_len {
            return Err(OutputParseError::UnexpectedEnd);
        }
        pos += script_len;
        count += 1;
    }
    Ok(count)
}
