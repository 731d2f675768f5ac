//! Token state carried across mints.

use alloc::string::String;
use alloc::vec::Vec;
use crate::ascii::{bytes_to_ascii_hex, int_to_ascii};
use crate::output::{encode_varint, read_varint, TxOut};

/// OP_RETURN tags the state script body as non-executable data.
const OP_RETURN: u8 = 0x6a;

/// The funding outpoint of the instance being spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutPoint {
    /// Funding transaction id, internal byte order.
    pub txid: [u8; 32],
    /// Output index within the funding transaction.
    pub vout: u32,
}

impl OutPoint {
    /// Derive the human-readable token identifier:
    /// `<64-hex-char txid>_<decimal index>`.
    pub fn token_id(&self) -> String {
        let mut id = bytes_to_ascii_hex(&self.txid);
        id.push('_');
        id.push_str(&int_to_ascii(u64::from(self.vout)));
        id
    }
}

/// Per-mint witness data supplied by the miner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintWitness {
    /// Candidate proof-of-work nonce.
    pub nonce: Vec<u8>,
    /// Locking script that receives the reward.
    pub winner_script: Vec<u8>,
    /// Additional serialized outputs passed through unchanged.
    pub trailing_outputs: Vec<u8>,
}

/// The persistent covenant state, one instance per on-ledger copy.
///
/// A value type: minting never mutates an instance, it derives the
/// successor. `reward` and `difficulty` are fixed at genesis; `id` is
/// assigned on the first mint and carried forward bit-identical ever after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    /// Rolling proof-of-work accumulator, empty at genesis.
    pub pow: Vec<u8>,
    /// Fixed per-mint payout ceiling.
    pub reward: u64,
    /// Leading zero bits required of a validated digest.
    pub difficulty: u8,
    /// Token identifier, unset until the first mint.
    pub id: Option<String>,
    /// Remaining mintable balance.
    pub supply: u64,
}

/// Malformed state script body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateParseError {
    /// The body does not start with the OP_RETURN tag.
    MissingTag,
    /// The body ended inside a field.
    UnexpectedEnd,
    /// Extra bytes follow the last field.
    TrailingBytes,
    /// The identifier field is not ASCII.
    NonAsciiId,
}

impl core::fmt::Display for StateParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StateParseError::MissingTag => write!(f, "state script body missing OP_RETURN tag"),
            StateParseError::UnexpectedEnd => write!(f, "state script body truncated"),
            StateParseError::TrailingBytes => write!(f, "state script body has trailing bytes"),
            StateParseError::NonAsciiId => write!(f, "token identifier is not ASCII"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StateParseError {}

impl TokenState {
    /// The pre-first-mint state for a fresh deployment.
    pub fn genesis(supply: u64, reward: u64, difficulty: u8) -> Self {
        TokenState {
            pow: Vec::new(),
            reward,
            difficulty,
            id: None,
            supply,
        }
    }

    /// Whether the pool is exhausted. A closed instance never produces a
    /// continuation output.
    pub fn is_closed(&self) -> bool {
        self.supply == 0
    }

    /// Canonical state script body committed to by continuation outputs.
    ///
    /// Layout: OP_RETURN, varint-prefixed pow and id, then supply (u64-LE),
    /// reward (u64-LE) and difficulty (u8). Contract program code is the
    /// deployment tooling's concern; the covenant commits to the state
    /// encoding alone.
    pub fn script_body(&self) -> Vec<u8> {
        let id = self.id.as_deref().unwrap_or("");
        let mut body = Vec::with_capacity(1 + 9 + self.pow.len() + 9 + id.len() + 17);
        body.push(OP_RETURN);
        encode_varint(self.pow.len() as u64, &mut body);
        body.extend_from_slice(&self.pow);
        encode_varint(id.len() as u64, &mut body);
        body.extend_from_slice(id.as_bytes());
        body.extend_from_slice(&self.supply.to_le_bytes());
        body.extend_from_slice(&self.reward.to_le_bytes());
        body.push(self.difficulty);
        body
    }

    /// Parse a state script body produced by [`Self::script_body`].
    ///
    /// This is the read path for resuming against an on-ledger
    /// continuation without out-of-band state.
    pub fn from_script_body(body: &[u8]) -> Result<Self, StateParseError> {
        if body.first() != Some(&OP_RETURN) {
            return Err(StateParseError::MissingTag);
        }
        let mut pos = 1usize;

        let pow = read_field(body, &mut pos)?;
        let id_bytes = read_field(body, &mut pos)?;
        let id = if id_bytes.is_empty() {
            None
        } else {
            if !id_bytes.is_ascii() {
                return Err(StateParseError::NonAsciiId);
            }
            let mut id = String::with_capacity(id_bytes.len());
            for &b in id_bytes {
                id.push(b as char);
            }
            Some(id)
        };

        let supply = read_u64(body, &mut pos)?;
        let reward = read_u64(body, &mut pos)?;
        let difficulty = *body.get(pos).ok_or(StateParseError::UnexpectedEnd)?;
        pos += 1;

        if pos != body.len() {
            return Err(StateParseError::TrailingBytes);
        }

        Ok(TokenState {
            pow: pow.to_vec(),
            reward,
            difficulty,
            id,
            supply,
        })
    }

    /// The 1-unit output carrying a fresh deployment, before any mint.
    pub fn genesis_output(&self) -> TxOut {
        TxOut {
            value: 1,
            script: self.script_body(),
        }
    }
}

fn read_field<'a>(body: &'a [u8], pos: &mut usize) -> Result<&'a [u8], StateParseError> {
    let (len, consumed) =
        read_varint(body, *pos).map_err(|_| StateParseError::UnexpectedEnd)?;
    *pos += consumed;
    let len = usize::try_from(len).map_err(|_| StateParseError::UnexpectedEnd)?;
    let end = pos.checked_add(len).ok_or(StateParseError::UnexpectedEnd)?;
    let field = body.get(*pos..end).ok_or(StateParseError::UnexpectedEnd)?;
    *pos = end;
    Ok(field)
}

fn read_u64(body: &[u8], pos: &mut usize) -> Result<u64, StateParseError> {
    let bytes = body
        .get(*pos..*pos + 8)
        .ok_or(StateParseError::UnexpectedEnd)?;
    *pos += 8;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}
