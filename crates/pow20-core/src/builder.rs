//! Off-ledger mint transaction assembly.
//!
//! The builder mirrors the on-ledger verifier by construction: its outputs
//! come from the same derivation the verifier runs, so a built transaction
//! is accepted on first submission or not at all.

use alloc::vec::Vec;
use crate::hash::hash256;
use crate::mint::{derive_mint, MintError, MintOutcome};
use crate::output::{count_outputs, encode_varint};
use crate::state::{MintWitness, OutPoint, TokenState};

/// Transaction format version.
const TX_VERSION: u32 = 1;

/// Input sequence: final, no relative locks.
const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// A fully assembled, unsigned mint transaction.
#[derive(Debug, Clone)]
pub struct MintTransaction {
    /// Raw transaction bytes, scriptSig left empty for the external signer.
    pub raw_tx: Vec<u8>,
    /// Transaction id of the unsigned serialization.
    pub txid: [u8; 32],
    /// The derivation the outputs were taken from.
    pub outcome: MintOutcome,
}

impl MintTransaction {
    /// Commitment over the serialized outputs, exactly as the verifier
    /// recomputes it.
    pub fn outputs_commitment(&self) -> [u8; 32] {
        self.outcome.commitment()
    }
}

/// Assemble the unsigned transaction spending `outpoint` with `witness`.
///
/// One input spending the current instance, then the derived outputs:
/// continuation (if the pool stays open), reward, and any trailing outputs
/// copied verbatim. The identifier is read from `state` when already set,
/// never re-derived.
pub fn build_mint_tx(
    state: &TokenState,
    outpoint: &OutPoint,
    witness: &MintWitness,
) -> Result<MintTransaction, MintError> {
    let outcome = derive_mint(state, outpoint, witness)?;

    // The output count varint needs the trailing outputs parsed; malformed
    // witness bytes are rejected here rather than shipped to the ledger.
    let trailing = count_outputs(&witness.trailing_outputs)?;
    let output_count = u64::from(outcome.continuation.is_some()) + 1 + trailing;

    let mut raw_tx = Vec::with_capacity(47 + 9 + outcome.outputs.len());

    // Version (4 bytes, little-endian)
    raw_tx.extend_from_slice(&TX_VERSION.to_le_bytes());

    // Input count (varint) - the single instance being spent
    raw_tx.push(0x01);

    // Input: the current on-ledger instance
    raw_tx.extend_from_slice(&outpoint.txid);
    raw_tx.extend_from_slice(&outpoint.vout.to_le_bytes());

    // Empty scriptSig; the external signer owns the unlocking data
    raw_tx.push(0x00);
    raw_tx.extend_from_slice(&SEQUENCE_FINAL.to_le_bytes());

    // Outputs, byte-identical to what the verifier derives
    encode_varint(output_count, &mut raw_tx);
    raw_tx.extend_from_slice(&outcome.outputs);

    // Locktime (4 bytes)
    raw_tx.extend_from_slice(&0u32.to_le_bytes());

    let txid = hash256(&raw_tx);

    Ok(MintTransaction { raw_tx, txid, outcome })
}
