//! The mint state transition.
//!
//! Both the on-ledger verifier and the off-ledger builder run
//! [`derive_mint`]; the verifier additionally pins the result to the
//! spending transaction through [`verify_mint`]. A single derivation is
//! what keeps the two roles from drifting apart byte-wise.

use alloc::vec::Vec;
use crate::hash::hash256;
use crate::inscription::{build_inscription, EncodingError};
use crate::output::{OutputParseError, TxOut};
use crate::pow::{validate_pow, PowError};
use crate::reward::compute_reward;
use crate::state::{MintWitness, OutPoint, TokenState};

/// Mint transition failures. All are pure: no output is produced and no
/// state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    /// The nonce digest does not clear the difficulty target. Recoverable:
    /// retry with a fresh nonce against the unchanged instance.
    InvalidProofOfWork {
        /// The digest that failed the check.
        digest: [u8; 32],
    },
    /// The spending transaction's output commitment does not match the
    /// derived one. Fatal for that transaction; nothing partial survives.
    CommitmentMismatch,
    /// An inscription descriptor fell outside its encodable range.
    Encoding(EncodingError),
    /// The witness trailing bytes are not well-formed outputs.
    MalformedOutputs(OutputParseError),
}

impl core::fmt::Display for MintError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MintError::InvalidProofOfWork { digest } => {
                write!(f, "invalid proof of work: {}", hex::encode(digest))
            }
            MintError::CommitmentMismatch => write!(f, "output commitment mismatch"),
            MintError::Encoding(e) => write!(f, "{}", e),
            MintError::MalformedOutputs(e) => write!(f, "trailing outputs: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MintError {}

impl From<PowError> for MintError {
    fn from(e: PowError) -> Self {
        MintError::InvalidProofOfWork { digest: e.digest }
    }
}

impl From<EncodingError> for MintError {
    fn from(e: EncodingError) -> Self {
        MintError::Encoding(e)
    }
}

impl From<OutputParseError> for MintError {
    fn from(e: OutputParseError) -> Self {
        MintError::MalformedOutputs(e)
    }
}

/// Everything a successful mint derivation pins down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    /// The successor state. Closed (supply 0) successors exist as values
    /// but are never written back to the ledger.
    pub next: TokenState,
    /// Amount actually paid to the winner.
    pub reward_paid: u64,
    /// Continuation output carrying the successor, absent once the pool
    /// closes.
    pub continuation: Option<TxOut>,
    /// Reward output paying the winner script.
    pub reward_output: TxOut,
    /// The exact serialized output bytes the spending transaction must
    /// commit to.
    pub outputs: Vec<u8>,
}

impl MintOutcome {
    /// The output commitment the enclosing transaction must carry.
    pub fn commitment(&self) -> [u8; 32] {
        hash256(&self.outputs)
    }
}

/// Derive the successor state and the output bytes a spend of `state` must
/// produce.
///
/// Pure: the same inputs always derive the same bytes, which is what lets
/// the off-ledger builder mirror the on-ledger verifier exactly.
pub fn derive_mint(
    state: &TokenState,
    outpoint: &OutPoint,
    witness: &MintWitness,
) -> Result<MintOutcome, MintError> {
    // The identifier is assigned exactly once, from the outpoint being
    // spent on the first mint. Set ids are carried forward untouched.
    let id = match &state.id {
        Some(id) => id.clone(),
        None => outpoint.token_id(),
    };

    // Proof of work gates everything else.
    let pow = validate_pow(&state.pow, &witness.nonce, state.difficulty)?;

    // Capped payout; supply shrinks toward exactly zero.
    let reward_paid = compute_reward(state.supply, state.reward);
    let supply = state.supply - reward_paid;

    let next = TokenState {
        pow: pow.to_vec(),
        reward: state.reward,
        difficulty: state.difficulty,
        id: Some(id.clone()),
        supply,
    };

    // A continuation output exists only while the pool stays open.
    let continuation = if supply > 0 {
        let mut script = build_inscription(&id, supply)?;
        script.extend_from_slice(&next.script_body());
        Some(TxOut { value: 1, script })
    } else {
        None
    };

    // The reward output pays the winner the capped amount.
    let mut reward_script = witness.winner_script.clone();
    reward_script.extend_from_slice(&build_inscription(&id, reward_paid)?);
    let reward_output = TxOut { value: 1, script: reward_script };

    // The byte sequence the spending transaction must reproduce:
    // [continuation?] || reward || trailing outputs, verbatim.
    let mut outputs = Vec::new();
    if let Some(out) = &continuation {
        out.serialize_into(&mut outputs);
    }
    reward_output.serialize_into(&mut outputs);
    outputs.extend_from_slice(&witness.trailing_outputs);

    Ok(MintOutcome {
        next,
        reward_paid,
        continuation,
        reward_output,
        outputs,
    })
}

/// The trust anchor: accept the spend iff the transaction's actual output
/// commitment equals the derived one.
pub fn verify_mint(
    state: &TokenState,
    outpoint: &OutPoint,
    witness: &MintWitness,
    hash_outputs: &[u8; 32],
) -> Result<MintOutcome, MintError> {
    let outcome = derive_mint(state, outpoint, witness)?;
    if &outcome.commitment() != hash_outputs {
        return Err(MintError::CommitmentMismatch);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn outpoint() -> OutPoint {
        OutPoint { txid: [0x5c; 32], vout: 0 }
    }

    fn winner_script() -> Vec<u8> {
        // OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
        let mut script = vec![0x76, 0xa9, 0x14];
        script.extend_from_slice(&[0x11; 20]);
        script.extend_from_slice(&[0x88, 0xac]);
        script
    }

    /// Brute-force a nonce that clears the state's difficulty.
    fn solve(state: &TokenState) -> Vec<u8> {
        for counter in 0u64..10_000_000 {
            let nonce = counter.to_le_bytes();
            if validate_pow(&state.pow, &nonce, state.difficulty).is_ok() {
                return nonce.to_vec();
            }
        }
        panic!("no nonce found");
    }

    fn witness(state: &TokenState) -> MintWitness {
        MintWitness {
            nonce: solve(state),
            winner_script: winner_script(),
            trailing_outputs: Vec::new(),
        }
    }

    #[test]
    fn test_first_mint_assigns_id_and_shrinks_supply() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let outcome = derive_mint(&genesis, &outpoint(), &witness(&genesis)).unwrap();

        assert_eq!(outcome.next.id.as_deref(), Some(outpoint().token_id().as_str()));
        assert_eq!(outcome.next.supply, 990);
        assert_eq!(outcome.reward_paid, 10);
        assert!(outcome.continuation.is_some());

        // Fixed parameters never move
        assert_eq!(outcome.next.reward, 10);
        assert_eq!(outcome.next.difficulty, 8);
    }

    #[test]
    fn test_pow_accumulator_chains() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let w = witness(&genesis);
        let outcome = derive_mint(&genesis, &outpoint(), &w).unwrap();

        let mut preimage = genesis.pow.clone();
        preimage.extend_from_slice(&w.nonce);
        assert_eq!(outcome.next.pow, hash256(&preimage).to_vec());
    }

    #[test]
    fn test_id_is_carried_forward_unchanged() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let first = derive_mint(&genesis, &outpoint(), &witness(&genesis)).unwrap();
        let id = first.next.id.clone().unwrap();

        // A later mint spends a different outpoint; the id must not move
        let later_outpoint = OutPoint { txid: [0x99; 32], vout: 3 };
        let state = first.next;
        let second = derive_mint(&state, &later_outpoint, &witness(&state)).unwrap();

        assert_eq!(second.next.id.as_deref(), Some(id.as_str()));
        assert_eq!(second.next.supply, 980);
    }

    #[test]
    fn test_terminal_mint_closes_pool() {
        let state = TokenState {
            pow: [0x07; 32].to_vec(),
            reward: 10,
            difficulty: 8,
            id: Some(outpoint().token_id()),
            supply: 5,
        };
        let outcome = derive_mint(&state, &outpoint(), &witness(&state)).unwrap();

        assert_eq!(outcome.reward_paid, 5);
        assert_eq!(outcome.next.supply, 0);
        assert!(outcome.next.is_closed());
        assert!(outcome.continuation.is_none());

        // Only the reward output remains in the committed bytes
        assert_eq!(outcome.outputs, outcome.reward_output.serialized());
    }

    #[test]
    fn test_supply_reaches_exactly_zero() {
        let mut state = TokenState::genesis(25, 10, 4);
        let mut point = outpoint();
        let mut supplies = Vec::new();

        loop {
            let outcome = derive_mint(&state, &point, &witness(&state)).unwrap();
            supplies.push(outcome.next.supply);
            if outcome.continuation.is_none() {
                assert!(outcome.next.is_closed());
                break;
            }
            state = outcome.next;
            // Each accepted spend confirms in a new transaction
            point = OutPoint { txid: hash256(&outcome.outputs), vout: 0 };
        }

        assert_eq!(supplies, vec![15, 5, 0]);
    }

    #[test]
    fn test_invalid_pow_produces_nothing() {
        let genesis = TokenState::genesis(1000, 10, 8);

        // Hunt a nonce that fails the target
        let mut bad_nonce = None;
        for counter in 0u64..1_000_000 {
            let nonce = counter.to_le_bytes();
            if validate_pow(&genesis.pow, &nonce, genesis.difficulty).is_err() {
                bad_nonce = Some(nonce.to_vec());
                break;
            }
        }
        let w = MintWitness {
            nonce: bad_nonce.unwrap(),
            winner_script: winner_script(),
            trailing_outputs: Vec::new(),
        };

        match derive_mint(&genesis, &outpoint(), &w) {
            Err(MintError::InvalidProofOfWork { .. }) => {}
            other => panic!("expected InvalidProofOfWork, got {:?}", other),
        }
    }

    #[test]
    fn test_continuation_script_shape() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let outcome = derive_mint(&genesis, &outpoint(), &witness(&genesis)).unwrap();

        let continuation = outcome.continuation.unwrap();
        assert_eq!(continuation.value, 1);

        // inscription(id, supply') followed by the successor's state body
        let inscription = build_inscription(outcome.next.id.as_deref().unwrap(), 990).unwrap();
        assert_eq!(&continuation.script[..inscription.len()], &inscription[..]);
        assert_eq!(
            &continuation.script[inscription.len()..],
            &outcome.next.script_body()[..]
        );
    }

    #[test]
    fn test_reward_output_shape() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let w = witness(&genesis);
        let outcome = derive_mint(&genesis, &outpoint(), &w).unwrap();

        assert_eq!(outcome.reward_output.value, 1);

        // winner script first, inscription of the paid amount appended
        let script = &outcome.reward_output.script;
        assert_eq!(&script[..w.winner_script.len()], &w.winner_script[..]);
        let inscription = build_inscription(outcome.next.id.as_deref().unwrap(), 10).unwrap();
        assert_eq!(&script[w.winner_script.len()..], &inscription[..]);
    }

    #[test]
    fn test_trailing_outputs_pass_through_verbatim() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let trailing = TxOut { value: 546, script: vec![0x6a, 0x01, 0xee] }.serialized();
        let w = MintWitness {
            nonce: solve(&genesis),
            winner_script: winner_script(),
            trailing_outputs: trailing.clone(),
        };

        let outcome = derive_mint(&genesis, &outpoint(), &w).unwrap();
        assert_eq!(&outcome.outputs[outcome.outputs.len() - trailing.len()..], &trailing[..]);
    }

    #[test]
    fn test_verify_mint_accepts_matching_commitment() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let w = witness(&genesis);

        let expected = derive_mint(&genesis, &outpoint(), &w).unwrap().commitment();
        assert!(verify_mint(&genesis, &outpoint(), &w, &expected).is_ok());
    }

    #[test]
    fn test_verify_mint_rejects_foreign_commitment() {
        let genesis = TokenState::genesis(1000, 10, 8);
        let w = witness(&genesis);

        let mut tampered = derive_mint(&genesis, &outpoint(), &w).unwrap().commitment();
        tampered[0] ^= 0x01;
        assert_eq!(
            verify_mint(&genesis, &outpoint(), &w, &tampered),
            Err(MintError::CommitmentMismatch)
        );
    }
}
