//! Mining controller: snapshot, search, build.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use pow20_core::reward::expected_attempts;
use pow20_core::{
    build_mint_tx, MintError, MintWitness, OutPoint, StateParseError, TokenState,
};

use crate::proposal::{MintProposal, MiningStats};
use crate::search::search_batch;

/// Driver failures.
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("mint rejected: {0}")]
    Mint(#[from] MintError),

    #[error("on-ledger state unreadable: {0}")]
    State(#[from] StateParseError),

    #[error("proposal encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Drives the search against one snapshot of the current on-ledger
/// instance.
///
/// The snapshot is immutable for the life of the search; when a competing
/// spend wins the race, [`Miner::advance`] points the driver at the new
/// instance and the search restarts from a fresh cursor.
pub struct Miner {
    /// The instance being spent.
    state: TokenState,
    /// Its on-ledger outpoint.
    outpoint: OutPoint,
    /// Locking script that will receive the reward.
    winner_script: Vec<u8>,
    /// Extra serialized outputs to carry through each proposal.
    trailing_outputs: Vec<u8>,
    /// Next nonce counter to try.
    cursor: u64,
    /// Search statistics.
    stats: MiningStats,
    /// Start of the current search.
    started: Option<Instant>,
}

impl Miner {
    /// Create a driver for the given instance snapshot.
    pub fn new(state: TokenState, outpoint: OutPoint, winner_script: Vec<u8>) -> Self {
        Miner {
            state,
            outpoint,
            winner_script,
            trailing_outputs: Vec::new(),
            cursor: 0,
            stats: MiningStats::new(),
            started: None,
        }
    }

    /// Create a driver by reading the instance straight from its on-ledger
    /// continuation script body.
    pub fn resume(
        script_body: &[u8],
        outpoint: OutPoint,
        winner_script: Vec<u8>,
    ) -> Result<Self, MinerError> {
        let state = TokenState::from_script_body(script_body)?;
        Ok(Miner::new(state, outpoint, winner_script))
    }

    /// Attach extra outputs to pass through every built transaction.
    pub fn with_trailing_outputs(mut self, trailing_outputs: Vec<u8>) -> Self {
        self.trailing_outputs = trailing_outputs;
        self
    }

    /// Run one search batch.
    ///
    /// Returns `Some(proposal)` when a nonce cleared the target and the
    /// full transaction was assembled; `None` means keep calling.
    pub fn mine_batch(&mut self, batch_size: u64) -> Result<Option<MintProposal>, MinerError> {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }

        let result = search_batch(
            &self.state.pow,
            self.state.difficulty,
            self.cursor,
            batch_size,
        );
        self.cursor = self.cursor.saturating_add(batch_size);
        self.stats.total_attempts += result.attempts;
        if let Some(started) = self.started {
            self.stats.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            self.stats.update_rate();
        }

        debug!(
            attempts = result.attempts,
            cursor = self.cursor,
            found = result.nonce.is_some(),
            "search batch done"
        );

        let nonce = match result.nonce {
            Some(nonce) => nonce,
            None => return Ok(None),
        };

        let witness = MintWitness {
            nonce: nonce.to_vec(),
            winner_script: self.winner_script.clone(),
            trailing_outputs: self.trailing_outputs.clone(),
        };
        let tx = build_mint_tx(&self.state, &self.outpoint, &witness)?;
        self.stats.mints_found += 1;

        info!(
            txid = %hex::encode(tx.txid),
            reward = tx.outcome.reward_paid,
            remaining = tx.outcome.next.supply,
            "mint transaction assembled"
        );

        Ok(Some(MintProposal::from_transaction(&tx, &nonce)))
    }

    /// Point the driver at a freshly confirmed instance and restart.
    ///
    /// This is the only move after losing a race: the old outpoint is
    /// spent, so every in-flight proposal against it is dead.
    pub fn advance(&mut self, state: TokenState, outpoint: OutPoint) {
        self.state = state;
        self.outpoint = outpoint;
        self.cursor = 0;
        self.started = None;
    }

    /// Current search statistics.
    pub fn stats(&self) -> &MiningStats {
        &self.stats
    }

    /// Average attempts a mint against this instance should take.
    pub fn expected_attempts(&self) -> f64 {
        expected_attempts(self.state.difficulty)
    }

    /// The instance snapshot being mined.
    pub fn state(&self) -> &TokenState {
        &self.state
    }
}
