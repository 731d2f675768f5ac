//! Proposal and statistics types handed to the external signer.

use serde::{Deserialize, Serialize};
use pow20_core::MintTransaction;

/// A finished mint proposal, ready for signing and broadcast.
///
/// Byte fields are hex-encoded; this is the read contract for the signer
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintProposal {
    /// Raw unsigned transaction.
    pub raw_tx: String,
    /// Transaction id of the unsigned serialization.
    pub txid: String,
    /// Token identifier the mint settles against.
    pub token_id: String,
    /// Nonce that cleared the difficulty target.
    pub nonce: String,
    /// Amount paid to the winner script.
    pub reward_paid: u64,
    /// Supply remaining after this mint.
    pub remaining_supply: u64,
    /// Whether this mint closed the pool.
    pub closed: bool,
}

impl MintProposal {
    /// Package a built transaction for the signer.
    pub fn from_transaction(tx: &MintTransaction, nonce: &[u8]) -> Self {
        let next = &tx.outcome.next;
        MintProposal {
            raw_tx: hex::encode(&tx.raw_tx),
            txid: hex::encode(tx.txid),
            // the id is always set after a successful derivation
            token_id: next.id.clone().unwrap_or_default(),
            nonce: hex::encode(nonce),
            reward_paid: tx.outcome.reward_paid,
            remaining_supply: next.supply,
            closed: next.is_closed(),
        }
    }

    /// Serialize as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Search statistics for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiningStats {
    /// Total nonces tried.
    pub total_attempts: u64,
    /// Current attempt rate (nonces per second).
    pub attempt_rate: f64,
    /// Elapsed search time in milliseconds.
    pub elapsed_ms: f64,
    /// Mints assembled from this driver.
    pub mints_found: u32,
}

impl MiningStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the attempt rate from the elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_ms > 0.0 {
            self.attempt_rate = (self.total_attempts as f64) / (self.elapsed_ms / 1000.0);
        }
    }

    /// Format the attempt rate for display.
    pub fn format_rate(&self) -> String {
        if self.attempt_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.attempt_rate / 1_000_000_000.0)
        } else if self.attempt_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.attempt_rate / 1_000_000.0)
        } else if self.attempt_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.attempt_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.attempt_rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_rate() {
        let mut stats = MiningStats::new();
        stats.total_attempts = 5000;
        stats.elapsed_ms = 2000.0;
        stats.update_rate();

        assert_eq!(stats.attempt_rate, 2500.0);
        assert_eq!(stats.format_rate(), "2.50 KH/s");
    }

    #[test]
    fn test_proposal_json_shape() {
        let proposal = MintProposal {
            raw_tx: "0100".into(),
            txid: "ab".into(),
            token_id: "cd_0".into(),
            nonce: "0000000000000000".into(),
            reward_paid: 10,
            remaining_supply: 990,
            closed: false,
        };

        let json = proposal.to_json().unwrap();
        let parsed: MintProposal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.token_id, "cd_0");
        assert_eq!(parsed.reward_paid, 10);
        assert_eq!(parsed.remaining_supply, 990);
        assert!(!parsed.closed);
    }
}
