//! Nonce search driver and mint proposal assembly.
//!
//! The covenant core is deliberately inert: it validates and derives but
//! never searches. This crate runs the local brute-force loop against a
//! snapshot of the current on-ledger instance, tracks search statistics,
//! and packages an accepted mint as a JSON proposal for the external
//! signer/broadcaster.
//!
//! Racing is resolved by the ledger, not here: when someone else's spend
//! confirms first, the driver is simply pointed at the new instance and
//! restarts.

pub mod driver;
pub mod proposal;
pub mod search;

pub use driver::{Miner, MinerError};
pub use proposal::{MintProposal, MiningStats};
pub use search::{search_batch, SearchResult};
