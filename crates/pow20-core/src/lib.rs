//! Core POW-20 covenant logic.
//!
//! This crate provides pure Rust implementations of:
//! - Decimal and hex ASCII rendering for token identifiers
//! - Proof-of-work validation against a rolling accumulator
//! - Capped reward scheduling for a depletable supply
//! - BSV-20 transfer inscription encoding
//! - The mint state transition, shared by verifier and builder
//! - Unsigned mint transaction assembly
//!
//! The single rule everything here serves: a spend of the current instance
//! is valid iff its outputs hash to the commitment this crate derives from
//! the current state and the supplied witness. Verifier and builder both
//! call the one derivation, so they cannot disagree about the bytes.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod ascii;
pub mod builder;
pub mod hash;
pub mod inscription;
pub mod mint;
pub mod output;
pub mod pow;
pub mod reward;
pub mod state;

pub use ascii::{bytes_to_ascii_hex, int_to_ascii};
pub use builder::{build_mint_tx, MintTransaction};
pub use hash::{hash256, sha256};
pub use inscription::{build_inscription, EncodingError};
pub use mint::{derive_mint, verify_mint, MintError, MintOutcome};
pub use output::{count_outputs, encode_varint, OutputParseError, TxOut};
pub use pow::{validate_pow, PowError};
pub use reward::compute_reward;
pub use state::{MintWitness, OutPoint, StateParseError, TokenState};
