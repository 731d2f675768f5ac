//! Proof-of-work validation against the rolling accumulator.

use alloc::vec::Vec;
use crate::hash::hash256;

/// A nonce whose digest did not clear the difficulty target.
///
/// Expected during search; the caller retries with a fresh nonce against
/// the unchanged instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowError {
    /// The candidate digest that failed the check.
    pub digest: [u8; 32],
}

impl core::fmt::Display for PowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "invalid proof of work: {}", hex::encode(self.digest))
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PowError {}

/// Validate a mint nonce against the current accumulator.
///
/// The candidate is hash256(prior_pow || nonce). Read as a little-endian
/// 256-bit integer, it clears the target iff its top `difficulty` bits are
/// all zero. On success the candidate becomes the new accumulator.
///
/// A difficulty of 0 accepts any nonce.
pub fn validate_pow(
    prior_pow: &[u8],
    nonce: &[u8],
    difficulty: u8,
) -> Result<[u8; 32], PowError> {
    let mut preimage = Vec::with_capacity(prior_pow.len() + nonce.len());
    preimage.extend_from_slice(prior_pow);
    preimage.extend_from_slice(nonce);

    let digest = hash256(&preimage);
    if leading_zero_bits(&digest) >= u32::from(difficulty) {
        Ok(digest)
    } else {
        Err(PowError { digest })
    }
}

/// Count zero bits from the most significant end of the digest's
/// little-endian integer reading.
///
/// The last byte of the array is the most significant byte of that
/// reading, so counting starts there and walks backwards.
pub fn leading_zero_bits(digest: &[u8; 32]) -> u32 {
    let mut zeros = 0u32;
    for byte in digest.iter().rev() {
        if *byte == 0 {
            zeros += 8;
        } else {
            zeros += byte.leading_zeros();
            break;
        }
    }
    zeros
}
