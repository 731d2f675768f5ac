//! Brute-force nonce search.

use pow20_core::pow::validate_pow;

/// Result of one search batch.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Winning nonce bytes, if any counter in the batch cleared the target.
    pub nonce: Option<[u8; 8]>,
    /// The accepted accumulator digest for that nonce.
    pub pow: Option<[u8; 32]>,
    /// Nonces tried in this batch.
    pub attempts: u64,
}

impl SearchResult {
    /// A batch that exhausted its range without a hit.
    fn not_found(attempts: u64) -> Self {
        SearchResult { nonce: None, pow: None, attempts }
    }

    /// A batch that found a valid nonce.
    fn found(nonce: [u8; 8], pow: [u8; 32], attempts: u64) -> Self {
        SearchResult { nonce: Some(nonce), pow: Some(pow), attempts }
    }
}

/// Try `count` counter-derived nonces starting at `start`.
///
/// Nonces are the counter's little-endian bytes. Batches are independent
/// and restartable, so concurrent searchers coordinate by nothing more
/// than picking disjoint counter ranges.
pub fn search_batch(prior_pow: &[u8], difficulty: u8, start: u64, count: u64) -> SearchResult {
    let end = start.saturating_add(count);
    for counter in start..end {
        let nonce = counter.to_le_bytes();
        if let Ok(pow) = validate_pow(prior_pow, &nonce, difficulty) {
            return SearchResult::found(nonce, pow, counter - start + 1);
        }
    }
    SearchResult::not_found(end - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pow20_core::pow::leading_zero_bits;

    #[test]
    fn test_zero_difficulty_hits_immediately() {
        let result = search_batch(b"", 0, 0, 10);
        assert_eq!(result.nonce, Some(0u64.to_le_bytes()));
        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn test_search_finds_valid_nonce() {
        let prior = [0x42u8; 32];
        let mut start = 0u64;
        let result = loop {
            let result = search_batch(&prior, 8, start, 1024);
            if result.nonce.is_some() {
                break result;
            }
            start += 1024;
        };

        let pow = result.pow.unwrap();
        assert!(leading_zero_bits(&pow) >= 8);
        assert_eq!(
            validate_pow(&prior, &result.nonce.unwrap(), 8).unwrap(),
            pow
        );
    }

    #[test]
    fn test_exhausted_batch_counts_attempts() {
        // Difficulty 255 is unreachable in any small batch
        let result = search_batch(b"", 255, 0, 100);
        assert!(result.nonce.is_none());
        assert_eq!(result.attempts, 100);
    }
}
