//! Bloom filter for duplicate suppression of argument tuples.

/// Smallest bit-width exponent the auto-sizer will pick.
pub const MIN_AUTO_BITS: u8 = 13;

/// Largest supported bit-width exponent (2^33 bits = 1 GiB of filter).
pub const MAX_BITS: u8 = 33;

/// How many filter bits the auto-sizer budgets per expected trial.
const BITS_PER_TRIAL: u64 = 16;

/// Bit-addressed probabilistic set over 2^k bits.
///
/// The filter sits between tuple construction and property invocation:
/// a tuple whose composite hash was seen before is counted as a duplicate
/// instead of being re-tested. Membership is probabilistic, so a false
/// positive costs one suppressed trial and nothing else; no correctness
/// property depends on the filter.
///
/// Probing derives two positions from the single 64-bit tuple hash by
/// double hashing: the low word is the base, the high word (forced odd)
/// the step.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    mask: u64,
}

impl BloomFilter {
    /// Create a filter with exactly `2^exponent` bits, clamped to
    /// [`MAX_BITS`]. An exponent of zero degenerates to a single-bit
    /// filter that reports everything after the first tuple as seen.
    pub fn with_bit_exponent(exponent: u8) -> Self {
        let exponent = exponent.min(MAX_BITS);
        let bit_count: u64 = 1 << exponent;
        let words = bit_count.div_ceil(64) as usize;
        Self {
            bits: vec![0u64; words],
            mask: bit_count - 1,
        }
    }

    /// Auto-size for an expected trial count: the smallest power of two
    /// holding at least 16 bits per trial, with the exponent clamped to
    /// `13..=33`. Keeps the expected false-positive rate well below 1%
    /// at the nominal trial count.
    pub fn sized_for(trials: usize) -> Self {
        let want = (trials as u64)
            .saturating_mul(BITS_PER_TRIAL)
            .clamp(1, 1 << MAX_BITS);
        let exponent = (64 - want.next_power_of_two().leading_zeros() - 1) as u8;
        Self::with_bit_exponent(exponent.clamp(MIN_AUTO_BITS, MAX_BITS))
    }

    /// Total number of addressable bits.
    pub fn bit_count(&self) -> u64 {
        self.mask + 1
    }

    /// Record `hash` and report whether it was already present.
    ///
    /// Returns `true` only when every probed bit was already set, i.e.
    /// the hash (or a colliding one) has been recorded before.
    pub fn test_and_set(&mut self, hash: u64) -> bool {
        let base = hash;
        let step = (hash >> 32) | 1;

        let mut present = true;
        for i in 0..2u64 {
            let pos = base.wrapping_add(i.wrapping_mul(step)) & self.mask;
            let word = (pos >> 6) as usize;
            let bit = 1u64 << (pos & 63);
            if self.bits[word] & bit == 0 {
                present = false;
                self.bits[word] |= bit;
            }
        }
        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_is_novel_then_present() {
        let mut filter = BloomFilter::with_bit_exponent(16);
        assert!(!filter.test_and_set(0xdead_beef));
        assert!(filter.test_and_set(0xdead_beef));
        assert!(filter.test_and_set(0xdead_beef));
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = BloomFilter::with_bit_exponent(18);
        let hashes: Vec<u64> = (0..1000u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15)).collect();

        for &h in &hashes {
            filter.test_and_set(h);
        }
        for &h in &hashes {
            assert!(filter.test_and_set(h), "hash {:#x} must stay present", h);
        }
    }

    #[test]
    fn test_distinct_hashes_mostly_novel() {
        let mut filter = BloomFilter::sized_for(1000);
        let mut duplicates = 0;
        for i in 0..1000u64 {
            if filter.test_and_set(i.wrapping_mul(0x2545_f491_4f6c_dd1d)) {
                duplicates += 1;
            }
        }
        // 2^14 bits for 1000 entries leaves the false-positive rate tiny.
        assert!(duplicates < 10, "unexpected duplicate count {}", duplicates);
    }

    #[test]
    fn test_auto_sizing_bounds() {
        assert_eq!(BloomFilter::sized_for(1).bit_count(), 1 << 13);
        assert_eq!(BloomFilter::sized_for(100).bit_count(), 1 << 13);
        // 16 * 1000 = 16000 rounds up to 2^14.
        assert_eq!(BloomFilter::sized_for(1000).bit_count(), 1 << 14);
        assert_eq!(BloomFilter::sized_for(1_000_000).bit_count(), 1 << 24);
    }

    #[test]
    fn test_explicit_exponent_sizing() {
        assert_eq!(BloomFilter::with_bit_exponent(1).bit_count(), 2);
        assert_eq!(BloomFilter::with_bit_exponent(20).bit_count(), 1 << 20);
    }

    #[test]
    fn test_degenerate_single_bit_filter() {
        let mut filter = BloomFilter::with_bit_exponent(0);
        assert_eq!(filter.bit_count(), 1);
        assert!(!filter.test_and_set(1));
        // Every later hash lands on the same bit.
        assert!(filter.test_and_set(2));
        assert!(filter.test_and_set(3));
    }
}
