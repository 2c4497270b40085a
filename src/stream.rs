//! Seed-addressable random stream backing argument allocation.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh3::xxh3_64;

/// Domain tag mixed into trial-seed derivation so trial seeds never
/// collide with seeds derived for other purposes from the same run seed.
const TAG_TRIAL: &[u8] = b"trial";

/// Derive the seed for one trial from the run seed and the trial index.
///
/// The derivation is `xxh3_64(run_seed_le || tag || index_le)`: stable
/// across releases and platforms, and a different run seed or index yields
/// an unrelated trial seed. The trial seed printed on failure feeds
/// straight back into [`RandomStream::new`] to rebuild the argument tuple.
pub fn derive_trial_seed(run_seed: u64, trial: u64) -> u64 {
    let mut buf = [0u8; 21];
    buf[..8].copy_from_slice(&run_seed.to_le_bytes());
    buf[8..13].copy_from_slice(TAG_TRIAL);
    buf[13..].copy_from_slice(&trial.to_le_bytes());
    xxh3_64(&buf)
}

/// Deterministic source of 64-bit words for one trial.
///
/// Every word is derived from the trial seed alone: re-instantiating a
/// stream with the same seed replays the identical sequence, which is what
/// makes a reported trial seed a complete reproducer. Allocators are the
/// only consumers; the engine itself never draws from the stream.
///
/// The stream implements [`rand::RngCore`], so allocators can use the
/// whole `rand` adapter surface (`gen_range` and friends) on top of it.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: ChaCha8Rng,
    seed: u64,
}

impl RandomStream {
    /// Create a stream positioned at the start of the sequence for `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The trial seed this stream was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw the next 64-bit word.
    pub fn next64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
