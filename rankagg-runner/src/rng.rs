//! Named random streams for building trials.
//!
//! Every trial draws from its own stream, identified by a purpose label
//! (`"perturb"`, `"bagging"`, ...) and the trial index. A stream's seed is a
//! BLAKE3 digest of the master seed, label and index, so trial 17 can be
//! rebuilt alone and a rayon worker never observes another trial's draws.

use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Seed of the `label` stream for trial `iteration`: the first eight
    /// digest bytes, little-endian.
    pub fn sub_seed(&self, label: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Fresh generator positioned at the start of the stream.
    pub fn rng_for(&self, label: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(label, iteration))
    }
}
