use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

use crate::config::RandomConfig;

/// Source behind `impl_arc4random` and `impl_arc4random_buf`.
#[derive(Debug)]
pub enum HostRandom {
    Os(OsRng),
    Seeded(StdRng),
}

impl HostRandom {
    pub fn from_config(config: RandomConfig) -> Self {
        match config {
            RandomConfig::Os => HostRandom::Os(OsRng),
            RandomConfig::Seeded { seed } => HostRandom::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        match self {
            HostRandom::Os(rng) => rng.next_u32(),
            HostRandom::Seeded(rng) => rng.next_u32(),
        }
    }

    pub fn fill(&mut self, buf: &mut [u8]) {
        match self {
            HostRandom::Os(rng) => rng.fill_bytes(buf),
            HostRandom::Seeded(rng) => rng.fill_bytes(buf),
        }
    }
}
