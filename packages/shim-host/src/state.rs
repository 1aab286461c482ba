use runtime_shim::BumpAllocator;
use wasmtime::{StoreLimits, StoreLimitsBuilder};

use crate::config::HostConfig;
use crate::random::HostRandom;

/// Store data for one guest instance.
pub struct HostState {
    pub(crate) heap: BumpAllocator,
    pub(crate) random: HostRandom,
    pub(crate) limits: StoreLimits,
}

impl HostState {
    pub fn new(config: &HostConfig) -> Self {
        let heap = match config.heap_start {
            Some(address) => BumpAllocator::starting_at(address),
            None => BumpAllocator::new(),
        };
        let mut limits = StoreLimitsBuilder::new();
        if let Some(bytes) = config.max_memory_bytes() {
            limits = limits.memory_size(bytes);
        }
        Self {
            heap,
            random: HostRandom::from_config(config.random),
            limits: limits.build(),
        }
    }
}
