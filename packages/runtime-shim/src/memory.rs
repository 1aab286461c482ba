//! Linear-memory size/grow accessors.

/// Size of one linear-memory page in bytes.
pub const WASM_PAGE: usize = 65536;

/// Returned by [`LinearMemory::grow`] when the engine refuses to grow.
pub const GROW_FAILED: usize = usize::MAX;

/// A resizable, page-granular linear memory.
pub trait LinearMemory {
    /// Current size in pages.
    fn size(&self) -> usize;

    /// Grow by `delta` pages. Returns the size in pages before growing, or
    /// [`GROW_FAILED`], matching the `memory.grow` instruction.
    fn grow(&mut self, delta: usize) -> usize;
}

/// Pages needed to hold `bytes` bytes.
pub fn pages_for(bytes: u64) -> u64 {
    bytes.div_ceil(WASM_PAGE as u64)
}

/// Memory index 0 of the running module, via the `memory.size` and
/// `memory.grow` builtins.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Wasm32Memory;

#[cfg(target_arch = "wasm32")]
impl LinearMemory for Wasm32Memory {
    fn size(&self) -> usize {
        core::arch::wasm32::memory_size::<0>()
    }

    fn grow(&mut self, delta: usize) -> usize {
        core::arch::wasm32::memory_grow::<0>(delta)
    }
}
