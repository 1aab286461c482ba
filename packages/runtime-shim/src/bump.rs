//! Bump allocator over linear memory.
//!
//! The cursor only moves forward; `free` never reclaims. Addresses are guest
//! (wasm32) addresses, so the same allocator serves an in-guest heap and a
//! host managing a guest's memory from outside.

use core::ffi::c_int;

use thiserror::Error;

use crate::memory::{pages_for, LinearMemory, GROW_FAILED, WASM_PAGE};

/// wasi-libc numbering.
pub const EINVAL: c_int = 28;
pub const ENOMEM: c_int = 48;

/// Pointer width of the guest address space.
const POINTER_WIDTH: usize = 4;
const ADDRESS_SPACE: u64 = 1 << 32;
const PAGE: u64 = WASM_PAGE as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("alignment {0} is not a power of two multiple of the pointer width")]
    InvalidAlignment(usize),
    #[error("out of linear memory allocating {size} bytes")]
    OutOfMemory { size: usize },
}

impl AllocError {
    /// The `posix_memalign` return code for this error.
    pub fn errno(&self) -> c_int {
        match self {
            AllocError::InvalidAlignment(_) => EINVAL,
            AllocError::OutOfMemory { .. } => ENOMEM,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    pub allocations: u64,
    pub frees: u64,
    pub bytes_allocated: u64,
    pub pages_grown: u64,
}

/// `[cursor, limit)` is free space the allocator owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    cursor: u64,
    limit: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BumpAllocator {
    start: Option<u32>,
    region: Option<Region>,
    stats: HeapStats,
}

impl BumpAllocator {
    /// Starts at the end of committed memory on the first allocation.
    pub const fn new() -> Self {
        Self {
            start: None,
            region: None,
            stats: HeapStats {
                allocations: 0,
                frees: 0,
                bytes_allocated: 0,
                pages_grown: 0,
            },
        }
    }

    /// Starts handing out memory at `address` instead of the memory end.
    pub const fn starting_at(address: u32) -> Self {
        let mut heap = Self::new();
        heap.start = Some(address);
        heap
    }

    /// Next free address, once the first allocation has happened.
    pub fn cursor(&self) -> Option<u64> {
        self.region.map(|region| region.cursor)
    }

    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    /// Allocate `size` bytes at `alignment`, growing `memory` as needed.
    ///
    /// A zero `size` succeeds with the null address and does not move the
    /// cursor. On error no block is handed out.
    pub fn allocate<M: LinearMemory>(
        &mut self,
        memory: &mut M,
        alignment: usize,
        size: usize,
    ) -> Result<u32, AllocError> {
        if !alignment.is_power_of_two() || alignment % POINTER_WIDTH != 0 {
            return Err(AllocError::InvalidAlignment(alignment));
        }
        if size == 0 {
            return Ok(0);
        }

        let out_of_memory = AllocError::OutOfMemory { size };
        let mut region = self.region.unwrap_or_else(|| self.initial_region(memory));
        loop {
            let start = align_up(region.cursor, alignment as u64).ok_or(out_of_memory)?;
            let end = start.checked_add(size as u64).ok_or(out_of_memory)?;
            if end > ADDRESS_SPACE {
                return Err(out_of_memory);
            }
            if end <= region.limit {
                region.cursor = end;
                self.region = Some(region);
                self.stats.allocations += 1;
                self.stats.bytes_allocated += size as u64;
                return Ok(start as u32);
            }

            let pages = pages_for(end - region.limit);
            let previous = memory.grow(pages as usize);
            if previous == GROW_FAILED {
                tracing::debug!(pages, size, "linear memory refused to grow");
                return Err(out_of_memory);
            }
            self.stats.pages_grown += pages;

            let previous_end = previous as u64 * PAGE;
            if previous_end == region.limit {
                region.limit += pages * PAGE;
            } else {
                // Someone else grew memory since our last look; the pages we
                // just received start at the old end.
                tracing::trace!(previous_end, limit = region.limit, "starting fresh heap region");
                region = Region {
                    cursor: previous_end,
                    limit: previous_end + pages * PAGE,
                };
            }
            // Pages we grew are ours even if a later grow fails.
            self.region = Some(region);
        }
    }

    /// Bump blocks are never reclaimed; this only counts non-null frees.
    pub fn free(&mut self, address: u32) {
        if address != 0 {
            self.stats.frees += 1;
        }
    }

    fn initial_region<M: LinearMemory>(&self, memory: &M) -> Region {
        let end = memory.size() as u64 * PAGE;
        Region {
            cursor: self.start.map_or(end, u64::from),
            limit: end,
        }
    }
}

fn align_up(value: u64, alignment: u64) -> Option<u64> {
    let mask = alignment - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

#[cfg(all(target_arch = "wasm32", feature = "bump-heap"))]
pub use guest::GuestHeap;

#[cfg(all(target_arch = "wasm32", feature = "bump-heap"))]
mod guest {
    use core::ffi::{c_int, c_void};
    use std::sync::{Mutex, PoisonError};

    use super::BumpAllocator;
    use crate::host::Allocator;
    use crate::memory::Wasm32Memory;

    static HEAP: Mutex<BumpAllocator> = Mutex::new(BumpAllocator::new());

    /// Process-wide bump heap over this module's memory 0.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct GuestHeap;

    impl Allocator for GuestHeap {
        unsafe fn posix_memalign(
            &mut self,
            memptr: *mut *mut c_void,
            alignment: usize,
            size: usize,
        ) -> c_int {
            let mut heap = HEAP.lock().unwrap_or_else(PoisonError::into_inner);
            match heap.allocate(&mut Wasm32Memory, alignment, size) {
                Ok(address) => {
                    *memptr = address as usize as *mut c_void;
                    0
                }
                Err(err) => err.errno(),
            }
        }

        unsafe fn free(&mut self, ptr: *mut c_void) {
            let mut heap = HEAP.lock().unwrap_or_else(PoisonError::into_inner);
            heap.free(ptr as usize as u32);
        }
    }
}
