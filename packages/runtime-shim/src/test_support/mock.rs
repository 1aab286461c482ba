use core::ffi::{c_int, c_void};

use crate::host::{Allocator, RandomSource};
use crate::memory::{LinearMemory, GROW_FAILED};

/// A capability call observed by [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PosixMemalign { alignment: usize, size: usize },
    Free(usize),
    Arc4random,
    Arc4randomBuf { count: usize },
}

/// Stub capability provider that records every call.
///
/// `posix_memalign` answers with a fixed return code and, on success, a
/// fixed pointer. Randomness is a seeded xorshift stream so two hosts with
/// the same seed produce the same bytes.
#[derive(Debug, Clone)]
pub struct MockHost {
    pub calls: Vec<Call>,
    alloc_code: c_int,
    alloc_pointer: usize,
    state: u32,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            alloc_code: 0,
            alloc_pointer: 0,
            state: 1,
        }
    }

    pub fn with_alloc_result(mut self, code: c_int, pointer: usize) -> Self {
        self.alloc_code = code;
        self.alloc_pointer = pointer;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.state = seed.max(1);
        self
    }

    fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for MockHost {
    unsafe fn posix_memalign(
        &mut self,
        memptr: *mut *mut c_void,
        alignment: usize,
        size: usize,
    ) -> c_int {
        self.calls.push(Call::PosixMemalign { alignment, size });
        if self.alloc_code == 0 {
            *memptr = self.alloc_pointer as *mut c_void;
        }
        self.alloc_code
    }

    unsafe fn free(&mut self, ptr: *mut c_void) {
        self.calls.push(Call::Free(ptr as usize));
    }
}

impl RandomSource for MockHost {
    fn arc4random(&mut self) -> u32 {
        self.calls.push(Call::Arc4random);
        self.next()
    }

    unsafe fn arc4random_buf(&mut self, buf: *mut c_void, count: usize) {
        self.calls.push(Call::Arc4randomBuf { count });
        let out = core::slice::from_raw_parts_mut(buf.cast::<u8>(), count);
        for byte in out {
            *byte = self.next() as u8;
        }
    }
}

/// Page counter standing in for a wasm linear memory.
#[derive(Debug, Clone)]
pub struct SimulatedMemory {
    pages: usize,
    max_pages: Option<usize>,
    grow_requests: Vec<usize>,
}

impl SimulatedMemory {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            max_pages: None,
            grow_requests: Vec::new(),
        }
    }

    pub fn max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    pub fn grow_requests(&self) -> &[usize] {
        &self.grow_requests
    }

    /// Simulate another party growing the memory.
    pub fn grow_externally(&mut self, delta: usize) {
        self.pages += delta;
    }
}

impl LinearMemory for SimulatedMemory {
    fn size(&self) -> usize {
        self.pages
    }

    fn grow(&mut self, delta: usize) -> usize {
        self.grow_requests.push(delta);
        let previous = self.pages;
        match self.max_pages {
            Some(max) if previous + delta > max => GROW_FAILED,
            _ => {
                self.pages += delta;
                previous
            }
        }
    }
}
