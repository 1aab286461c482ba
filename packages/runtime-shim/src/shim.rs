use core::ffi::{c_int, c_ulong, c_void};

use crate::host::Capabilities;
use crate::memory::LinearMemory;

/// Value exported as `__stack_chk_guard`. Never changes at runtime.
pub const STACK_CHK_GUARD: c_ulong = 0x1;

/// Forwards C runtime calls to a capability set and a linear memory.
///
/// Every method is a direct pass-through: arguments reach the provider
/// untouched and its results (return codes, written pointers, filled
/// buffers) come back untouched.
#[derive(Debug, Clone, Default)]
pub struct Shim<C, M> {
    capabilities: C,
    memory: M,
}

impl<C: Capabilities, M: LinearMemory> Shim<C, M> {
    pub fn new(capabilities: C, memory: M) -> Self {
        Self {
            capabilities,
            memory,
        }
    }

    /// Current linear-memory size in pages.
    pub fn memory_size(&self) -> usize {
        self.memory.size()
    }

    /// Ask the engine for `page_count` more pages. Growth failure is not
    /// reported.
    pub fn memory_grow(&mut self, page_count: usize) {
        let _ = self.memory.grow(page_count);
    }

    pub unsafe fn posix_memalign(
        &mut self,
        memptr: *mut *mut c_void,
        alignment: usize,
        size: usize,
    ) -> c_int {
        self.capabilities.posix_memalign(memptr, alignment, size)
    }

    pub unsafe fn free(&mut self, ptr: *mut c_void) {
        self.capabilities.free(ptr)
    }

    pub fn arc4random(&mut self) -> u32 {
        self.capabilities.arc4random()
    }

    pub unsafe fn arc4random_buf(&mut self, buf: *mut c_void, count: usize) {
        self.capabilities.arc4random_buf(buf, count)
    }

    pub fn stack_chk_guard_setup(&self) {}

    /// Stack-smashing detection is disabled: this returns to the caller.
    pub fn stack_chk_fail(&self) {
        tracing::warn!("__stack_chk_fail called; stack protector is a no-op in this runtime");
    }

    pub fn capabilities(&self) -> &C {
        &self.capabilities
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }
}
