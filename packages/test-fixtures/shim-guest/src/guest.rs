use core::ffi::{c_int, c_ulong, c_void};
use core::ptr;
use core::sync::atomic::{AtomicUsize, Ordering};

// Links the shim's exports into this module.
use runtime_shim as _;

extern "C" {
    fn memory_size() -> usize;
    fn memory_grow(page_count: usize);
    fn posix_memalign(memptr: *mut *mut c_void, alignment: usize, size: usize) -> c_int;
    fn free(ptr: *mut c_void);
    fn arc4random() -> u32;
    fn arc4random_buf(buf: *mut c_void, count: usize);
    fn __stack_chk_guard_setup();
    fn __stack_chk_fail();
    static __stack_chk_guard: c_ulong;
}

/// Pointer written by the most recent `alloc_block`.
static LAST_BLOCK: AtomicUsize = AtomicUsize::new(0);

// ---------------------------------------------------------------------------
// Linear memory
// ---------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn page_count() -> usize {
    unsafe { memory_size() }
}

#[no_mangle]
pub extern "C" fn grow_pages(page_count: usize) {
    unsafe { memory_grow(page_count) }
}

// ---------------------------------------------------------------------------
// Heap
// ---------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn alloc_block(alignment: usize, size: usize) -> c_int {
    let mut block: *mut c_void = ptr::null_mut();
    let code = unsafe { posix_memalign(&mut block, alignment, size) };
    LAST_BLOCK.store(block as usize, Ordering::Relaxed);
    code
}

#[no_mangle]
pub extern "C" fn last_block() -> usize {
    LAST_BLOCK.load(Ordering::Relaxed)
}

#[no_mangle]
pub extern "C" fn release_block(block: usize) {
    unsafe { free(block as *mut c_void) }
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn random_word() -> u32 {
    unsafe { arc4random() }
}

#[no_mangle]
pub extern "C" fn fill_block(block: usize, count: usize) {
    unsafe { arc4random_buf(block as *mut c_void, count) }
}

// ---------------------------------------------------------------------------
// Stack protector
// ---------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn stack_guard() -> c_ulong {
    unsafe { ptr::addr_of!(__stack_chk_guard).read() }
}

/// Runs both stack-protector hooks; returning at all is the point.
#[no_mangle]
pub extern "C" fn smash_stack() {
    unsafe {
        __stack_chk_guard_setup();
        __stack_chk_fail();
    }
}
