// ---------------------------------------------------------------------------
// C runtime symbols exported to the compiled module
// ---------------------------------------------------------------------------
//
// Each export builds a shim over zero-sized providers and forwards the call.

use core::ffi::{c_int, c_ulong, c_void};

use crate::host::ImportedHost;
use crate::memory::Wasm32Memory;
use crate::shim::{Shim, STACK_CHK_GUARD};

#[cfg(feature = "bump-heap")]
type GuestCapabilities = crate::host::Split<crate::bump::GuestHeap, ImportedHost>;
#[cfg(not(feature = "bump-heap"))]
type GuestCapabilities = ImportedHost;

fn shim() -> Shim<GuestCapabilities, Wasm32Memory> {
    Shim::new(GuestCapabilities::default(), Wasm32Memory)
}

#[no_mangle]
pub extern "C" fn memory_size() -> usize {
    shim().memory_size()
}

#[no_mangle]
pub extern "C" fn memory_grow(page_count: usize) {
    shim().memory_grow(page_count)
}

#[no_mangle]
pub unsafe extern "C" fn posix_memalign(
    memptr: *mut *mut c_void,
    alignment: usize,
    size: usize,
) -> c_int {
    shim().posix_memalign(memptr, alignment, size)
}

#[no_mangle]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
    shim().free(ptr)
}

#[no_mangle]
pub extern "C" fn arc4random() -> u32 {
    shim().arc4random()
}

#[no_mangle]
pub unsafe extern "C" fn arc4random_buf(buf: *mut c_void, count: usize) {
    shim().arc4random_buf(buf, count)
}

#[no_mangle]
#[allow(non_upper_case_globals)]
pub static __stack_chk_guard: c_ulong = STACK_CHK_GUARD;

#[no_mangle]
pub extern "C" fn __stack_chk_guard_setup() {
    shim().stack_chk_guard_setup()
}

#[no_mangle]
pub extern "C" fn __stack_chk_fail() {
    shim().stack_chk_fail()
}
