//! Capability traits the shim forwards to.
//!
//! The shim never allocates or produces randomness itself. It is handed a
//! provider for each half of the capability set and passes calls through
//! unmodified, including the provider's return codes.

use core::ffi::{c_int, c_void};

/// Allocation half of the capability set (`posix_memalign` / `free`).
pub trait Allocator {
    /// Allocate `size` bytes aligned to `alignment` and store the block in
    /// `*memptr`. Returns `0` or an errno value.
    ///
    /// # Safety
    ///
    /// `memptr` must be valid for a pointer-sized write.
    unsafe fn posix_memalign(
        &mut self,
        memptr: *mut *mut c_void,
        alignment: usize,
        size: usize,
    ) -> c_int;

    /// # Safety
    ///
    /// `ptr` must be null or a block previously returned by `posix_memalign`
    /// on this allocator.
    unsafe fn free(&mut self, ptr: *mut c_void);
}

/// Randomness half of the capability set (`arc4random` / `arc4random_buf`).
pub trait RandomSource {
    fn arc4random(&mut self) -> u32;

    /// Fill `count` bytes at `buf`.
    ///
    /// # Safety
    ///
    /// `buf` must be valid for `count` bytes of writes.
    unsafe fn arc4random_buf(&mut self, buf: *mut c_void, count: usize);
}

/// The full set of capabilities a [`Shim`](crate::Shim) is built with.
pub trait Capabilities: Allocator + RandomSource {}

impl<T: Allocator + RandomSource> Capabilities for T {}

/// Combines an allocator and a random source from different providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Split<A, R> {
    pub allocator: A,
    pub random: R,
}

impl<A, R> Split<A, R> {
    pub fn new(allocator: A, random: R) -> Self {
        Self { allocator, random }
    }
}

impl<A: Allocator, R> Allocator for Split<A, R> {
    unsafe fn posix_memalign(
        &mut self,
        memptr: *mut *mut c_void,
        alignment: usize,
        size: usize,
    ) -> c_int {
        self.allocator.posix_memalign(memptr, alignment, size)
    }

    unsafe fn free(&mut self, ptr: *mut c_void) {
        self.allocator.free(ptr)
    }
}

impl<A, R: RandomSource> RandomSource for Split<A, R> {
    fn arc4random(&mut self) -> u32 {
        self.random.arc4random()
    }

    unsafe fn arc4random_buf(&mut self, buf: *mut c_void, count: usize) {
        self.random.arc4random_buf(buf, count)
    }
}

#[cfg(target_arch = "wasm32")]
pub use imported::ImportedHost;

#[cfg(target_arch = "wasm32")]
mod imported {
    use super::{Allocator, RandomSource};
    use core::ffi::{c_int, c_void};

    // Resolved at link time when another object defines them, otherwise
    // left as imports from the `env` module.
    extern "C" {
        fn impl_posix_memalign(memptr: *mut *mut c_void, alignment: usize, size: usize) -> c_int;
        fn impl_free(ptr: *mut c_void);
        fn impl_arc4random() -> u32;
        fn impl_arc4random_buf(buf: *mut c_void, count: usize);
    }

    /// The `impl_*` functions supplied by the embedding host.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ImportedHost;

    impl Allocator for ImportedHost {
        unsafe fn posix_memalign(
            &mut self,
            memptr: *mut *mut c_void,
            alignment: usize,
            size: usize,
        ) -> c_int {
            impl_posix_memalign(memptr, alignment, size)
        }

        unsafe fn free(&mut self, ptr: *mut c_void) {
            impl_free(ptr)
        }
    }

    impl RandomSource for ImportedHost {
        fn arc4random(&mut self) -> u32 {
            unsafe { impl_arc4random() }
        }

        unsafe fn arc4random_buf(&mut self, buf: *mut c_void, count: usize) {
            impl_arc4random_buf(buf, count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mock::{Call, MockHost};

    #[test]
    fn split_routes_each_half_to_its_provider() {
        let mut split = Split::new(
            MockHost::new().with_alloc_result(0, 0x40),
            MockHost::new().with_seed(7),
        );
        let mut slot: *mut c_void = core::ptr::null_mut();
        let code = unsafe { split.posix_memalign(&mut slot, 8, 16) };
        let _ = split.arc4random();

        assert_eq!(code, 0);
        assert_eq!(slot as usize, 0x40);
        assert_eq!(
            split.allocator.calls,
            vec![Call::PosixMemalign {
                alignment: 8,
                size: 16
            }]
        );
        assert_eq!(split.random.calls, vec![Call::Arc4random]);
    }

    #[test]
    fn default_split_starts_with_fresh_providers() {
        let mut split = Split::<MockHost, MockHost>::default();
        let mut fresh = MockHost::new();

        assert_eq!(split.arc4random(), fresh.arc4random());
        assert!(split.allocator.calls.is_empty());
        assert_eq!(split.random.calls, vec![Call::Arc4random]);
    }
}
