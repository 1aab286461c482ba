//! C runtime entry points for `wasm32` guests.
//!
//! A module compiled against a C runtime expects `posix_memalign`, `free`,
//! `arc4random`, `arc4random_buf` and the stack-protector hooks to exist.
//! On `wasm32` this crate exports those symbols and forwards every call to a
//! host-provided `impl_*` function. The forwarding itself lives in [`Shim`],
//! which is generic over the capability traits in [`host`] so it can run
//! against stubs on any target.
#![allow(clippy::missing_safety_doc)]

pub mod bump;
#[cfg(target_arch = "wasm32")]
mod exports;
pub mod host;
pub mod memory;
pub mod shim;

#[cfg(test)]
pub(crate) mod test_support;

pub use bump::{AllocError, BumpAllocator, HeapStats, EINVAL, ENOMEM};
pub use host::{Allocator, Capabilities, RandomSource, Split};
pub use memory::{LinearMemory, GROW_FAILED, WASM_PAGE};
pub use shim::{Shim, STACK_CHK_GUARD};
