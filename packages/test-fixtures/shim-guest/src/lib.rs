//! A guest module that reaches runtime-shim only through its C symbols,
//! the way compiled C code would. The shim-host integration tests build it
//! for `wasm32-unknown-unknown` and drive these exports.

#[cfg(target_arch = "wasm32")]
mod guest;
