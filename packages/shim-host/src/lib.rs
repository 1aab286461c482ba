//! Wasmtime host for runtime-shim guests.
//!
//! A guest built against `runtime-shim` imports `env.impl_posix_memalign`,
//! `env.impl_free`, `env.impl_arc4random` and `env.impl_arc4random_buf`.
//! This crate supplies them: allocation is a bump heap over the guest's own
//! linear memory, randomness comes from the OS or a seeded stream. The
//! `env.log` / `env.warn` / `env.error` imports forward guest messages to
//! `tracing` under the `guest` target.

pub mod config;
pub mod error;
pub(crate) mod guest;
pub mod imports;
pub mod logging;
pub mod random;
pub mod runtime;
pub mod state;

pub use config::{HostConfig, RandomConfig};
pub use error::HostError;
pub use runtime::Runtime;
