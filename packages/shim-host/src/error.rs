use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to compile module: {0:#}")]
    Compile(wasmtime::Error),
    #[error("failed to link host imports: {0:#}")]
    Link(wasmtime::Error),
    #[error("failed to instantiate module: {0:#}")]
    Instantiate(wasmtime::Error),
    #[error("module does not export `memory`")]
    MissingMemory,
    #[error("module has no export `{name}` of the expected type: {reason:#}")]
    MissingEntry { name: String, reason: wasmtime::Error },
    #[error("guest memory access out of bounds at {offset:#x}+{len}")]
    OutOfBounds { offset: u32, len: u32 },
    #[error("`{name}` trapped: {reason:#}")]
    Trap { name: String, reason: wasmtime::Error },
}
