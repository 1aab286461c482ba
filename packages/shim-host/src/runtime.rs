use std::path::Path;

use runtime_shim::HeapStats;
use wasmtime::{Engine, Instance, Linker, Memory, Module, Store, WasmParams, WasmResults};

use crate::config::HostConfig;
use crate::error::HostError;
use crate::guest;
use crate::imports;
use crate::state::HostState;

/// One instantiated guest module and the store backing it.
pub struct Runtime {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
}

impl Runtime {
    /// Compile `wasm` (binary or text), link the `env` imports and
    /// instantiate it. The module must export its memory as `memory`.
    pub fn new(wasm: impl AsRef<[u8]>, config: &HostConfig) -> Result<Self, HostError> {
        let engine = Engine::default();
        let module = Module::new(&engine, wasm).map_err(HostError::Compile)?;

        let mut linker: Linker<HostState> = Linker::new(&engine);
        imports::add_to_linker(&mut linker).map_err(HostError::Link)?;

        let mut store = Store::new(&engine, HostState::new(config));
        store.limiter(|state| &mut state.limits);

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(HostError::Instantiate)?;
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or(HostError::MissingMemory)?;

        tracing::debug!(pages = memory.size(&store), "instantiated guest module");
        Ok(Self {
            store,
            instance,
            memory,
        })
    }

    pub fn from_file(path: &Path, config: &HostConfig) -> Result<Self, HostError> {
        let wasm = std::fs::read(path).map_err(|source| HostError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::new(wasm, config)
    }

    /// Call the configured entries once each, then the resume entry
    /// `frames` times.
    pub fn run(&mut self, config: &HostConfig) -> Result<(), HostError> {
        for entry in &config.entries {
            self.call(entry)?;
        }
        for frame in 0..config.frames {
            tracing::trace!(frame, "resume");
            self.call(&config.resume_entry)?;
        }
        Ok(())
    }

    /// Call an exported `() -> ()` function.
    pub fn call(&mut self, name: &str) -> Result<(), HostError> {
        self.call_typed::<(), ()>(name, ())
    }

    pub fn call_typed<P, R>(&mut self, name: &str, params: P) -> Result<R, HostError>
    where
        P: WasmParams,
        R: WasmResults,
    {
        let func = self
            .instance
            .get_typed_func::<P, R>(&mut self.store, name)
            .map_err(|reason| HostError::MissingEntry {
                name: name.to_owned(),
                reason,
            })?;
        tracing::debug!(entry = name, "calling guest export");
        func.call(&mut self.store, params)
            .map_err(|reason| HostError::Trap {
                name: name.to_owned(),
                reason,
            })
    }

    /// Current guest memory size in pages.
    pub fn memory_pages(&self) -> u64 {
        self.memory.size(&self.store)
    }

    pub fn read_memory(&self, offset: u32, len: u32) -> Result<Vec<u8>, HostError> {
        guest::read(self.memory, &self.store, offset, len)
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.store.data().heap.stats()
    }
}
