//! The `env` imports a runtime-shim guest links against.

use wasmtime::{AsContextMut, Caller, Linker};

use crate::guest::{self, GuestMemory};
use crate::state::HostState;

/// Import module the guest's `impl_*` and logging functions live in.
pub const MODULE: &str = "env";

/// Width of a wasm32 pointer written back through `memptr`.
const POINTER_BYTES: u32 = 4;

pub fn add_to_linker(linker: &mut Linker<HostState>) -> wasmtime::Result<()> {
    linker.func_wrap(MODULE, "impl_posix_memalign", posix_memalign)?;
    linker.func_wrap(MODULE, "impl_free", free)?;
    linker.func_wrap(MODULE, "impl_arc4random", arc4random)?;
    linker.func_wrap(MODULE, "impl_arc4random_buf", arc4random_buf)?;
    linker.func_wrap(MODULE, "log", log)?;
    linker.func_wrap(MODULE, "warn", warn)?;
    linker.func_wrap(MODULE, "error", error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Heap
// ---------------------------------------------------------------------------

fn posix_memalign(
    mut caller: Caller<'_, HostState>,
    memptr: u32,
    alignment: u32,
    size: u32,
) -> anyhow::Result<i32> {
    let memory = guest::exported_memory(&mut caller)?;
    // The result slot must be writable before the heap moves.
    guest::check(memory, &caller, memptr, POINTER_BYTES)?;

    let mut heap = caller.data().heap;
    let outcome = heap.allocate(
        &mut GuestMemory::new(memory, &mut caller),
        alignment as usize,
        size as usize,
    );
    caller.data_mut().heap = heap;

    match outcome {
        Ok(address) => {
            guest::write(memory, &mut caller, memptr, &address.to_le_bytes())?;
            tracing::trace!(address, alignment, size, "impl_posix_memalign");
            Ok(0)
        }
        Err(err) => {
            tracing::debug!(alignment, size, %err, "impl_posix_memalign failed");
            Ok(err.errno())
        }
    }
}

fn free(mut caller: Caller<'_, HostState>, ptr: u32) {
    caller.data_mut().heap.free(ptr);
}

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

fn arc4random(mut caller: Caller<'_, HostState>) -> u32 {
    caller.data_mut().random.next_u32()
}

fn arc4random_buf(mut caller: Caller<'_, HostState>, buf: u32, count: u32) -> anyhow::Result<()> {
    let memory = guest::exported_memory(&mut caller)?;
    let (data, state) = memory.data_and_store_mut(caller.as_context_mut());
    state.random.fill(guest::slice_mut(data, buf, count)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn read_message(caller: &mut Caller<'_, HostState>, ptr: u32, count: u32) -> anyhow::Result<String> {
    let memory = guest::exported_memory(caller)?;
    let bytes = guest::read(memory, &*caller, ptr, count)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn log(mut caller: Caller<'_, HostState>, ptr: u32, count: u32) -> anyhow::Result<()> {
    let message = read_message(&mut caller, ptr, count)?;
    tracing::info!(target: "guest", "{message}");
    Ok(())
}

fn warn(mut caller: Caller<'_, HostState>, ptr: u32, count: u32) -> anyhow::Result<()> {
    let message = read_message(&mut caller, ptr, count)?;
    tracing::warn!(target: "guest", "{message}");
    Ok(())
}

fn error(mut caller: Caller<'_, HostState>, ptr: u32, count: u32) -> anyhow::Result<()> {
    let message = read_message(&mut caller, ptr, count)?;
    tracing::error!(target: "guest", "{message}");
    Ok(())
}
