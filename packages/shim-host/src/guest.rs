//! Access to the guest's exported linear memory.

use runtime_shim::{LinearMemory, GROW_FAILED};
use wasmtime::{AsContext, AsContextMut, Caller, Extern, Memory};

use crate::error::HostError;

pub(crate) fn exported_memory<T>(caller: &mut Caller<'_, T>) -> Result<Memory, HostError> {
    caller
        .get_export("memory")
        .and_then(Extern::into_memory)
        .ok_or(HostError::MissingMemory)
}

/// A guest memory seen through the store that owns it.
pub(crate) struct GuestMemory<S> {
    memory: Memory,
    store: S,
}

impl<S: AsContextMut> GuestMemory<S> {
    pub(crate) fn new(memory: Memory, store: S) -> Self {
        Self { memory, store }
    }
}

impl<S: AsContextMut> LinearMemory for GuestMemory<S> {
    fn size(&self) -> usize {
        self.memory.size(&self.store) as usize
    }

    fn grow(&mut self, delta: usize) -> usize {
        match self.memory.grow(&mut self.store, delta as u64) {
            Ok(previous) => previous as usize,
            Err(err) => {
                tracing::debug!(delta, error = %err, "guest memory refused to grow");
                GROW_FAILED
            }
        }
    }
}

fn bounds(offset: u32, len: u32) -> (usize, usize) {
    let start = offset as usize;
    (start, start + len as usize)
}

pub(crate) fn slice_mut(data: &mut [u8], offset: u32, len: u32) -> Result<&mut [u8], HostError> {
    let (start, end) = bounds(offset, len);
    data.get_mut(start..end)
        .ok_or(HostError::OutOfBounds { offset, len })
}

/// Fails unless `offset..offset + len` lies inside the guest memory.
pub(crate) fn check(
    memory: Memory,
    store: impl AsContext,
    offset: u32,
    len: u32,
) -> Result<(), HostError> {
    let (_, end) = bounds(offset, len);
    if end <= memory.data_size(store.as_context()) {
        Ok(())
    } else {
        Err(HostError::OutOfBounds { offset, len })
    }
}

pub(crate) fn read(
    memory: Memory,
    store: impl AsContext,
    offset: u32,
    len: u32,
) -> Result<Vec<u8>, HostError> {
    let (start, end) = bounds(offset, len);
    memory
        .data(store.as_context())
        .get(start..end)
        .map(<[u8]>::to_vec)
        .ok_or(HostError::OutOfBounds { offset, len })
}

pub(crate) fn write(
    memory: Memory,
    mut store: impl AsContextMut,
    offset: u32,
    bytes: &[u8],
) -> Result<(), HostError> {
    let len = bytes.len() as u32;
    slice_mut(memory.data_mut(store.as_context_mut()), offset, len)?.copy_from_slice(bytes);
    Ok(())
}
