//! Generational handle table.
//!
//! Values are addressed by a [`RawHandle`] that packs a slot index and the
//! slot's generation into one non-zero `usize`. The packed value can cross a
//! C boundary as an opaque pointer and is never dereferenced, so a stale or
//! forged handle is rejected by lookup instead of reaching freed memory.

use crate::error::CanvasError;
use std::fmt;
use std::num::NonZeroUsize;

const SLOT_BITS: u32 = usize::BITS / 2;
const SLOT_MASK: usize = (1 << SLOT_BITS) - 1;
const GENERATION_MASK: usize = usize::MAX >> SLOT_BITS;

/// Opaque, copyable reference to a table entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonZeroUsize);

impl RawHandle {
    fn pack(slot: usize, generation: usize) -> Self {
        debug_assert!(slot < SLOT_MASK);
        let value = ((generation & GENERATION_MASK) << SLOT_BITS) | (slot + 1);
        // slot + 1 keeps the low half non-zero.
        RawHandle(NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN))
    }

    /// Reinterpret a value received from the host. `0` (null) is rejected.
    pub fn from_usize(value: usize) -> Option<Self> {
        NonZeroUsize::new(value)
            .filter(|v| v.get() & SLOT_MASK != 0)
            .map(RawHandle)
    }

    pub fn into_usize(self) -> usize {
        self.0.get()
    }

    pub fn slot(self) -> usize {
        (self.0.get() & SLOT_MASK) - 1
    }

    pub fn generation(self) -> usize {
        self.0.get() >> SLOT_BITS
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot(), self.generation())
    }
}

/// Why a handle did not resolve to a live entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMiss {
    /// Never issued by this table.
    Unknown,
    /// Issued once, since removed.
    Stale,
}

impl HandleMiss {
    /// Error for any use other than removal.
    pub fn on_use(self) -> CanvasError {
        CanvasError::InvalidHandle
    }

    /// Error for removal: removing a stale handle is a double free.
    pub fn on_remove(self) -> CanvasError {
        match self {
            HandleMiss::Unknown => CanvasError::InvalidHandle,
            HandleMiss::Stale => CanvasError::DoubleFree,
        }
    }
}

struct Slot<T> {
    generation: usize,
    value: Option<T>,
}

/// Slot table with generation counters.
///
/// A slot's generation increments on every removal, so handles to earlier
/// occupants stop resolving. Generations wrap after `2^(usize::BITS / 2)`
/// reuses of a single slot.
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` and return its handle.
    ///
    /// # Errors
    /// [`CanvasError::Initialization`] when every addressable slot is taken.
    pub fn insert(&mut self, value: T) -> Result<RawHandle, CanvasError> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                if self.slots.len() >= SLOT_MASK - 1 {
                    return Err(CanvasError::Initialization("handle table is full".into()));
                }
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                self.slots.len() - 1
            }
        };
        let entry = &mut self.slots[slot];
        entry.value = Some(value);
        self.len += 1;
        Ok(RawHandle::pack(slot, entry.generation))
    }

    fn resolve(&self, handle: RawHandle) -> Result<usize, HandleMiss> {
        let slot = handle.slot();
        let entry = self.slots.get(slot).ok_or(HandleMiss::Unknown)?;
        let current = entry.generation & GENERATION_MASK;
        if handle.generation() == current && entry.value.is_some() {
            Ok(slot)
        } else if handle.generation() < current {
            Err(HandleMiss::Stale)
        } else {
            Err(HandleMiss::Unknown)
        }
    }

    pub fn get(&self, handle: RawHandle) -> Result<&T, HandleMiss> {
        let slot = self.resolve(handle)?;
        self.slots[slot].value.as_ref().ok_or(HandleMiss::Unknown)
    }

    pub fn get_mut(&mut self, handle: RawHandle) -> Result<&mut T, HandleMiss> {
        let slot = self.resolve(handle)?;
        self.slots[slot].value.as_mut().ok_or(HandleMiss::Unknown)
    }

    /// Take the value out and retire the handle.
    pub fn remove(&mut self, handle: RawHandle) -> Result<T, HandleMiss> {
        let slot = self.resolve(handle)?;
        let entry = &mut self.slots[slot];
        let value = entry.value.take().ok_or(HandleMiss::Unknown)?;
        entry.generation = entry.generation.wrapping_add(1) & GENERATION_MASK;
        self.free.push(slot);
        self.len -= 1;
        Ok(value)
    }
}
