//! Handle-addressed canvases for callers that can only hold integers.
//!
//! The table lock is held just long enough to find an entry. Each canvas has
//! its own lock, taken with `try_lock`: a second call on a handle that is
//! already mid-call (another thread, or a progress callback re-entering)
//! fails with [`CanvasError::Busy`] instead of blocking.

use crate::backend::Backend;
use crate::canvas::Canvas;
use crate::error::CanvasError;
use crate::example::ExampleKind;
use crate::handle::{HandleTable, RawHandle};
use crate::progress::FrameStatus;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

type Entry<B> = Arc<Mutex<Canvas<B>>>;

/// A set of live canvases keyed by [`RawHandle`].
pub struct CanvasRegistry<B: Backend> {
    table: Mutex<HandleTable<Entry<B>>>,
}

impl<B: Backend> Default for CanvasRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> CanvasRegistry<B> {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HandleTable::new()),
        }
    }

    fn table(&self) -> MutexGuard<'_, HandleTable<Entry<B>>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live canvases.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Take ownership of `canvas` and hand back its handle.
    pub fn insert(&self, canvas: Canvas<B>) -> Result<RawHandle, CanvasError> {
        let handle = self.table().insert(Arc::new(Mutex::new(canvas)))?;
        log::debug!("registered canvas {handle:?}");
        Ok(handle)
    }

    fn entry(&self, raw: usize) -> Result<Entry<B>, CanvasError> {
        let handle = RawHandle::from_usize(raw).ok_or(CanvasError::InvalidHandle)?;
        let table = self.table();
        let entry = table.get(handle).map_err(|miss| miss.on_use())?;
        Ok(Arc::clone(entry))
    }

    fn with_canvas<R>(
        &self,
        raw: usize,
        f: impl FnOnce(&mut Canvas<B>) -> Result<R, CanvasError>,
    ) -> Result<R, CanvasError> {
        let entry = self.entry(raw)?;
        let mut canvas = try_lock(&entry)?;
        f(&mut canvas)
    }

    pub fn drive_frame(&self, raw: usize) -> Result<FrameStatus, CanvasError> {
        self.with_canvas(raw, Canvas::drive_frame)
    }

    pub fn change_example(&self, raw: usize, index: i32) -> Result<ExampleKind, CanvasError> {
        self.with_canvas(raw, |canvas| canvas.change_example(index))
    }

    pub fn resize(&self, raw: usize, width: u32, height: u32) -> Result<(), CanvasError> {
        self.with_canvas(raw, |canvas| canvas.resize(width, height))
    }

    pub fn fit_to_view(&self, raw: usize) -> Result<(), CanvasError> {
        self.with_canvas(raw, Canvas::fit_to_view)
    }

    /// Read-only access for inspection hooks.
    pub fn inspect<R>(&self, raw: usize, f: impl FnOnce(&Canvas<B>) -> R) -> Result<R, CanvasError> {
        self.with_canvas(raw, |canvas| Ok(f(&*canvas)))
    }

    /// Retire the handle and destroy its canvas.
    ///
    /// # Errors
    /// [`CanvasError::DoubleFree`] for a handle that was already destroyed,
    /// [`CanvasError::Busy`] if the canvas is mid-call (nothing is removed).
    pub fn destroy(&self, raw: usize) -> Result<(), CanvasError> {
        let handle = RawHandle::from_usize(raw).ok_or(CanvasError::InvalidHandle)?;
        let mut table = self.table();
        let entry = Arc::clone(table.get(handle).map_err(|miss| miss.on_remove())?);
        let mut canvas = try_lock(&entry)?;
        table.remove(handle).map_err(|miss| miss.on_remove())?;
        drop(table);

        canvas.destroy()?;
        log::debug!("unregistered canvas {handle:?}");
        Ok(())
    }
}

fn try_lock<B: Backend>(entry: &Entry<B>) -> Result<MutexGuard<'_, Canvas<B>>, CanvasError> {
    match entry.try_lock() {
        Ok(guard) => Ok(guard),
        // Canvas fields are only written after backend calls return.
        Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => Err(CanvasError::Busy),
    }
}
