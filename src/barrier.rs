//! The allocation-safety barrier (spec §4.D): while a head's slab is being
//! grown, a reentrant low-memory purge must not be able to see (and empty)
//! that same head out from under the in-progress growth.
//!
//! [`ProtectedAlloc`] models this the way the design notes suggest: entering
//! the guard moves the head's storage out and marks the head's own purge
//! counter as if the head were already purged; leaving it (including via an
//! early return or panic, through `Drop`) puts storage back and restores the
//! counter. Code inside the guarded region works against the guard's own
//! copy of the storage, never through the head, so a purge running
//! concurrently with this scope (there is no concurrency in this crate, but
//! the shape mirrors the reference implementation's reentrant callback path)
//! would skip this head entirely.

use crate::head::{CacheHead, HeadStorage};

pub(crate) struct ProtectedAlloc<'h, Color, Lut> {
    head: &'h mut CacheHead<Color, Lut>,
    storage: Option<HeadStorage<Color>>,
    purged_count: &'h mut usize,
}

impl<'h, Color, Lut> ProtectedAlloc<'h, Color, Lut> {
    /// Enters the barrier. Panics if `head` has no storage to protect — the
    /// caller must recreate purged storage with `ensure_storage` first.
    pub(crate) fn enter(head: &'h mut CacheHead<Color, Lut>, purged_count: &'h mut usize) -> Self {
        let storage = head.take_storage().expect("protected allocation requires existing storage");
        *purged_count += 1;
        Self { head, storage: Some(storage), purged_count }
    }

    /// Disjoint mutable access to the guarded storage and the rest of the
    /// head's fields, so callers can update population/style-dependent
    /// bookkeeping alongside the slab itself.
    pub(crate) fn storage_and_head(&mut self) -> (&mut HeadStorage<Color>, &mut CacheHead<Color, Lut>) {
        (self.storage.as_mut().expect("storage present for guard lifetime"), self.head)
    }
}

impl<'h, Color, Lut> Drop for ProtectedAlloc<'h, Color, Lut> {
    fn drop(&mut self) {
        let storage = self.storage.take().expect("storage not already restored");
        self.head.restore_storage(storage);
        *self.purged_count -= 1;
    }
}
