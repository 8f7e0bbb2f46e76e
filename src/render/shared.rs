//! Double-buffered projected-item state shared between the recluster worker
//! and the render thread.
//!
//! The worker builds a complete new array off-thread and publishes it by
//! replacing the vector wholesale under the lock; the render thread holds the
//! same lock for its culling pass, so it observes either the old or the new
//! array in full, never a partial rebuild. Rapid rescheduling is
//! last-write-wins.

use crate::cluster::projected::ProjectedItem;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

#[derive(Debug, Default)]
pub struct SharedItems {
    items: Mutex<Vec<ProjectedItem>>,
    force_update: AtomicBool,
}

impl SharedItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the projected-item array and flags the render
    /// thread to run a full culling pass on its next frame
    pub fn publish(&self, items: Vec<ProjectedItem>) {
        *self.lock() = items;
        self.force_update.store(true, Ordering::Release);
    }

    /// Locks the array for the per-frame culling pass
    pub fn lock(&self) -> MutexGuard<'_, Vec<ProjectedItem>> {
        // A poisoned lock only means a panic elsewhere; the data is still a
        // complete array, so keep rendering
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Consumes the force-update flag set by the last publish
    pub fn take_force_update(&self) -> bool {
        self.force_update.swap(false, Ordering::Acquire)
    }
}
