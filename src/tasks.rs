//! Re-clustering task hand-off.
//!
//! A bounded single-producer channel feeds one dedicated worker thread that
//! rebuilds the projected-item array and publishes it through
//! [`SharedItems`]. Scheduling is fire-and-forget and never blocks the
//! frame; there is no cancellation, a scheduled pass always runs to
//! completion and the last published result wins.

use crate::{
    cluster::compute_clusters, core::config::MarkerConfig, marker::MapMarker,
    render::shared::SharedItems, Error, Result,
};
use crossbeam_channel::{bounded, Sender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Queue depth; a full queue defers the trigger to the next frame
const QUEUE_CAPACITY: usize = 4;

/// One re-clustering pass: the marker snapshot taken at schedule time plus
/// the config and scale it is clustered for
pub struct ReclusterJob {
    pub markers: Arc<Vec<MapMarker>>,
    pub config: MarkerConfig,
    pub tile_scale: f64,
}

impl ReclusterJob {
    fn run(self, shared: &SharedItems) {
        let items = compute_clusters(&self.markers, &self.config, self.tile_scale);
        log::debug!(
            "recluster pass: {} markers -> {} items at tile scale {}",
            self.markers.len(),
            items.len(),
            self.tile_scale
        );
        shared.publish(items);
    }
}

enum Mode {
    /// Jobs run on the dedicated worker thread
    Threaded(Sender<ReclusterJob>),
    /// Jobs run inline in [`ReclusterWorker::schedule`]; used by tests for
    /// deterministic completion
    Synchronous(Arc<SharedItems>),
}

pub struct ReclusterWorker {
    mode: Mode,
    handle: Option<JoinHandle<()>>,
}

impl ReclusterWorker {
    /// Spawns the worker thread publishing into `shared`
    pub fn spawn(shared: Arc<SharedItems>) -> Result<Self> {
        let (tx, rx) = bounded::<ReclusterJob>(QUEUE_CAPACITY);

        let handle = thread::Builder::new()
            .name("pinmap-recluster".to_string())
            .spawn(move || {
                for job in rx {
                    job.run(&shared);
                }
            })?;

        Ok(Self {
            mode: Mode::Threaded(tx),
            handle: Some(handle),
        })
    }

    /// Executes every job inline instead of on a worker thread
    pub fn synchronous(shared: Arc<SharedItems>) -> Self {
        Self {
            mode: Mode::Synchronous(shared),
            handle: None,
        }
    }

    /// Fire-and-forget hand-off of a re-clustering pass.
    ///
    /// Returns `false` when the queue is full; the caller keeps its pending
    /// state and retries on the next frame.
    pub fn schedule(&self, job: ReclusterJob) -> Result<bool> {
        match &self.mode {
            Mode::Threaded(tx) => match tx.try_send(job) {
                Ok(()) => Ok(true),
                Err(TrySendError::Full(_)) => {
                    log::debug!("recluster queue full, deferring to next frame");
                    Ok(false)
                }
                Err(TrySendError::Disconnected(_)) => Err(Error::QueueClosed),
            },
            Mode::Synchronous(shared) => {
                job.run(shared);
                Ok(true)
            }
        }
    }
}

impl Drop for ReclusterWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        if let Mode::Threaded(tx) = std::mem::replace(
            &mut self.mode,
            Mode::Synchronous(Arc::new(SharedItems::new())),
        ) {
            drop(tx);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
