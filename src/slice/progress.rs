//! Progress reporting for the sweep.
//!
//! The sweep reports what it has done through a callback, so callers can
//! drive a progress bar or collect statistics without the library knowing
//! about terminals.
//!
//! # Example
//!
//! ```
//! use sliver::mesh::primitives;
//! use sliver::slice::{slice_mesh_with_progress, Progress, ProgressEvent, SliceOptions};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let layers_seen = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&layers_seen);
//! let progress = Progress::new(move |event| {
//!     if let ProgressEvent::LayerEmitted { .. } = event {
//!         counter.fetch_add(1, Ordering::Relaxed);
//!     }
//! });
//!
//! let mesh = primitives::unit_cube();
//! let layers = slice_mesh_with_progress(&mesh, &SliceOptions::new(0.25), &progress).unwrap();
//! assert_eq!(layers_seen.load(Ordering::Relaxed), layers.len());
//! ```

/// Something the sweep has just finished.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Towers have been built and seeded into the event queue.
    TowersBuilt {
        /// Number of towers (one per vertex).
        towers: usize,
    },
    /// A vertex event has been processed.
    VertexProcessed {
        /// Vertex events completed so far.
        processed: usize,
        /// Total number of vertex events.
        total: usize,
        /// Height of the vertex just processed.
        height: f64,
    },
    /// A layer has been emitted.
    LayerEmitted {
        /// Index of the layer.
        index: usize,
        /// Height of the layer.
        height: f64,
        /// Number of polygons in the layer.
        polygons: usize,
    },
}

/// A progress callback that receives [`ProgressEvent`]s during a slice.
pub struct Progress {
    callback: Box<dyn Fn(&ProgressEvent) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report an event.
    #[inline]
    pub fn report(&self, event: ProgressEvent) {
        (self.callback)(&event);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
