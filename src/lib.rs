//! # pinmap
//!
//! A marker clustering and symbol-batch engine for map render loops.
//!
//! The crate buckets geographic markers into screen-space clusters, keeps the
//! projected state double-buffered for a render thread, and compiles a
//! GPU-consumable symbol batch each frame. It has no windowing, networking,
//! or GPU API surface of its own; the host map engine drives
//! [`MarkerRenderer::update`] once per frame and consumes the resulting
//! [`SymbolBatch`].

pub mod cluster;
pub mod core;
pub mod layer;
pub mod marker;
pub mod prelude;
pub mod render;
pub mod symbol;
pub mod tasks;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    config::{ClusterAlgorithm, Color, MarkerConfig},
    geo::{LatLng, Point},
    viewport::ViewState,
};

pub use crate::cluster::{compute_clusters, projected::ProjectedItem};
pub use crate::layer::{ItemGestureListener, ItemizedLayer};
pub use crate::marker::MapMarker;
pub use crate::render::{
    batch::{SymbolBatch, SymbolInstance},
    driver::MarkerRenderer,
};
pub use crate::symbol::{bitmap::Bitmap, cache::BadgeCache};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MarkerError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Bitmap generation failed: {0}")]
    Bitmap(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recluster queue is closed")]
    QueueClosed,
}

/// Error type alias for convenience
pub type Error = MarkerError;
