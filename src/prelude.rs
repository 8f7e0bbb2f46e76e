//! Prelude module for common pinmap types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use pinmap::prelude::*;`

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
    shared::SharedItems,
};

pub use crate::symbol::{
    bitmap::{BadgeStyle, Bitmap},
    cache::BadgeCache,
};

pub use crate::tasks::{ReclusterJob, ReclusterWorker};

pub use crate::{Error as MarkerError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
