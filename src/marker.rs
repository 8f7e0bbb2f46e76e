use crate::{core::geo::LatLng, symbol::bitmap::Bitmap};
use std::sync::Arc;

/// A map marker as supplied by the surrounding layer.
///
/// Markers are read-only input to the clustering engine: one snapshot of the
/// marker list is consumed per re-clustering pass and never mutated.
#[derive(Debug, Clone)]
pub struct MapMarker {
    position: LatLng,
    symbol: Option<Arc<Bitmap>>,
    title: Option<String>,
}

impl MapMarker {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            symbol: None,
            title: None,
        }
    }

    /// Attaches a custom symbol bitmap rendered instead of the default pin
    pub fn with_symbol(mut self, symbol: Arc<Bitmap>) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn symbol(&self) -> Option<&Arc<Bitmap>> {
        self.symbol.as_ref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}
