//! Gesture dispatch against the marker list.
//!
//! Hit testing searches the raw marker list rather than the clustered
//! projection, so a tap resolves to a concrete marker even while its badge
//! is clustered.

use crate::{
    core::{
        bounds::Bounds,
        config::MarkerConfig,
        geo::Point,
        viewport::ViewState,
    },
    marker::MapMarker,
    render::{batch::SymbolBatch, driver::MarkerRenderer},
    Result,
};

/// Squared screen distance within which a tap can match a marker, in
/// density-independent pixels (50 px radius)
const MAX_HIT_DISTANCE_SQ: f64 = 2500.0;

/// Callbacks for resolved marker gestures; return `true` when handled
pub trait ItemGestureListener {
    fn on_item_tap(&mut self, index: usize) -> bool;
    fn on_item_long_press(&mut self, index: usize) -> bool;
}

/// A marker layer combining the clustering renderer with tap and long-press
/// dispatch
pub struct ItemizedLayer {
    renderer: MarkerRenderer,
    listener: Option<Box<dyn ItemGestureListener>>,
}

impl ItemizedLayer {
    pub fn new(config: MarkerConfig) -> Result<Self> {
        Ok(Self {
            renderer: MarkerRenderer::new(config)?,
            listener: None,
        })
    }

    /// Builds the layer around an existing renderer
    pub fn with_renderer(renderer: MarkerRenderer) -> Self {
        Self {
            renderer,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn ItemGestureListener>) {
        self.listener = Some(listener);
    }

    pub fn set_markers(&mut self, markers: Vec<MapMarker>) {
        self.renderer.set_markers(markers);
    }

    /// Per-frame pass-through to the renderer
    pub fn update(&mut self, view: &ViewState) {
        self.renderer.update(view);
    }

    pub fn batch(&self) -> &SymbolBatch {
        self.renderer.batch()
    }

    pub fn renderer(&self) -> &MarkerRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut MarkerRenderer {
        &mut self.renderer
    }

    /// Resolves a screen coordinate to the best-matching marker index.
    ///
    /// Markers whose symbol hit-region contains the point are preferred,
    /// ties broken by the greater screen Y (the one rendered in front);
    /// otherwise the nearest marker within the distance threshold wins.
    pub fn hit_test(&self, x: f64, y: f64, view: &ViewState) -> Option<usize> {
        let pixel_ratio = self.renderer.config().pixel_ratio;
        let threshold_sq = MAX_HIT_DISTANCE_SQ * pixel_ratio * pixel_ratio;

        let mut nearest: Option<(usize, f64)> = None;
        let mut front_hit: Option<(usize, f64)> = None;

        for (index, marker) in self.renderer.markers().iter().enumerate() {
            let p = marker.position().to_normalized();
            let (sx, sy) = view.to_screen(p.x, p.y);

            let dist_sq = Point::new(sx, sy).distance_sq(&Point::new(x, y));
            if dist_sq > threshold_sq {
                continue;
            }

            let bitmap = self.renderer.marker_symbol(index);
            let (hotspot_x, hotspot_y) = bitmap.hotspot();
            let left = sx - hotspot_x as f64;
            let top = sy - hotspot_y as f64;
            let region = Bounds::from_coords(
                left,
                top,
                left + bitmap.width() as f64,
                top + bitmap.height() as f64,
            );
            let in_region = region.contains(&Point::new(x, y));

            if in_region {
                match front_hit {
                    Some((_, best_y)) if sy <= best_y => {}
                    _ => front_hit = Some((index, sy)),
                }
            }

            match nearest {
                Some((_, best_sq)) if dist_sq >= best_sq => {}
                _ => nearest = Some((index, dist_sq)),
            }
        }

        front_hit.or(nearest).map(|(index, _)| index)
    }

    /// Dispatches a tap; returns whether a listener handled it
    pub fn on_tap(&mut self, x: f64, y: f64, view: &ViewState) -> bool {
        match (self.hit_test(x, y, view), self.listener.as_mut()) {
            (Some(index), Some(listener)) => listener.on_item_tap(index),
            _ => false,
        }
    }

    /// Dispatches a long press; returns whether a listener handled it
    pub fn on_long_press(&mut self, x: f64, y: f64, view: &ViewState) -> bool {
        match (self.hit_test(x, y, view), self.listener.as_mut()) {
            (Some(index), Some(listener)) => listener.on_item_long_press(index),
            _ => false,
        }
    }
}
