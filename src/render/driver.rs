//! Render-loop driver.
//!
//! `MarkerRenderer::update` is invoked once per frame by the host map engine.
//! A discrete zoom-step change schedules a re-clustering pass on the worker
//! and skips that frame's culling, keeping clustering off the render-critical
//! path. Between passes the driver re-projects, culls, depth-sorts and
//! compiles the symbol batch, with a no-op fast path when neither the
//! projected items nor the viewport changed.

use crate::{
    core::{
        config::MarkerConfig,
        viewport::{point_in_polygon, ViewState},
    },
    marker::MapMarker,
    render::{
        batch::{SymbolBatch, SymbolInstance},
        shared::SharedItems,
    },
    symbol::{
        bitmap::{render_default_pin, BadgeStyle, Bitmap},
        cache::BadgeCache,
    },
    tasks::{ReclusterJob, ReclusterWorker},
    Result,
};
use std::sync::Arc;

/// Pixel margin added around the viewport when culling, avoiding pop-in at
/// the edges
const EXTENTS_MARGIN: f64 = 128.0;

pub struct MarkerRenderer {
    config: MarkerConfig,
    markers: Arc<Vec<MapMarker>>,
    shared: Arc<SharedItems>,
    worker: ReclusterWorker,
    badge_cache: BadgeCache,
    default_pin: Arc<Bitmap>,
    batch: SymbolBatch,
    last_scale_step: Option<i32>,
    last_view: Option<ViewState>,
}

impl MarkerRenderer {
    /// Creates a renderer with a dedicated re-clustering worker thread
    pub fn new(config: MarkerConfig) -> Result<Self> {
        Self::build(config, false)
    }

    /// Creates a renderer whose re-clustering passes run inline; intended
    /// for deterministic tests and single-threaded hosts
    pub fn new_synchronous(config: MarkerConfig) -> Result<Self> {
        Self::build(config, true)
    }

    fn build(config: MarkerConfig, synchronous: bool) -> Result<Self> {
        let config = config.sanitized();
        let style = BadgeStyle::from_config(&config);
        let default_pin = Arc::new(render_default_pin(&style)?);

        let shared = Arc::new(SharedItems::new());
        let worker = if synchronous {
            ReclusterWorker::synchronous(Arc::clone(&shared))
        } else {
            ReclusterWorker::spawn(Arc::clone(&shared))?
        };

        Ok(Self {
            config,
            markers: Arc::new(Vec::new()),
            shared,
            worker,
            badge_cache: BadgeCache::new(style),
            default_pin,
            batch: SymbolBatch::new(),
            last_scale_step: None,
            last_view: None,
        })
    }

    /// Replaces the marker list.
    ///
    /// The list becomes the snapshot for the next re-clustering pass; the
    /// engine never mutates it.
    pub fn set_markers(&mut self, markers: Vec<MapMarker>) {
        self.markers = Arc::new(markers);
        self.last_scale_step = None;
    }

    pub fn markers(&self) -> &Arc<Vec<MapMarker>> {
        &self.markers
    }

    /// Applies a new configuration.
    ///
    /// Values are clamped at this boundary. A style change drops every
    /// cached badge wholesale; any change forces a full rebuild of the
    /// projected items on the next frame.
    pub fn set_config(&mut self, config: MarkerConfig) -> Result<()> {
        let config = config.sanitized();

        let style = BadgeStyle::from_config(&config);
        if style != *self.badge_cache.style() {
            self.default_pin = Arc::new(render_default_pin(&style)?);
            self.badge_cache.set_style(style);
        }

        if config != self.config {
            self.last_scale_step = None;
        }
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// The symbol batch compiled by the most recent changed frame
    pub fn batch(&self) -> &SymbolBatch {
        &self.batch
    }

    /// Per-frame entry point, driven by the host map engine.
    ///
    /// On a zoom-step change this schedules a re-clustering pass and returns
    /// without culling; the rebuilt items are picked up on a following
    /// frame. Otherwise it culls, sorts and compiles the symbol batch,
    /// unless nothing changed since the previous frame.
    pub fn update(&mut self, view: &ViewState) {
        let scale_step = view.scale_step();
        if self.last_scale_step != Some(scale_step) {
            let job = ReclusterJob {
                markers: Arc::clone(&self.markers),
                config: self.config.clone(),
                tile_scale: view.tile_scale(),
            };
            match self.worker.schedule(job) {
                Ok(true) => self.last_scale_step = Some(scale_step),
                // Queue full: stay pending, the mismatch re-triggers next frame
                Ok(false) => {}
                Err(e) => log::warn!("failed to schedule recluster pass: {}", e),
            }
            return;
        }

        let force = self.shared.take_force_update();
        if !force && self.last_view.as_ref() == Some(view) {
            return;
        }

        self.cull_and_compile(view);
        self.last_view = Some(view.clone());
    }

    fn cull_and_compile(&mut self, view: &ViewState) {
        let extents = view.map_extents(EXTENTS_MARGIN);

        let mut items = self.shared.lock();
        let mut num_visible = 0usize;

        for item in items.iter_mut() {
            let (px, py) = item.render_position();
            let (dx, dy) = view.map_delta(px, py);

            let was_visible = item.is_visible;
            let visible = !item.is_clustered_out && point_in_polygon(dx, dy, &extents);

            // A visible-to-invisible transition drops the symbol for exactly
            // one frame instead of re-adding stale geometry
            item.is_modified = was_visible && !visible;
            item.is_visible = visible;

            let (rx, ry) = view.rotate_delta(dx, dy);
            let (sx, sy) = view.delta_to_screen(rx, ry);
            item.screen_x = sx as f32;
            item.screen_y = sy as f32;
            item.z_order = ry as f32;

            if visible {
                num_visible += 1;
            }
        }

        if num_visible == 0 {
            self.batch.clear();
            self.batch.compile();
            return;
        }

        // Visible items first, then back-to-front by the rotation-dependent
        // depth key; the sort is stable beyond that
        items.sort_by(|a, b| {
            b.is_visible.cmp(&a.is_visible).then_with(|| {
                b.z_order
                    .partial_cmp(&a.z_order)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        self.batch.clear();
        for item in items.iter().filter(|i| i.is_batched()) {
            let bitmap = if item.cluster_size > 0 {
                match self.badge_cache.get((item.cluster_size + 1) as u32) {
                    Ok(bitmap) => bitmap,
                    Err(e) => {
                        // Fatal to the symbol, never to the frame
                        log::warn!("skipping cluster badge: {}", e);
                        continue;
                    }
                }
            } else {
                self.markers
                    .get(item.marker_index)
                    .and_then(|m| m.symbol().cloned())
                    .unwrap_or_else(|| Arc::clone(&self.default_pin))
            };

            let (hotspot_x, hotspot_y) = bitmap.hotspot();
            self.batch.push(SymbolInstance {
                screen_x: item.screen_x,
                screen_y: item.screen_y,
                bitmap,
                is_billboard: self.config.is_billboard,
                hotspot_x,
                hotspot_y,
            });
        }
        self.batch.compile();
    }

    /// Number of badges currently cached; style mutations reset this to zero
    pub fn cached_badges(&self) -> usize {
        self.badge_cache.len()
    }

    /// The bitmap a marker renders with: its own symbol or the default pin
    pub fn marker_symbol(&self, index: usize) -> Arc<Bitmap> {
        self.markers
            .get(index)
            .and_then(|m| m.symbol().cloned())
            .unwrap_or_else(|| Arc::clone(&self.default_pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    fn renderer_with(markers: Vec<MapMarker>) -> MarkerRenderer {
        let mut renderer = MarkerRenderer::new_synchronous(MarkerConfig::default()).unwrap();
        renderer.set_markers(markers);
        renderer
    }

    fn view() -> ViewState {
        // Center on the cluster position used in the tests
        let p = LatLng::new(47.0, 11.0).to_normalized();
        ViewState::new(p.x, p.y, 1024.0, 800.0, 600.0)
    }

    #[test]
    fn test_recluster_frame_skips_culling() {
        let mut renderer = renderer_with(vec![MapMarker::new(LatLng::new(47.0, 11.0))]);

        renderer.update(&view());
        assert!(!renderer.batch().is_compiled());

        renderer.update(&view());
        assert!(renderer.batch().is_compiled());
        assert_eq!(renderer.batch().len(), 1);
    }

    #[test]
    fn test_empty_marker_list_compiles_empty_batch() {
        let mut renderer = renderer_with(Vec::new());

        renderer.update(&view());
        renderer.update(&view());

        assert!(renderer.batch().is_compiled());
        assert!(renderer.batch().is_empty());
        assert_eq!(renderer.cached_badges(), 0);
    }

    #[test]
    fn test_cluster_of_five_emits_one_badge() {
        let markers = vec![MapMarker::new(LatLng::new(47.0, 11.0)); 5];
        let mut renderer = renderer_with(markers);

        renderer.update(&view());
        renderer.update(&view());

        assert_eq!(renderer.batch().len(), 1);
        assert_eq!(renderer.cached_badges(), 1);

        let symbol = &renderer.batch().symbols()[0];
        assert_eq!(symbol.bitmap.width(), renderer.config().symbol_size);
    }

    #[test]
    fn test_marker_symbol_replaces_default_pin_in_batch() {
        let custom = Arc::new(Bitmap::new(image::RgbaImage::new(16, 16), 8.0, 16.0));
        let marker =
            MapMarker::new(LatLng::new(47.0, 11.0)).with_symbol(Arc::clone(&custom));
        let mut renderer = renderer_with(vec![marker]);

        renderer.update(&view());
        renderer.update(&view());

        assert_eq!(renderer.batch().len(), 1);
        let symbol = &renderer.batch().symbols()[0];
        assert!(Arc::ptr_eq(&symbol.bitmap, &custom));
        assert_eq!((symbol.hotspot_x, symbol.hotspot_y), (8.0, 16.0));
        // A singleton with its own bitmap never touches the badge cache
        assert_eq!(renderer.cached_badges(), 0);
    }

    #[test]
    fn test_identical_frames_produce_identical_batches() {
        let markers = vec![
            MapMarker::new(LatLng::new(47.0, 11.0)),
            MapMarker::new(LatLng::new(47.01, 11.01)),
        ];
        let mut renderer = renderer_with(markers);

        renderer.update(&view());
        renderer.update(&view());
        let first: Vec<(f32, f32)> = renderer
            .batch()
            .symbols()
            .iter()
            .map(|s| (s.screen_x, s.screen_y))
            .collect();

        renderer.update(&view());
        let second: Vec<(f32, f32)> = renderer
            .batch()
            .symbols()
            .iter()
            .map(|s| (s.screen_x, s.screen_y))
            .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_offscreen_markers_are_culled() {
        let markers = vec![
            MapMarker::new(LatLng::new(47.0, 11.0)),
            // Opposite side of the planet
            MapMarker::new(LatLng::new(-47.0, -169.0)),
        ];
        let mut renderer = renderer_with(markers);

        renderer.update(&view());
        renderer.update(&view());

        assert_eq!(renderer.batch().len(), 1);
    }

    #[test]
    fn test_zoom_step_change_triggers_rebuild() {
        let mut renderer = renderer_with(vec![MapMarker::new(LatLng::new(47.0, 11.0))]);

        renderer.update(&view());
        renderer.update(&view());
        assert_eq!(renderer.batch().len(), 1);

        // Doubling the scale crosses a zoom step: the next frame schedules
        // and skips, the one after compiles again
        let mut zoomed = view();
        zoomed.scale = 2048.0;
        renderer.update(&zoomed);
        renderer.update(&zoomed);
        assert_eq!(renderer.batch().len(), 1);
    }

    #[test]
    fn test_config_change_invalidates_badges() {
        let markers = vec![MapMarker::new(LatLng::new(47.0, 11.0)); 3];
        let mut renderer = renderer_with(markers);

        renderer.update(&view());
        renderer.update(&view());
        assert_eq!(renderer.cached_badges(), 1);

        let mut config = renderer.config().clone();
        config.symbol_size = 64;
        renderer.set_config(config).unwrap();
        assert_eq!(renderer.cached_badges(), 0);
    }
}
