//! Per-frame view transform supplied by the host map engine.
//!
//! Positions are normalized Web Mercator coordinates in `[0,1]²` (see
//! [`crate::core::geo::LatLng::to_normalized`]); the tile scale converts them
//! to map-plane pixels.

use crate::core::{bounds::Bounds, geo::Point};
use serde::{Deserialize, Serialize};

/// Standard tile edge length in pixels
pub const TILE_SIZE: f64 = 256.0;

/// Current viewport transform: pan position, zoom scale, bearing and screen size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Normalized map X at the viewport center, `[0,1]`
    pub x: f64,
    /// Normalized map Y at the viewport center, `[0,1]`
    pub y: f64,
    /// Zoom expressed as a scale factor; world width is `TILE_SIZE * scale` pixels
    pub scale: f64,
    /// Map rotation in degrees, clockwise
    pub bearing: f64,
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
}

impl ViewState {
    pub fn new(x: f64, y: f64, scale: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            scale: scale.max(1.0),
            bearing: 0.0,
            width,
            height,
        }
    }

    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = bearing;
        self
    }

    /// Pixels across the whole world at the current zoom.
    ///
    /// `scale` is a public field, so values below one are treated as one
    /// here rather than trusted at construction time.
    pub fn tile_scale(&self) -> f64 {
        TILE_SIZE * self.scale.max(1.0)
    }

    /// Discrete zoom level used as the re-clustering trigger.
    ///
    /// Fractional scale changes within one power of two only re-project; a
    /// step change rebuilds the clusters.
    pub fn scale_step(&self) -> i32 {
        self.tile_scale().log2().floor() as i32
    }

    /// Map-plane pixel offset of a normalized position from the view center,
    /// corrected for antimeridian wraparound.
    ///
    /// A marker more than half the world away horizontally is flipped by a
    /// full world width so it renders on the near side of the date line.
    pub fn map_delta(&self, projected_x: f64, projected_y: f64) -> (f64, f64) {
        let tile_scale = self.tile_scale();
        let flip = tile_scale / 2.0;

        let mut dx = (projected_x - self.x) * tile_scale;
        let dy = (projected_y - self.y) * tile_scale;

        if dx > flip {
            dx -= flip * 2.0;
        } else if dx < -flip {
            dx += flip * 2.0;
        }

        (dx, dy)
    }

    /// Rotates a map-plane delta by the current bearing, still relative to
    /// the viewport center
    pub fn rotate_delta(&self, dx: f64, dy: f64) -> (f64, f64) {
        if self.bearing == 0.0 {
            return (dx, dy);
        }

        let (sin, cos) = (-self.bearing).to_radians().sin_cos();
        (dx * cos - dy * sin, dx * sin + dy * cos)
    }

    /// Absolute screen position for a rotated delta
    pub fn delta_to_screen(&self, rx: f64, ry: f64) -> (f64, f64) {
        (rx + self.width / 2.0, ry + self.height / 2.0)
    }

    /// Full transform from normalized map coordinates to screen pixels
    pub fn to_screen(&self, projected_x: f64, projected_y: f64) -> (f64, f64) {
        let (dx, dy) = self.map_delta(projected_x, projected_y);
        let (rx, ry) = self.rotate_delta(dx, dy);
        self.delta_to_screen(rx, ry)
    }

    /// Culling polygon in the unrotated map-plane frame.
    ///
    /// The viewport rectangle is expanded by `margin` pixels on every side to
    /// avoid pop-in at the edges, then inverse-rotated so items can be tested
    /// before their bearing rotation is applied. Four corners fully describe
    /// the rotated rectangle; edge midpoints would be redundant under the
    /// even-odd test.
    pub fn map_extents(&self, margin: f64) -> [Point; 4] {
        let screen_box =
            Bounds::from_center_and_size(Point::default(), self.width, self.height)
                .expanded(margin);
        let corners = screen_box.corners();

        if self.bearing == 0.0 {
            return corners;
        }

        let (sin, cos) = self.bearing.to_radians().sin_cos();
        corners.map(|c| Point::new(c.x * cos - c.y * sin, c.x * sin + c.y * cos))
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(0.5, 0.5, 1.0, 800.0, 600.0)
    }
}

/// Even-odd point-in-polygon test
pub fn point_in_polygon(x: f64, y: f64, polygon: &[Point]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];

        if ((pi.y > y) != (pj.y > y))
            && (x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_state_creation() {
        let view = ViewState::new(0.5, 0.5, 1024.0, 800.0, 600.0);
        assert_eq!(view.tile_scale(), 256.0 * 1024.0);
        assert_eq!(view.scale_step(), 18);
    }

    #[test]
    fn test_sub_unit_scale_is_clamped() {
        let mut view = ViewState::new(0.5, 0.5, 4.0, 800.0, 600.0);
        view.scale = 0.0;

        assert_eq!(view.tile_scale(), TILE_SIZE);
        assert_eq!(view.scale_step(), 8);
    }

    #[test]
    fn test_center_maps_to_screen_center() {
        let view = ViewState::new(0.5, 0.5, 4.0, 800.0, 600.0);
        let (sx, sy) = view.to_screen(0.5, 0.5);

        assert!((sx - 400.0).abs() < 1e-9);
        assert!((sy - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_flip() {
        let view = ViewState::new(0.01, 0.5, 4.0, 800.0, 600.0);
        let tile_scale = view.tile_scale();
        let flip = tile_scale / 2.0;

        // A marker on the far side of the date line snaps to the near side
        let (dx, _) = view.map_delta(0.99, 0.5);
        assert!(dx < 0.0);
        assert!((dx - (0.98 * tile_scale - 2.0 * flip)).abs() < 1e-9);

        // Symmetric case: view near the east edge, marker near the west edge
        let view = ViewState::new(0.99, 0.5, 4.0, 800.0, 600.0);
        let (dx, _) = view.map_delta(0.01, 0.5);
        assert!(dx > 0.0);
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let view = ViewState::new(0.5, 0.5, 4.0, 800.0, 600.0).with_bearing(33.0);
        let (rx, ry) = view.rotate_delta(100.0, 50.0);

        let before = (100.0_f64 * 100.0 + 50.0 * 50.0).sqrt();
        let after = (rx * rx + ry * ry).sqrt();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_extents_inverse_of_rotation() {
        // A point on the expanded screen edge, pulled back into the map
        // plane, must land inside the inverse-rotated polygon.
        let view = ViewState::new(0.5, 0.5, 4.0, 800.0, 600.0).with_bearing(45.0);
        let extents = view.map_extents(16.0);

        // The screen center is always inside
        assert!(point_in_polygon(0.0, 0.0, &extents));

        // A delta that rotates onto the screen corner is inside
        let (sin, cos) = view.bearing.to_radians().sin_cos();
        let (cx, cy) = (390.0, 290.0);
        let (mx, my) = (cx * cos - cy * sin, cx * sin + cy * cos);
        assert!(point_in_polygon(mx, my, &extents));
    }

    #[test]
    fn test_point_in_polygon_square() {
        let square = [
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
        ];

        assert!(point_in_polygon(0.0, 0.0, &square));
        assert!(!point_in_polygon(2.0, 0.0, &square));
    }
}
