//! Configuration for the marker layer and cluster rendering.
//!
//! All values are clamped at this boundary so the per-frame hot path never
//! has to defend against zero grid sizes or out-of-range symbol dimensions.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Default cluster grid cell size in density-independent pixels
pub const DEFAULT_CLUSTER_GRID_SIZE: u32 = 60;
pub const CLUSTER_GRID_MIN_SIZE: u32 = 1;
pub const CLUSTER_GRID_MAX_SIZE: u32 = 10_000;

/// Default cluster badge diameter in pixels
pub const DEFAULT_CLUSTER_SYMBOL_SIZE: u32 = 40;
pub const CLUSTER_SYMBOL_SIZE_MIN: u32 = 20;
pub const CLUSTER_SYMBOL_SIZE_MAX: u32 = 200;

pub const SYMBOL_WEIGHT_MIN: u32 = 1;
pub const SYMBOL_WEIGHT_MAX: u32 = 20;

/// Badge counts at or above this render a `+` glyph instead of the numeral
pub const DEFAULT_CLUSTER_COUNT_CAP: u32 = 1_000;

const DEFAULT_CLUSTER_OPACITY: u8 = 0xE0;

/// An RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Returns the same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Strategy used to merge nearby markers into clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterAlgorithm {
    /// Grid bucketing; the badge sits on the first marker of each cell
    FirstMarker,
    /// Grid bucketing; the badge sits on the geometric center of the cell
    Grid,
    /// Proximity grouping; the badge sits on the member centroid
    Distance,
}

/// Recognized options for a marker layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Enable or disable clustering entirely
    pub is_clustering: bool,
    /// Grid cell size in density-independent pixels
    pub cluster_grid_size: u32,
    pub cluster_algorithm: ClusterAlgorithm,
    /// Badge diameter in pixels
    pub symbol_size: u32,
    /// Badge outline thickness in pixels
    pub symbol_weight: u32,
    pub foreground_color: Color,
    pub background_color: Color,
    /// Whether badges face the camera or lie flat on the ground plane
    pub is_billboard: bool,
    /// Counts at or above this render a `+` glyph
    pub cluster_count_cap: u32,
    /// Device pixel ratio used to convert dp sizes to device pixels
    pub pixel_ratio: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            is_clustering: true,
            cluster_grid_size: DEFAULT_CLUSTER_GRID_SIZE,
            cluster_algorithm: ClusterAlgorithm::FirstMarker,
            symbol_size: DEFAULT_CLUSTER_SYMBOL_SIZE,
            symbol_weight: 2,
            foreground_color: Color::opaque(0xFF, 0xFF, 0xFF),
            background_color: Color::opaque(0xFC, 0x67, 0x00).with_alpha(DEFAULT_CLUSTER_OPACITY),
            is_billboard: true,
            cluster_count_cap: DEFAULT_CLUSTER_COUNT_CAP,
            pixel_ratio: 1.0,
        }
    }
}

impl MarkerConfig {
    /// Clamps all fields into their valid ranges, logging every adjustment.
    ///
    /// Called at every configuration-update entry point so the clustering and
    /// rendering passes can rely on sane values.
    pub fn sanitized(mut self) -> Self {
        self.cluster_grid_size = clamp_logged(
            "cluster_grid_size",
            self.cluster_grid_size,
            CLUSTER_GRID_MIN_SIZE,
            CLUSTER_GRID_MAX_SIZE,
        );
        self.symbol_size = clamp_logged(
            "symbol_size",
            self.symbol_size,
            CLUSTER_SYMBOL_SIZE_MIN,
            CLUSTER_SYMBOL_SIZE_MAX,
        );
        self.symbol_weight = clamp_logged(
            "symbol_weight",
            self.symbol_weight,
            SYMBOL_WEIGHT_MIN,
            SYMBOL_WEIGHT_MAX,
        );
        self.cluster_count_cap = self.cluster_count_cap.max(2);

        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            log::warn!(
                "pixel_ratio {} is not usable, falling back to 1.0",
                self.pixel_ratio
            );
            self.pixel_ratio = 1.0;
        }

        self
    }

    /// Grid cell size converted to device pixels
    pub fn grid_size_px(&self) -> f64 {
        (self.cluster_grid_size as f64 * self.pixel_ratio).max(1.0)
    }

    /// Serializes the configuration to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores a configuration from JSON, clamping out-of-range values
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }
}

fn clamp_logged(name: &str, value: u32, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::warn!("{} {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}
