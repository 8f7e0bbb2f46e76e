use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web Mercator projection limit
const MAX_LATITUDE: f64 = 85.05112877980659;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the Mercator-projectable range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Projects to normalized Web Mercator coordinates in `[0,1]²`.
    ///
    /// `x == 0.5` at the prime meridian, `y == 0.5` at the equator, with y
    /// growing southward. The whole world spans exactly one unit, so a
    /// position scales to pixels by multiplying with the current tile scale.
    pub fn to_normalized(&self) -> Point {
        let lng = Self::wrap_lng(self.lng);
        let lat_rad = Self::clamp_lat(self.lat).to_radians();

        let x = (lng + 180.0) / 360.0;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;

        Point::new(x, y.clamp(0.0, 1.0))
    }

    /// Inverse of [`LatLng::to_normalized`]
    pub fn from_normalized(point: Point) -> Self {
        let lng = point.x * 360.0 - 180.0;
        let lat_rad = (PI * (1.0 - 2.0 * point.y)).sinh().atan();

        Self::new(lat_rad.to_degrees(), lng)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
