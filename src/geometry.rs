//! Shared coordinate and camera primitives used across the workflow and map layers.

/// Zoom level used whenever the camera is moved onto the user.
pub const DEFAULT_ZOOM: f32 = 15.0;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Instruction for the map surface to move its camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub position: LatLng,
    pub zoom: f32,
}

impl CameraTarget {
    pub const fn new(position: LatLng, zoom: f32) -> Self {
        Self { position, zoom }
    }

    pub const fn at_default_zoom(position: LatLng) -> Self {
        Self::new(position, DEFAULT_ZOOM)
    }
}
