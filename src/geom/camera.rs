//! Camera samples.

use serde::{Deserialize, Serialize};

/// Camera schema identifier.
pub const CAMERA_SCHEMA: &str = "AbcGeom_Camera_v1";

/// Camera sample data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSample {
    /// Focal length in millimeters.
    pub focal_length: f64,
    /// Horizontal aperture (film width) in centimeters.
    pub horizontal_aperture: f64,
    /// Vertical aperture (film height) in centimeters.
    pub vertical_aperture: f64,
    /// Horizontal film offset in centimeters.
    pub horizontal_film_offset: f64,
    /// Vertical film offset in centimeters.
    pub vertical_film_offset: f64,
    /// Near clipping plane distance.
    pub near_clipping_plane: f64,
    /// Far clipping plane distance.
    pub far_clipping_plane: f64,
    /// Focus distance.
    pub focus_distance: f64,
    /// F-stop (aperture size).
    pub f_stop: f64,
    /// Lens squeeze ratio (for anamorphic lenses).
    pub lens_squeeze_ratio: f64,
}

impl Default for CameraSample {
    fn default() -> Self {
        Self {
            focal_length: 35.0,
            horizontal_aperture: 3.6,  // 36mm = 3.6cm
            vertical_aperture: 2.4,    // 24mm = 2.4cm
            horizontal_film_offset: 0.0,
            vertical_film_offset: 0.0,
            near_clipping_plane: 0.1,
            far_clipping_plane: 100000.0,
            focus_distance: 5.0,
            f_stop: 5.6,
            lens_squeeze_ratio: 1.0,
        }
    }
}

impl CameraSample {
    /// Compute horizontal field of view in radians.
    pub fn horizontal_fov(&self) -> f64 {
        2.0 * (self.horizontal_aperture / (2.0 * self.focal_length / 10.0)).atan()
    }

    /// Compute vertical field of view in radians.
    pub fn vertical_fov(&self) -> f64 {
        2.0 * (self.vertical_aperture / (2.0 * self.focal_length / 10.0)).atan()
    }

    /// Film aspect ratio including lens squeeze.
    pub fn aspect_ratio(&self) -> f64 {
        if self.vertical_aperture > 0.0 {
            self.horizontal_aperture * self.lens_squeeze_ratio / self.vertical_aperture
        } else {
            1.0
        }
    }
}
