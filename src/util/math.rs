//! Math type re-exports and scene-specific math utilities.
//!
//! This module re-exports types from `glam` and provides additional
//! types used by the sampler (bounding boxes, time aliases, and the
//! row-major matrix layout archives store transforms in).

// Re-export glam types
pub use glam::{
    // Archive storage precision
    Vec2, Vec3,
    // Sampling precision
    DVec3, DVec4, DMat3, DMat4, DQuat,
};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 3D bounding box with double precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct BBox3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3d {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bounding box of a set of single precision points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p.as_dvec3());
        }
        b
    }

    /// Check if this box is empty (has no volume).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Corner `i` of the box, `i` in `0..8`.
    ///
    /// Bit 2 selects max x, bit 1 max y, bit 0 max z.
    #[inline]
    pub fn corner(&self, i: usize) -> DVec3 {
        DVec3::new(
            if i & 4 != 0 { self.max.x } else { self.min.x },
            if i & 2 != 0 { self.max.y } else { self.min.y },
            if i & 1 != 0 { self.max.z } else { self.min.z },
        )
    }
}

impl Default for BBox3d {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3d({:?} - {:?})", self.min, self.max)
    }
}

/// Chrono type - time value (seconds).
pub type Chrono = f64;

/// Build a matrix from 16 values in archive (row-major, row-vector) order.
///
/// Archives store `M44d` with the translation in elements 12..15; glam is
/// column-major with column vectors, so rows become columns.
pub fn matrix_from_row_major(v: &[f64; 16]) -> DMat4 {
    DMat4::from_cols(
        DVec4::new(v[0], v[4], v[8], v[12]),
        DVec4::new(v[1], v[5], v[9], v[13]),
        DVec4::new(v[2], v[6], v[10], v[14]),
        DVec4::new(v[3], v[7], v[11], v[15]),
    )
}

/// Inverse of [`matrix_from_row_major`].
pub fn matrix_to_row_major(m: &DMat4) -> [f64; 16] {
    // The column-major array of the transpose is the row-major layout
    // of the row-vector form.
    m.transpose().to_cols_array()
}
