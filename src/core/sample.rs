//! Sample bracketing results and geometry scopes.

/// Result of bracketing a query time against a timeline.
///
/// `alpha == 0` means the floor sample is used as-is; the ceil sample is only
/// read when [`SampleInterp::is_exact`] is false.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleInterp {
    /// Floor sample index.
    pub floor_index: usize,
    /// Ceil sample index.
    pub ceil_index: usize,
    /// Interpolation factor (0.0 = floor, 1.0 = ceil).
    pub alpha: f64,
}

impl SampleInterp {
    /// Create for exact sample (no interpolation needed).
    pub fn exact(index: usize) -> Self {
        Self {
            floor_index: index,
            ceil_index: index,
            alpha: 0.0,
        }
    }

    /// Create for interpolation between two samples.
    ///
    /// `alpha` is clamped to `[0, 1]`; a non-finite alpha selects the floor sample.
    pub fn lerp(floor: usize, ceil: usize, alpha: f64) -> Self {
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            floor_index: floor,
            ceil_index: ceil,
            alpha,
        }
    }

    /// Check if this is an exact sample (no interpolation).
    pub fn is_exact(&self) -> bool {
        self.floor_index == self.ceil_index || self.alpha == 0.0
    }

    /// Collapse to the floor sample when interpolation is disabled.
    pub fn with_interpolation(self, interpolate: bool) -> Self {
        if interpolate {
            self
        } else {
            Self::exact(self.floor_index)
        }
    }
}

/// Scope/extent of data in a geom param sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryScope {
    /// Constant for entire object.
    #[default]
    Constant,
    /// Per-face varying.
    Uniform,
    /// Per-vertex.
    Varying,
    /// Per-face-vertex.
    Vertex,
    /// Per-face-vertex (indexed).
    FaceVarying,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_interp() {
        let exact = SampleInterp::exact(5);
        assert!(exact.is_exact());
        assert_eq!(exact.floor_index, 5);

        let lerp = SampleInterp::lerp(2, 3, 0.5);
        assert!(!lerp.is_exact());
        assert_eq!(lerp.floor_index, 2);
        assert_eq!(lerp.ceil_index, 3);
        assert!((lerp.alpha - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_sample_interp_clamps_and_disables() {
        assert_eq!(SampleInterp::lerp(0, 1, 1.5).alpha, 1.0);
        assert_eq!(SampleInterp::lerp(0, 1, -0.5).alpha, 0.0);

        let off = SampleInterp::lerp(2, 3, 0.25).with_interpolation(false);
        assert_eq!(off, SampleInterp::exact(2));

        let on = SampleInterp::lerp(2, 3, 0.25).with_interpolation(true);
        assert_eq!(on.ceil_index, 3);
    }

    #[test]
    fn test_sample_interp_non_finite_alpha() {
        for alpha in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let interp = SampleInterp::lerp(4, 5, alpha);
            assert_eq!(interp.alpha, 0.0);
            assert!(interp.is_exact());
        }
    }
}
