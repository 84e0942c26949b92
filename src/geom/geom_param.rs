//! Geometry parameters (UVs, normals).
//!
//! A geom param is either indexed (shared values plus an index array) or
//! non-indexed (one value per element). The sampler always reads it through
//! its index array; non-indexed params behave as if indexed by `0..n`.

use serde::{Deserialize, Serialize};

use crate::core::GeometryScope;

/// Sample data from a geometry parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeomParamSample<T> {
    /// Values, shared when indexed.
    pub values: Vec<T>,
    /// Optional indices into `values`.
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    /// Declared scope of the data.
    #[serde(default)]
    pub scope: GeometryScope,
}

impl<T> Default for GeomParamSample<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            indices: None,
            scope: GeometryScope::Constant,
        }
    }
}

impl<T: Copy> GeomParamSample<T> {
    /// Non-indexed param.
    pub fn new(values: Vec<T>, scope: GeometryScope) -> Self {
        Self { values, indices: None, scope }
    }

    /// Indexed param.
    pub fn indexed(values: Vec<T>, indices: Vec<u32>, scope: GeometryScope) -> Self {
        Self { values, indices: Some(indices), scope }
    }

    /// Length of the (possibly implicit) index array.
    pub fn num_indices(&self) -> usize {
        self.indices.as_ref().map(|i| i.len()).unwrap_or(self.values.len())
    }

    /// Value referenced by index slot `slot`, `None` when out of range.
    pub fn value_at(&self, slot: usize) -> Option<T> {
        let idx = match &self.indices {
            Some(indices) => *indices.get(slot)? as usize,
            None => slot,
        };
        self.values.get(idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_non_indexed() {
        let p = GeomParamSample::new(vec![1.0f32, 2.0, 3.0], GeometryScope::Varying);
        assert!(p.indices.is_none());
        assert_eq!(p.num_indices(), 3);
        assert_eq!(p.value_at(1), Some(2.0));
        assert_eq!(p.value_at(3), None);
    }

    #[test]
    fn test_indexed() {
        let p = GeomParamSample::indexed(
            vec![Vec2::ZERO, Vec2::ONE],
            vec![0, 1, 1, 0, 7],
            GeometryScope::FaceVarying,
        );
        assert_eq!(p.num_indices(), 5);
        assert_eq!(p.value_at(2), Some(Vec2::ONE));
        // index 7 points past the values
        assert_eq!(p.value_at(4), None);
        assert_eq!(p.value_at(5), None);
    }

    #[test]
    fn test_json() {
        let json = r#"{"values":[[0,0],[1,0]],"indices":[0,1,1],"scope":"face_varying"}"#;
        let p: GeomParamSample<Vec2> = serde_json::from_str(json).unwrap();
        assert_eq!(p.scope, GeometryScope::FaceVarying);
        assert_eq!(p.value_at(2), Some(Vec2::new(1.0, 0.0)));
    }
}
