//! PolyMesh (polygon mesh) samples.

use serde::{Deserialize, Serialize};

use crate::geom::GeomParamSample;
use crate::util::{BBox3d, Vec2, Vec3};

/// PolyMesh schema identifier.
pub const POLYMESH_SCHEMA: &str = "AbcGeom_PolyMesh_v1";

/// Polygon mesh sample data, in archive winding order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyMeshSample {
    /// Vertex positions (P).
    pub positions: Vec<Vec3>,
    /// Face vertex counts - number of vertices per face.
    pub face_counts: Vec<i32>,
    /// Face vertex indices - indices into positions array.
    pub face_indices: Vec<i32>,
    /// UV coordinates (optional).
    pub uvs: Option<GeomParamSample<Vec2>>,
    /// Normals (optional).
    pub normals: Option<GeomParamSample<Vec3>>,
    /// Self bounds (optional).
    pub self_bounds: Option<BBox3d>,
}

impl PolyMeshSample {
    /// Total face-vertex count implied by the face counts.
    pub fn num_face_vertices(&self) -> usize {
        self.face_counts.iter().map(|&c| c.max(0) as usize).sum()
    }

    /// Face counts agree with the index array and every index hits a point.
    pub fn is_topology_consistent(&self) -> bool {
        let n = self.positions.len();
        self.num_face_vertices() == self.face_indices.len()
            && self.face_indices.iter().all(|&i| i >= 0 && (i as usize) < n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> PolyMeshSample {
        PolyMeshSample {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            face_counts: vec![3],
            face_indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn test_polymesh_sample_empty() {
        let sample = PolyMeshSample::default();
        assert_eq!(sample.num_face_vertices(), 0);
        // no faces reference anything
        assert!(sample.is_topology_consistent());
    }

    #[test]
    fn test_polymesh_sample_triangle() {
        let sample = triangle();
        assert_eq!(sample.num_face_vertices(), 3);
        assert!(sample.is_topology_consistent());
    }

    #[test]
    fn test_polymesh_inconsistent_topology() {
        let mut sample = triangle();
        sample.face_indices = vec![0, 1, 5];
        assert!(!sample.is_topology_consistent());

        let mut sample = triangle();
        sample.face_indices = vec![0, -1, 2];
        assert!(!sample.is_topology_consistent());

        let mut sample = triangle();
        sample.face_counts = vec![4];
        assert!(!sample.is_topology_consistent());

        // negative counts contribute nothing
        let mut sample = triangle();
        sample.face_counts = vec![3, -2];
        assert_eq!(sample.num_face_vertices(), 3);
        assert!(sample.is_topology_consistent());
    }

    #[test]
    fn test_polymesh_json() {
        let json = r#"{"positions":[[0,0,0],[1,0,0],[0,1,0]],"face_counts":[3],"face_indices":[0,1,2]}"#;
        let sample: PolyMeshSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample, triangle());
    }
}
