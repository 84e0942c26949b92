//! Subdivision surface samples.
//!
//! The sampler treats a subd cage like a polygon mesh: its points, topology
//! and UVs are read. Crease, corner and scheme data are not part of the
//! sample and are ignored when present in a scene file.

use serde::{Deserialize, Serialize};

use crate::geom::{GeomParamSample, PolyMeshSample};
use crate::util::{BBox3d, Vec2, Vec3};

/// SubD schema identifier.
pub const SUBD_SCHEMA: &str = "AbcGeom_SubD_v1";

/// SubD sample data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubDSample {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Face vertex counts.
    pub face_counts: Vec<i32>,
    /// Face vertex indices.
    pub face_indices: Vec<i32>,
    /// UV coordinates (optional).
    pub uvs: Option<GeomParamSample<Vec2>>,
    /// Self bounds - bounding box of this geometry (optional).
    pub self_bounds: Option<BBox3d>,
}

impl SubDSample {
    /// The control cage as a mesh sample. SubDs carry no normals.
    pub fn to_mesh_sample(&self) -> PolyMeshSample {
        PolyMeshSample {
            positions: self.positions.clone(),
            face_counts: self.face_counts.clone(),
            face_indices: self.face_indices.clone(),
            uvs: self.uvs.clone(),
            normals: None,
            self_bounds: self.self_bounds,
        }
    }
}
