//! Object headers and node kinds.

use crate::geom::{CAMERA_SCHEMA, POLYMESH_SCHEMA, SUBD_SCHEMA, XFORM_SCHEMA};

/// Index of a node inside an archive's node arena.
pub type NodeId = usize;

/// The closed set of node kinds the sampler distinguishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Transform node; contributes a local matrix to its descendants.
    Xform,
    /// Polygon mesh.
    PolyMesh,
    /// Subdivision surface (sampled like a polygon mesh, without normals).
    SubD,
    /// Camera; positioned by its ancestors like any other leaf.
    Camera,
    /// Grouping node or a schema this crate does not read.
    #[default]
    Other,
}

impl NodeKind {
    /// Schema identifier for this kind (empty for [`NodeKind::Other`]).
    pub fn schema(&self) -> &'static str {
        match self {
            Self::Xform => XFORM_SCHEMA,
            Self::PolyMesh => POLYMESH_SCHEMA,
            Self::SubD => SUBD_SCHEMA,
            Self::Camera => CAMERA_SCHEMA,
            Self::Other => "",
        }
    }

    /// Short display name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Xform => "Xform",
            Self::PolyMesh => "PolyMesh",
            Self::SubD => "SubD",
            Self::Camera => "Camera",
            Self::Other => "Group",
        }
    }

    /// PolyMesh or SubD.
    #[inline]
    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::PolyMesh | Self::SubD)
    }

    /// Kinds that carry their own sample timeline.
    #[inline]
    pub fn is_animatable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Header information for a node in the hierarchy.
#[derive(Clone, Debug, Default)]
pub struct ObjectHeader {
    /// Name of this object (not full path).
    pub name: String,
    /// Full path from root (e.g., "/parent/child").
    pub full_name: String,
    /// Kind of node.
    pub kind: NodeKind,
}

impl ObjectHeader {
    /// Create a new object header.
    pub fn new(name: impl Into<String>, full_name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_schema() {
        assert_eq!(NodeKind::Xform.schema(), XFORM_SCHEMA);
        assert_eq!(NodeKind::SubD.schema(), SUBD_SCHEMA);
        assert_eq!(NodeKind::Other.schema(), "");
        assert_eq!(NodeKind::Other.label(), "Group");
    }

    #[test]
    fn test_kind_predicates() {
        assert!(NodeKind::PolyMesh.is_geometry());
        assert!(NodeKind::SubD.is_geometry());
        assert!(!NodeKind::Xform.is_geometry());
        assert!(!NodeKind::Other.is_animatable());
    }

    #[test]
    fn test_header_new() {
        let h = ObjectHeader::new("xf", "/xf", NodeKind::Xform);
        assert_eq!((h.name.as_str(), h.full_name.as_str()), ("xf", "/xf"));
        assert_eq!(h.kind.schema(), XFORM_SCHEMA);
        assert_eq!(ObjectHeader::default().kind, NodeKind::Other);
    }
}
