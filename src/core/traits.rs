//! The archive collaborator interface.
//!
//! The sampler never touches an on-disk container directly. Anything that can
//! identify node kinds, report per-node sample timelines, hand out samples by
//! index and navigate to a node's parent can be sampled.

use crate::core::{NodeId, NodeKind, ObjectHeader, SampleTimeline};
use crate::geom::{CameraSample, PolyMeshSample, XformSample};
use crate::util::{BBox3d, Result, Vec3};

/// Read-only access to a hierarchical, time-sampled scene archive.
///
/// Implementations are read concurrently by the reader layer, hence
/// `Send + Sync`; nothing in this crate mutates an archive.
pub trait SceneArchive: Send + Sync {
    /// Archive name (usually the file path).
    fn name(&self) -> &str;

    /// False when the archive failed to open; samplers return empty results.
    fn is_valid(&self) -> bool {
        true
    }

    /// The top object.
    fn root(&self) -> NodeId;

    /// Header of a node, `None` for ids outside the archive.
    fn header(&self, node: NodeId) -> Option<&ObjectHeader>;

    /// Parent of a node; `None` for the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of a node, in archive order.
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Sample timeline of the node's schema.
    fn timeline(&self, node: NodeId) -> Result<SampleTimeline>;

    /// Transform sample `index` of an xform node.
    fn xform_sample(&self, node: NodeId, index: usize) -> Result<XformSample>;

    /// Mesh sample `index` of a polymesh or subd node.
    fn mesh_sample(&self, node: NodeId, index: usize) -> Result<PolyMeshSample>;

    /// Camera sample `index` of a camera node.
    fn camera_sample(&self, node: NodeId, index: usize) -> Result<CameraSample>;

    /// Positions only; override when the full sample is expensive to read.
    fn positions(&self, node: NodeId, index: usize) -> Result<Vec<Vec3>> {
        Ok(self.mesh_sample(node, index)?.positions)
    }

    /// Stored self bounds of a geometry sample, if the archive has them.
    fn self_bounds(&self, node: NodeId, index: usize) -> Result<Option<BBox3d>> {
        Ok(self.mesh_sample(node, index)?.self_bounds)
    }

    /// Node kind, [`NodeKind::Other`] for unknown ids.
    fn kind(&self, node: NodeId) -> NodeKind {
        self.header(node).map(|h| h.kind).unwrap_or_default()
    }

    /// Node name, empty for unknown ids.
    fn name_of(&self, node: NodeId) -> &str {
        self.header(node).map(|h| h.name.as_str()).unwrap_or("")
    }

    /// Full path of a node, empty for unknown ids.
    fn full_name_of(&self, node: NodeId) -> &str {
        self.header(node).map(|h| h.full_name.as_str()).unwrap_or("")
    }

    /// True when an xform's local matrix cannot change over time.
    fn is_xform_constant(&self, node: NodeId) -> bool {
        self.timeline(node).map(|t| t.is_constant()).unwrap_or(true)
    }
}
