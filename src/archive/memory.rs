//! In-memory scene archive.
//!
//! Nodes live in a flat arena indexed by [`NodeId`]; each node stores its
//! parent index, so ancestor walks are plain index lookups and the hierarchy
//! is acyclic by construction (a parent always exists before its children).

use crate::core::{NodeId, NodeKind, ObjectHeader, SampleTimeline, SceneArchive, TimeSampling};
use crate::geom::{CameraSample, PolyMeshSample, SubDSample, XformSample};
use crate::util::{BBox3d, Error, Result, Vec3};

/// Stored samples of one node, by schema.
#[derive(Clone, Debug)]
pub enum NodeData {
    Xform(Vec<XformSample>),
    PolyMesh(Vec<PolyMeshSample>),
    SubD(Vec<SubDSample>),
    Camera(Vec<CameraSample>),
    Group,
}

impl NodeData {
    /// Kind of node this data belongs to.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Xform(_) => NodeKind::Xform,
            Self::PolyMesh(_) => NodeKind::PolyMesh,
            Self::SubD(_) => NodeKind::SubD,
            Self::Camera(_) => NodeKind::Camera,
            Self::Group => NodeKind::Other,
        }
    }

    /// Number of stored samples (0 for groups).
    pub fn num_samples(&self) -> usize {
        match self {
            Self::Xform(s) => s.len(),
            Self::PolyMesh(s) => s.len(),
            Self::SubD(s) => s.len(),
            Self::Camera(s) => s.len(),
            Self::Group => 0,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    header: ObjectHeader,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    sampling: TimeSampling,
    data: NodeData,
}

/// A scene archive held entirely in memory.
#[derive(Clone, Debug)]
pub struct MemoryArchive {
    name: String,
    valid: bool,
    nodes: Vec<Node>,
}

impl MemoryArchive {
    /// Create an archive containing only the root node.
    pub fn new(name: impl Into<String>) -> Self {
        let root = Node {
            header: ObjectHeader::new("ABC", "/", NodeKind::Other),
            parent: None,
            children: Vec::new(),
            sampling: TimeSampling::IDENTITY,
            data: NodeData::Group,
        };
        Self {
            name: name.into(),
            valid: true,
            nodes: vec![root],
        }
    }

    /// An archive that failed to open. Readers treat it as having no content.
    pub fn invalid(name: impl Into<String>) -> Self {
        Self { valid: false, ..Self::new(name) }
    }

    /// Number of nodes including the root.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Add a node under `parent`.
    ///
    /// Acyclic samplings must provide a time for every stored sample.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        sampling: TimeSampling,
        data: NodeData,
    ) -> Result<NodeId> {
        let name = name.into();
        let parent_path = match self.nodes.get(parent) {
            Some(p) => p.header.full_name.clone(),
            None => return Err(Error::UnknownNode(parent)),
        };
        if name.is_empty() || name.contains('/') {
            return Err(Error::invalid(format!("bad node name {name:?}")));
        }
        if self.nodes[parent].children.iter().any(|&c| self.nodes[c].header.name == name) {
            return Err(Error::invalid(format!(
                "duplicate child {name:?} under {parent_path}"
            )));
        }

        let stored = data.num_samples();
        if let crate::core::TimeSamplingType::Acyclic { times } = &sampling.sampling_type {
            if times.len() < stored {
                return Err(Error::invalid(format!(
                    "{name}: {stored} samples but only {} sample times",
                    times.len()
                )));
            }
        }

        let full_name = if parent_path == "/" {
            format!("/{name}")
        } else {
            format!("{parent_path}/{name}")
        };

        let id = self.nodes.len();
        self.nodes.push(Node {
            header: ObjectHeader::new(name, full_name, data.kind()),
            parent: Some(parent),
            children: Vec::new(),
            sampling,
            data,
        });
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Add a grouping node.
    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        self.add_node(parent, name, TimeSampling::IDENTITY, NodeData::Group)
    }

    /// Add a transform node.
    pub fn add_xform(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        sampling: TimeSampling,
        samples: Vec<XformSample>,
    ) -> Result<NodeId> {
        self.add_node(parent, name, sampling, NodeData::Xform(samples))
    }

    /// Add a polygon mesh node.
    pub fn add_poly_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        sampling: TimeSampling,
        samples: Vec<PolyMeshSample>,
    ) -> Result<NodeId> {
        self.add_node(parent, name, sampling, NodeData::PolyMesh(samples))
    }

    /// Add a subdivision surface node.
    pub fn add_subd(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        sampling: TimeSampling,
        samples: Vec<SubDSample>,
    ) -> Result<NodeId> {
        self.add_node(parent, name, sampling, NodeData::SubD(samples))
    }

    /// Add a camera node.
    pub fn add_camera(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        sampling: TimeSampling,
        samples: Vec<CameraSample>,
    ) -> Result<NodeId> {
        self.add_node(parent, name, sampling, NodeData::Camera(samples))
    }

    /// Find a node by full path (e.g. "/group/mesh").
    pub fn find_object(&self, path: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.header.full_name == path)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        if !self.valid {
            return Err(Error::InvalidArchive(self.name.clone()));
        }
        self.nodes.get(id).ok_or(Error::UnknownNode(id))
    }

    fn pick<'a, T>(samples: &'a [T], index: usize) -> Result<&'a T> {
        samples.get(index).ok_or(Error::SampleOutOfBounds {
            index,
            count: samples.len(),
        })
    }

    fn mismatch(node: &Node, expected: NodeKind) -> Error {
        Error::schema(expected.label(), node.header.kind.label())
    }
}

impl SceneArchive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn root(&self) -> NodeId {
        0
    }

    fn header(&self, node: NodeId) -> Option<&ObjectHeader> {
        self.nodes.get(node).map(|n| &n.header)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn timeline(&self, node: NodeId) -> Result<SampleTimeline> {
        let n = self.node(node)?;
        Ok(SampleTimeline::new(n.sampling.clone(), n.data.num_samples()))
    }

    fn xform_sample(&self, node: NodeId, index: usize) -> Result<XformSample> {
        let n = self.node(node)?;
        match &n.data {
            NodeData::Xform(s) => Self::pick(s, index).cloned(),
            _ => Err(Self::mismatch(n, NodeKind::Xform)),
        }
    }

    fn mesh_sample(&self, node: NodeId, index: usize) -> Result<PolyMeshSample> {
        let n = self.node(node)?;
        match &n.data {
            NodeData::PolyMesh(s) => Self::pick(s, index).cloned(),
            NodeData::SubD(s) => Self::pick(s, index).map(|s| s.to_mesh_sample()),
            _ => Err(Self::mismatch(n, NodeKind::PolyMesh)),
        }
    }

    fn camera_sample(&self, node: NodeId, index: usize) -> Result<CameraSample> {
        let n = self.node(node)?;
        match &n.data {
            NodeData::Camera(s) => Self::pick(s, index).cloned(),
            _ => Err(Self::mismatch(n, NodeKind::Camera)),
        }
    }

    fn positions(&self, node: NodeId, index: usize) -> Result<Vec<Vec3>> {
        let n = self.node(node)?;
        match &n.data {
            NodeData::PolyMesh(s) => Ok(Self::pick(s, index)?.positions.clone()),
            NodeData::SubD(s) => Ok(Self::pick(s, index)?.positions.clone()),
            _ => Err(Self::mismatch(n, NodeKind::PolyMesh)),
        }
    }

    fn self_bounds(&self, node: NodeId, index: usize) -> Result<Option<BBox3d>> {
        let n = self.node(node)?;
        match &n.data {
            NodeData::PolyMesh(s) => Ok(Self::pick(s, index)?.self_bounds),
            NodeData::SubD(s) => Ok(Self::pick(s, index)?.self_bounds),
            _ => Err(Self::mismatch(n, NodeKind::PolyMesh)),
        }
    }

    fn is_xform_constant(&self, node: NodeId) -> bool {
        match self.node(node).map(|n| &n.data) {
            Ok(NodeData::Xform(s)) => s.len() <= 1 || s.windows(2).all(|w| w[0] == w[1]),
            _ => true,
        }
    }
}
