//! JSON scene files.
//!
//! A scene file describes a node hierarchy with per-node time samplings and
//! samples, and loads into a [`MemoryArchive`]:
//!
//! ```json
//! {
//!   "children": [
//!     {
//!       "name": "xf",
//!       "type": "xform",
//!       "sampling": { "uniform": { "time_per_cycle": 1.0, "start_time": 0.0 } },
//!       "samples": [
//!         { "ops": [] },
//!         { "ops": [{ "op_type": "translate", "values": [10, 0, 0] }] }
//!       ],
//!       "children": [
//!         {
//!           "name": "mesh",
//!           "type": "poly_mesh",
//!           "samples": [{ "positions": [[0, 0, 0]], "face_counts": [], "face_indices": [] }]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Nodes without a `sampling` get one sample per second starting at 0.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{MemoryArchive, NodeData};
use crate::core::{NodeId, TimeSampling};
use crate::geom::{CameraSample, PolyMeshSample, SubDSample, XformSample};
use crate::util::{Chrono, Error, Result};

/// Top level of a scene file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneFile {
    /// Children of the archive root.
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

/// One node of a scene file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<TimeSamplingDef>,
    #[serde(flatten)]
    pub data: NodeDataDef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDef>,
}

/// Schema and samples of a node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeDataDef {
    Xform {
        #[serde(default)]
        samples: Vec<XformSample>,
    },
    PolyMesh {
        #[serde(default)]
        samples: Vec<PolyMeshSample>,
    },
    Subd {
        #[serde(default)]
        samples: Vec<SubDSample>,
    },
    Camera {
        #[serde(default)]
        samples: Vec<CameraSample>,
    },
    Group,
}

impl From<NodeDataDef> for NodeData {
    fn from(def: NodeDataDef) -> Self {
        match def {
            NodeDataDef::Xform { samples } => NodeData::Xform(samples),
            NodeDataDef::PolyMesh { samples } => NodeData::PolyMesh(samples),
            NodeDataDef::Subd { samples } => NodeData::SubD(samples),
            NodeDataDef::Camera { samples } => NodeData::Camera(samples),
            NodeDataDef::Group => NodeData::Group,
        }
    }
}

/// Time sampling of a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSamplingDef {
    Identity,
    Uniform {
        time_per_cycle: Chrono,
        #[serde(default)]
        start_time: Chrono,
    },
    Cyclic {
        time_per_cycle: Chrono,
        times: Vec<Chrono>,
    },
    Acyclic(Vec<Chrono>),
}

impl TimeSamplingDef {
    fn into_sampling(self, node: &str) -> Result<TimeSampling> {
        let sampling = match self {
            Self::Identity => TimeSampling::IDENTITY,
            Self::Uniform { time_per_cycle, start_time } => {
                if !(time_per_cycle > 0.0 && time_per_cycle.is_finite()) {
                    return Err(Error::invalid(format!(
                        "{node}: time_per_cycle must be positive, got {time_per_cycle}"
                    )));
                }
                if !start_time.is_finite() {
                    return Err(Error::invalid(format!("{node}: start_time is not finite")));
                }
                TimeSampling::uniform(time_per_cycle, start_time)
            }
            Self::Cyclic { time_per_cycle, times } => {
                check_increasing(node, &times)?;
                let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
                    return Err(Error::invalid(format!("{node}: cyclic sampling without times")));
                };
                // the next cycle must start after this one ends
                if !(time_per_cycle.is_finite() && time_per_cycle > last - first) {
                    return Err(Error::invalid(format!(
                        "{node}: time_per_cycle {time_per_cycle} does not exceed the cycle span {}",
                        last - first
                    )));
                }
                TimeSampling::cyclic(time_per_cycle, times)
            }
            Self::Acyclic(times) => {
                check_increasing(node, &times)?;
                TimeSampling::acyclic(times)
            }
        };
        Ok(sampling)
    }
}

fn check_increasing(node: &str, times: &[Chrono]) -> Result<()> {
    if times.iter().any(|t| !t.is_finite()) {
        return Err(Error::invalid(format!("{node}: sample times must be finite")));
    }
    if times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::invalid(format!(
            "{node}: sample times must be strictly increasing"
        )));
    }
    Ok(())
}

impl SceneFile {
    /// Build an archive from this description.
    pub fn into_archive(self, name: impl Into<String>) -> Result<MemoryArchive> {
        let mut archive = MemoryArchive::new(name);
        let root = 0;
        for child in self.children {
            add_def(&mut archive, root, child)?;
        }
        Ok(archive)
    }
}

fn add_def(archive: &mut MemoryArchive, parent: NodeId, def: NodeDef) -> Result<()> {
    let sampling = match def.sampling {
        Some(s) => s.into_sampling(&def.name)?,
        None => TimeSampling::uniform(1.0, 0.0),
    };
    let id = archive.add_node(parent, def.name, sampling, def.data.into())?;
    for child in def.children {
        add_def(archive, id, child)?;
    }
    Ok(())
}

/// Parse a scene from a JSON string.
pub fn from_str(json: &str, name: &str) -> Result<MemoryArchive> {
    let scene: SceneFile = serde_json::from_str(json)?;
    scene.into_archive(name)
}

/// Open a scene file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<MemoryArchive> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let archive = from_str(&text, &path.to_string_lossy())?;
    tracing::debug!(path = %path.display(), nodes = archive.num_nodes(), "scene loaded");
    Ok(archive)
}
