//! # abc-readgeo
//!
//! Resolves time-sampled scene state at arbitrary times: interpolated world
//! transforms along ancestor chains, and world-space geometry (points,
//! reversed-winding topology, UVs and normals) for polygon meshes and
//! subdivision surfaces.
//!
//! The archive itself is an external collaborator behind the
//! [`SceneArchive`](core::SceneArchive) trait. [`archive::MemoryArchive`]
//! implements it, and [`archive::json`] loads one from a JSON scene file.
//!
//! ## Modules
//!
//! - [`util`] - Math types and errors
//! - [`core`] - Time sampling, node headers, the archive trait
//! - [`geom`] - Schema samples (Xform, PolyMesh, SubD, Camera)
//! - [`archive`] - In-memory archive and JSON scenes
//! - [`sampling`] - Decomposition, world matrices, geometry assembly
//! - [`reader`] - Frame/time settings and whole-archive reading
//!
//! ## Example
//!
//! ```ignore
//! use abc_readgeo::prelude::*;
//!
//! let archive = abc_readgeo::archive::json::open("scene.json")?;
//! let mesh = scan::find_named(&archive, "body", None).unwrap();
//! let sample = sample_geometry(&archive, mesh, 0.5, true, SampleMode::Full);
//! println!("{} points", sample.points.len());
//! ```

pub mod util;
pub mod core;
pub mod geom;
pub mod archive;
pub mod sampling;
pub mod reader;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, BBox3d};
    pub use crate::core::{SceneArchive, SampleTimeline, TimeSampling, NodeId, NodeKind};
    pub use crate::archive::MemoryArchive;
    pub use crate::sampling::{
        sample_geometry, world_matrix, GeometrySample, PointBlend, SampleMode, VertexAttribute,
        WorldMatrix,
    };
    pub use crate::reader::{scan, GeoReader, ObjectList, ReadSettings};
    pub use crate::geom::*;
}
