//! Geometry schema samples.
//!
//! Plain sample types for the schemas the sampler reads:
//! - [`XformSample`] - Transform operations
//! - [`PolyMeshSample`] - Polygon meshes
//! - [`SubDSample`] - Subdivision surfaces (read as their control cage)
//! - [`CameraSample`] - Cameras
//! - [`GeomParamSample`] - Indexed UV/normal attributes

pub mod xform;
pub mod polymesh;
pub mod subd;
pub mod camera;
pub mod geom_param;

pub use xform::{XformSample, XformOp, XformOpType, XFORM_SCHEMA};
pub use polymesh::{PolyMeshSample, POLYMESH_SCHEMA};
pub use subd::{SubDSample, SUBD_SCHEMA};
pub use camera::{CameraSample, CAMERA_SCHEMA};
pub use geom_param::GeomParamSample;
