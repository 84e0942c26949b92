//! Time-sampled scene resolution.
//!
//! - [`decompose`] - scale/shear/rotation/translation split and blending
//! - [`world`] - world matrices from ancestor chains
//! - [`assemble`] - world-space geometry samples
//!
//! Everything here is a pure function of (archive, node, time, flags):
//! repeated queries return identical results and independent queries may run
//! on separate threads.

pub mod decompose;
pub mod world;
pub mod assemble;

pub use decompose::{interpolate_matrices, shortest_arc, RigidDecomposition};
pub use world::{local_matrix, world_matrix, WorldMatrix};
pub use assemble::{sample_geometry, GeometrySample, PointBlend, SampleMode, VertexAttribute};
