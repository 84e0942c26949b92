//! Scene archive implementations.
//!
//! - [`MemoryArchive`] - node arena implementing [`SceneArchive`](crate::core::SceneArchive)
//! - [`json`] - JSON scene files loaded into a [`MemoryArchive`]

mod memory;
pub mod json;

pub use memory::{MemoryArchive, NodeData};
