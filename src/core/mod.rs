//! Core layer - archive interface and fundamental types.
//!
//! This module provides:
//! - [`TimeSampling`] / [`SampleTimeline`] - Time sampling and sample bracketing
//! - [`SampleInterp`] - Floor/ceil sample pair plus blend weight
//! - [`ObjectHeader`] / [`NodeKind`] - Node identity
//! - [`SceneArchive`] - The read-only archive interface the sampler consumes

mod time_sampling;
mod header;
mod traits;
mod sample;

pub use time_sampling::{TimeSampling, TimeSamplingType, SampleTimeline, COINCIDENT_EPSILON};
pub use header::{ObjectHeader, NodeKind, NodeId};
pub use traits::SceneArchive;
pub use sample::{SampleInterp, GeometryScope};
