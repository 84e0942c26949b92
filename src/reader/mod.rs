//! Whole-archive geometry reading for a host application.
//!
//! A [`GeoReader`] turns an output frame into a sample time (via
//! [`ReadSettings`]) and resolves every object of an [`ObjectList`] in
//! parallel.

pub mod scan;
mod settings;

pub use scan::{ObjectEntry, ObjectList};
pub use settings::{frame_range, Interpolation, ReadSettings, Timing};

use rayon::prelude::*;

use crate::core::{NodeId, NodeKind, SceneArchive};
use crate::geom::CameraSample;
use crate::sampling::{sample_geometry, world_matrix, GeometrySample, SampleMode, WorldMatrix};
use crate::util::{Chrono, Error, Result};

/// A camera resolved at one time.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraView {
    pub sample: CameraSample,
    pub world: WorldMatrix,
}

/// Resolves archive objects for output frames.
#[derive(Clone, Debug, Default)]
pub struct GeoReader {
    pub settings: ReadSettings,
}

impl GeoReader {
    pub fn new(settings: ReadSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Reader whose frame range covers the archive's animation.
    pub fn for_archive<A: SceneArchive + ?Sized>(archive: &A, mut settings: ReadSettings) -> Result<Self> {
        settings.validate()?;
        if let Some(span) = scan::time_span(archive) {
            settings.set_range_from_span(span);
        }
        Ok(Self { settings })
    }

    /// Geometry of every object at `output_frame`, one entry per object in
    /// list order.
    ///
    /// Inactive objects yield empty samples, bbox objects a bounds proxy.
    /// An invalid archive yields an empty list.
    #[tracing::instrument(skip_all, fields(archive = archive.name(), objects = objects.len(), frame = output_frame))]
    pub fn create_geometry<A: SceneArchive + ?Sized>(
        &self,
        archive: &A,
        objects: &ObjectList,
        output_frame: f64,
    ) -> Vec<GeometrySample> {
        if !archive.is_valid() {
            tracing::warn!("archive is not valid, no geometry");
            return Vec::new();
        }

        let time = self.settings.sample_time(output_frame);
        let interpolate = self.settings.interpolate();
        tracing::debug!(time, interpolate, "sampling objects");

        objects
            .entries
            .par_iter()
            .map(|entry| {
                if !entry.active {
                    return GeometrySample::empty();
                }
                let mode = if entry.bbox { SampleMode::BoundsOnly } else { SampleMode::Full };
                sample_geometry(archive, entry.node, time, interpolate, mode)
            })
            .collect()
    }

    /// Camera at `output_frame`.
    pub fn camera<A: SceneArchive + ?Sized>(
        &self,
        archive: &A,
        node: NodeId,
        output_frame: f64,
    ) -> Result<CameraView> {
        read_camera(
            archive,
            node,
            self.settings.sample_time(output_frame),
            self.settings.interpolate(),
        )
    }
}

/// Floor camera sample at `time` plus the camera's world matrix.
pub fn read_camera<A: SceneArchive + ?Sized>(
    archive: &A,
    node: NodeId,
    time: Chrono,
    interpolate: bool,
) -> Result<CameraView> {
    if archive.kind(node) != NodeKind::Camera {
        return Err(Error::schema(NodeKind::Camera.label(), archive.kind(node).label()));
    }
    let floor = archive.timeline(node)?.floor_index(time).0;
    Ok(CameraView {
        sample: archive.camera_sample(node, floor)?,
        world: world_matrix(archive, node, time, interpolate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::core::TimeSampling;
    use crate::geom::{PolyMeshSample, XformOp, XformSample};
    use crate::sampling::PointBlend;
    use crate::util::Vec3;

    fn scene() -> (MemoryArchive, NodeId) {
        let mut a = MemoryArchive::new("reader");
        let xf = a
            .add_xform(0, "xf", TimeSampling::uniform(1.0 / 24.0, 1.0 / 24.0), vec![
                XformSample::identity(),
                XformSample { ops: vec![XformOp::translate(2.0, 0.0, 0.0)], inherits: true },
            ])
            .unwrap();
        a.add_poly_mesh(xf, "tri", TimeSampling::IDENTITY, vec![PolyMeshSample {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            face_counts: vec![3],
            face_indices: vec![0, 1, 2],
            ..Default::default()
        }])
        .unwrap();
        a.add_poly_mesh(0, "other", TimeSampling::IDENTITY, vec![PolyMeshSample {
            positions: vec![Vec3::ONE],
            ..Default::default()
        }])
        .unwrap();
        let cam = a
            .add_camera(xf, "cam", TimeSampling::uniform(1.0 / 24.0, 1.0 / 24.0), vec![
                CameraSample { focal_length: 20.0, ..Default::default() },
                CameraSample { focal_length: 80.0, ..Default::default() },
            ])
            .unwrap();
        (a, cam)
    }

    #[test]
    fn test_for_archive_sets_range() {
        let (a, _) = scene();
        let r = GeoReader::for_archive(&a, ReadSettings::default()).unwrap();
        assert_eq!((r.settings.first_frame, r.settings.last_frame), (0, 2));
    }

    #[test]
    fn test_create_geometry_flags() {
        let (a, _) = scene();
        let reader = GeoReader::new(ReadSettings {
            interpolation: Interpolation::Linear,
            first_frame: 1,
            last_frame: 2,
            ..Default::default()
        })
        .unwrap();
        let mut objects = ObjectList::from_archive(&a);
        objects.set_active(&[1], false);

        let out = reader.create_geometry(&a, &objects, 1.5);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].points[0], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(out[0].blend, PointBlend::Single { index: 0 });
        assert!(out[1].is_empty());

        objects.set_bbox(&[0], true);
        let out = reader.create_geometry(&a, &objects, 1.5);
        assert_eq!(out[0].points.len(), 8);
        assert_eq!(out[0].face_counts, vec![4; 6]);
    }

    #[test]
    fn test_invalid_archive_yields_nothing() {
        let (a, _) = scene();
        let objects = ObjectList::from_archive(&a);
        let reader = GeoReader::default();
        assert!(reader.create_geometry(&MemoryArchive::invalid("x"), &objects, 1.0).is_empty());
    }

    #[test]
    fn test_read_camera() {
        let (a, cam) = scene();
        let view = read_camera(&a, cam, 2.0 / 24.0, false).unwrap();
        assert_eq!(view.sample.focal_length, 80.0);
        assert_eq!(view.world.transform_point(crate::util::DVec3::ZERO).x, 2.0);

        let reader = GeoReader::new(ReadSettings { first_frame: 1, last_frame: 2, ..Default::default() }).unwrap();
        assert_eq!(reader.camera(&a, cam, 1.0).unwrap().sample.focal_length, 20.0);

        assert!(matches!(read_camera(&a, 0, 0.0, false), Err(Error::SchemaMismatch { .. })));
    }
}
