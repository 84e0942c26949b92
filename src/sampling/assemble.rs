//! Geometry sample assembly.
//!
//! Produces world-space points, reversed-winding topology and per-face-vertex
//! UVs/normals for one geometry node at one query time.

use crate::core::{NodeId, SampleInterp, SampleTimeline, SceneArchive};
use crate::geom::GeomParamSample;
use crate::util::{BBox3d, Chrono, DVec3, Vec2, Vec3};

use super::world::{world_matrix, WorldMatrix};

/// How much of a node to read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleMode {
    /// Points, topology and attributes.
    #[default]
    Full,
    /// An 8-corner box proxy of the node's bounds.
    BoundsOnly,
}

/// Where the emitted points came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointBlend {
    /// One stored sample, unblended.
    Single { index: usize },
    /// Linear blend of two samples.
    Blended { floor: usize, ceil: usize, weight: f64 },
    /// The bracketing samples disagree on point count; the floor sample was
    /// used as-is.
    TopologyMismatch {
        floor: usize,
        floor_count: usize,
        ceil_count: usize,
    },
    /// The ceil sample could not be read; the floor sample was used as-is.
    CeilUnreadable { floor: usize },
    /// Nothing could be read (not geometry, invalid archive, read error).
    Unavailable,
}

/// A per-face-vertex attribute after expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum VertexAttribute<T> {
    /// The mesh has no such parameter.
    #[default]
    Absent,
    /// The parameter's index array fits neither the point count nor the
    /// face-vertex count (or references missing values), so it was omitted.
    Mismatched { num_indices: usize },
    /// One value per emitted face-vertex, in emitted winding.
    Assigned(Vec<T>),
}

impl<T> VertexAttribute<T> {
    /// Assigned values, if any.
    pub fn values(&self) -> Option<&[T]> {
        match self {
            Self::Assigned(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned(_))
    }
}

/// Vertex table of the bounds proxy, four corners per face.
pub const BOX_FACE_INDICES: [i32; 24] = [
    0, 2, 3, 1,
    0, 1, 5, 4,
    0, 4, 6, 2,
    1, 3, 7, 5,
    2, 6, 7, 3,
    4, 5, 7, 6,
];

/// Resolved geometry of one node at one time.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometrySample {
    /// World-space points.
    pub points: Vec<Vec3>,
    pub face_counts: Vec<i32>,
    /// Point indices, winding reversed relative to the archive.
    pub face_indices: Vec<i32>,
    pub uvs: VertexAttribute<Vec2>,
    pub normals: VertexAttribute<Vec3>,
    pub blend: PointBlend,
    /// The stored faces did not fit the points, so only points were emitted.
    pub topology_dropped: bool,
    /// The ancestor transform applied to the points.
    pub world: WorldMatrix,
}

impl GeometrySample {
    /// A sample with no geometry.
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            face_counts: Vec::new(),
            face_indices: Vec::new(),
            uvs: VertexAttribute::Absent,
            normals: VertexAttribute::Absent,
            blend: PointBlend::Unavailable,
            topology_dropped: false,
            world: WorldMatrix::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn num_faces(&self) -> usize {
        self.face_counts.len()
    }

    /// Points as raw bytes (tightly packed f32 triples).
    pub fn point_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    /// Bounds of the emitted points.
    pub fn bounds(&self) -> BBox3d {
        BBox3d::from_points(&self.points)
    }
}

impl Default for GeometrySample {
    fn default() -> Self {
        Self::empty()
    }
}

/// Resolve `node` at `time`.
///
/// Non-geometry nodes, invalid archives and unreadable floor samples yield
/// [`GeometrySample::empty`]. Nothing here fails the caller.
pub fn sample_geometry<A: SceneArchive + ?Sized>(
    archive: &A,
    node: NodeId,
    time: Chrono,
    interpolate: bool,
    mode: SampleMode,
) -> GeometrySample {
    if !archive.is_valid() || !archive.kind(node).is_geometry() {
        return GeometrySample::empty();
    }

    let timeline = archive.timeline(node).unwrap_or_else(|e| {
        tracing::debug!(node, "timeline unreadable, treating as static: {e}");
        SampleTimeline::single()
    });
    let bracket = timeline.bracket(time).with_interpolation(interpolate);
    let world = world_matrix(archive, node, time, interpolate);

    match mode {
        SampleMode::Full => assemble_full(archive, node, bracket, world),
        SampleMode::BoundsOnly => assemble_bounds(archive, node, bracket.floor_index, world),
    }
}

fn assemble_full<A: SceneArchive + ?Sized>(
    archive: &A,
    node: NodeId,
    bracket: SampleInterp,
    world: WorldMatrix,
) -> GeometrySample {
    let floor_index = bracket.floor_index;
    let floor = match archive.mesh_sample(node, floor_index) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(node, path = archive.full_name_of(node), "mesh sample unreadable: {e}");
            return GeometrySample { world, ..GeometrySample::empty() };
        }
    };

    let floor_points = || floor.positions.iter().map(|p| p.as_dvec3()).collect::<Vec<_>>();

    let (object_points, blend) = if bracket.is_exact() {
        (floor_points(), PointBlend::Single { index: floor_index })
    } else {
        match archive.positions(node, bracket.ceil_index) {
            Ok(ceil) if ceil.len() == floor.positions.len() => {
                let w = bracket.alpha;
                let pts: Vec<DVec3> = floor
                    .positions
                    .iter()
                    .zip(&ceil)
                    .map(|(a, b)| a.as_dvec3().lerp(b.as_dvec3(), w))
                    .collect();
                let blend = PointBlend::Blended {
                    floor: floor_index,
                    ceil: bracket.ceil_index,
                    weight: w,
                };
                (pts, blend)
            }
            Ok(ceil) => {
                tracing::warn!(
                    node,
                    path = archive.full_name_of(node),
                    floor_count = floor.positions.len(),
                    ceil_count = ceil.len(),
                    "point count changes between samples, not interpolating"
                );
                let blend = PointBlend::TopologyMismatch {
                    floor: floor_index,
                    floor_count: floor.positions.len(),
                    ceil_count: ceil.len(),
                };
                (floor_points(), blend)
            }
            Err(e) => {
                tracing::warn!(node, path = archive.full_name_of(node), "ceil sample unreadable: {e}");
                (floor_points(), PointBlend::CeilUnreadable { floor: floor_index })
            }
        }
    };

    let points = object_points
        .into_iter()
        .map(|p| world.transform_point(p).as_vec3())
        .collect();

    if !floor.is_topology_consistent() {
        tracing::warn!(
            node,
            path = archive.full_name_of(node),
            num_points = floor.positions.len(),
            num_face_vertices = floor.num_face_vertices(),
            num_indices = floor.face_indices.len(),
            "face indices do not fit the points, emitting points only"
        );
        return GeometrySample {
            points,
            blend,
            topology_dropped: true,
            world,
            ..GeometrySample::empty()
        };
    }

    let (face_counts, face_indices) = reverse_winding(&floor.face_counts, &floor.face_indices);

    let num_points = floor.positions.len();
    let uvs = expand_attribute(floor.uvs.as_ref(), &face_counts, &floor.face_indices, num_points);
    let normals = expand_attribute(floor.normals.as_ref(), &face_counts, &floor.face_indices, num_points);

    GeometrySample {
        points,
        face_counts,
        face_indices,
        uvs,
        normals,
        blend,
        topology_dropped: false,
        world,
    }
}

fn assemble_bounds<A: SceneArchive + ?Sized>(
    archive: &A,
    node: NodeId,
    floor_index: usize,
    world: WorldMatrix,
) -> GeometrySample {
    let bounds = match archive.self_bounds(node, floor_index) {
        Ok(Some(b)) => b,
        Ok(None) => archive
            .positions(node, floor_index)
            .map(|p| BBox3d::from_points(&p))
            .unwrap_or(BBox3d::EMPTY),
        Err(e) => {
            tracing::warn!(node, path = archive.full_name_of(node), "bounds unreadable: {e}");
            BBox3d::EMPTY
        }
    };
    if bounds.is_empty() {
        return GeometrySample { world, ..GeometrySample::empty() };
    }

    let points = (0..8)
        .map(|i| world.transform_point(bounds.corner(i)).as_vec3())
        .collect();
    let (face_counts, face_indices) = reverse_winding(&[4; 6], &BOX_FACE_INDICES);

    GeometrySample {
        points,
        face_counts,
        face_indices,
        uvs: VertexAttribute::Absent,
        normals: VertexAttribute::Absent,
        blend: PointBlend::Single { index: floor_index },
        topology_dropped: false,
        world,
    }
}

/// Reverse the vertex order of every face.
///
/// Negative counts read as empty faces. Faces that would run past the end of
/// `indices` are dropped together with everything after them.
pub fn reverse_winding(counts: &[i32], indices: &[i32]) -> (Vec<i32>, Vec<i32>) {
    let mut out_counts = Vec::with_capacity(counts.len());
    let mut out_indices = Vec::with_capacity(indices.len());
    let mut offset = 0usize;
    for &count in counts {
        let n = count.max(0) as usize;
        let Some(face) = indices.get(offset..offset + n) else {
            break;
        };
        out_counts.push(n as i32);
        out_indices.extend(face.iter().rev());
        offset += n;
    }
    (out_counts, out_indices)
}

/// Expand a geom param to one value per face-vertex in reversed winding.
///
/// The param's index array must match the face-vertex count (read per
/// face-vertex, preferred) or the point count (read through the face
/// indices). `counts` are the emitted face counts; `indices` the archive's
/// face indices in stored order.
pub fn expand_attribute<T: Copy>(
    param: Option<&GeomParamSample<T>>,
    counts: &[i32],
    indices: &[i32],
    num_points: usize,
) -> VertexAttribute<T> {
    let Some(param) = param else {
        return VertexAttribute::Absent;
    };

    let num_indices = param.num_indices();
    let num_face_vertices: usize = counts.iter().map(|&c| c as usize).sum();
    let per_face_vertex = num_indices == num_face_vertices;
    if !per_face_vertex && num_indices != num_points {
        return VertexAttribute::Mismatched { num_indices };
    }

    let mut out = Vec::with_capacity(num_face_vertices);
    let mut offset = 0usize;
    for &count in counts {
        let n = count as usize;
        for k in 0..n {
            let src = offset + n - 1 - k;
            let slot = if per_face_vertex {
                Some(src)
            } else {
                indices.get(src).and_then(|&i| usize::try_from(i).ok())
            };
            match slot.and_then(|s| param.value_at(s)) {
                Some(v) => out.push(v),
                None => return VertexAttribute::Mismatched { num_indices },
            }
        }
        offset += n;
    }
    VertexAttribute::Assigned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GeometryScope;

    #[test]
    fn test_reverse_winding() {
        let (c, i) = reverse_winding(&[3, 4], &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(c, vec![3, 4]);
        assert_eq!(i, vec![2, 1, 0, 6, 5, 4, 3]);
    }

    #[test]
    fn test_reverse_winding_truncated() {
        let (c, i) = reverse_winding(&[3, 3], &[0, 1, 2, 3]);
        assert_eq!(c, vec![3]);
        assert_eq!(i, vec![2, 1, 0]);
    }

    #[test]
    fn test_expand_face_varying() {
        let uv = GeomParamSample::indexed(
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            vec![0, 1, 2],
            GeometryScope::FaceVarying,
        );
        let attr = expand_attribute(Some(&uv), &[3], &[0, 1, 2], 3);
        assert_eq!(
            attr.values().unwrap(),
            &[Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)]
        );
    }

    #[test]
    fn test_expand_per_point() {
        // 4 points, 2 triangles: 6 face-vertices, index array sized per point
        let n = GeomParamSample::new(
            vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE],
            GeometryScope::Varying,
        );
        let attr = expand_attribute(Some(&n), &[3, 3], &[0, 1, 2, 0, 2, 3], 4);
        assert_eq!(
            attr.values().unwrap(),
            &[Vec3::Z, Vec3::Y, Vec3::X, Vec3::ONE, Vec3::Z, Vec3::X]
        );
    }

    #[test]
    fn test_expand_mismatch() {
        let uv = GeomParamSample::new(vec![Vec2::ZERO; 5], GeometryScope::FaceVarying);
        let attr = expand_attribute(Some(&uv), &[3], &[0, 1, 2], 4);
        assert_eq!(attr, VertexAttribute::Mismatched { num_indices: 5 });

        // right length, index past the values
        let uv = GeomParamSample::indexed(vec![Vec2::ZERO], vec![0, 0, 9], GeometryScope::FaceVarying);
        let attr = expand_attribute(Some(&uv), &[3], &[0, 1, 2], 3);
        assert_eq!(attr, VertexAttribute::Mismatched { num_indices: 3 });

        let attr: VertexAttribute<Vec2> = expand_attribute(None, &[3], &[0, 1, 2], 3);
        assert_eq!(attr, VertexAttribute::Absent);
    }

    #[test]
    fn test_box_table_covers_every_corner_three_times() {
        let mut uses = [0; 8];
        for &i in &BOX_FACE_INDICES {
            uses[i as usize] += 1;
        }
        assert_eq!(uses, [3; 8]);
    }

    #[test]
    fn test_empty_sample() {
        let s = GeometrySample::empty();
        assert!(s.is_empty());
        assert_eq!(s.blend, PointBlend::Unavailable);
        assert!(s.point_bytes().is_empty());
    }
}
