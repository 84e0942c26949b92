//! World matrix accumulation over a node's ancestor chain.

use smallvec::SmallVec;

use super::decompose::interpolate_matrices;
use crate::core::{NodeId, NodeKind, SceneArchive};
use crate::util::{Chrono, DMat4, DVec3, Result};

/// Accumulated ancestor transform of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldMatrix {
    pub matrix: DMat4,
    /// Xform ancestors whose samples could not be read; each contributed
    /// identity.
    pub unreadable: SmallVec<[NodeId; 2]>,
}

impl Default for WorldMatrix {
    fn default() -> Self {
        Self {
            matrix: DMat4::IDENTITY,
            unreadable: SmallVec::new(),
        }
    }
}

impl WorldMatrix {
    /// True when every ancestor was read.
    pub fn is_complete(&self) -> bool {
        self.unreadable.is_empty()
    }

    /// Transform a point into world space.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.matrix.transform_point3(p)
    }
}

/// Local matrix of an xform node at `time`, plus its `inherits` flag.
///
/// Constant xforms use their only sample directly. Animated ones bracket
/// their own timeline; a collapsed bracket (or `interpolate == false`) reads
/// the floor sample, otherwise both neighbours are decomposed and blended.
pub fn local_matrix<A: SceneArchive + ?Sized>(
    archive: &A,
    node: NodeId,
    time: Chrono,
    interpolate: bool,
) -> Result<(DMat4, bool)> {
    if archive.is_xform_constant(node) {
        let sample = archive.xform_sample(node, 0)?;
        return Ok((sample.matrix(), sample.inherits));
    }

    let bracket = archive.timeline(node)?.bracket(time).with_interpolation(interpolate);
    let floor = archive.xform_sample(node, bracket.floor_index)?;
    if bracket.is_exact() {
        return Ok((floor.matrix(), floor.inherits));
    }

    let ceil = archive.xform_sample(node, bracket.ceil_index)?;
    let m = interpolate_matrices(&floor.matrix(), &ceil.matrix(), bracket.alpha);
    tracing::trace!(
        node,
        floor = bracket.floor_index,
        ceil = bracket.ceil_index,
        alpha = bracket.alpha,
        "blended xform"
    );
    Ok((m, floor.inherits))
}

/// World matrix of `node` at `time`: the product of every xform ancestor's
/// local matrix, from the parent up to the root. The node's own transform is
/// not included.
///
/// Non-xform ancestors contribute identity. Unreadable xform ancestors also
/// contribute identity and are listed in [`WorldMatrix::unreadable`]. An
/// ancestor that does not inherit its parent's transform ends the walk.
pub fn world_matrix<A: SceneArchive + ?Sized>(
    archive: &A,
    node: NodeId,
    time: Chrono,
    interpolate: bool,
) -> WorldMatrix {
    let mut world = WorldMatrix::default();
    let mut current = archive.parent(node);

    while let Some(ancestor) = current {
        if archive.kind(ancestor) == NodeKind::Xform {
            match local_matrix(archive, ancestor, time, interpolate) {
                Ok((local, inherits)) => {
                    world.matrix = local * world.matrix;
                    if !inherits {
                        tracing::trace!(node, ancestor, "ancestor does not inherit, stopping");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        node,
                        ancestor,
                        path = archive.full_name_of(ancestor),
                        "unreadable xform, using identity: {e}"
                    );
                    world.unreadable.push(ancestor);
                }
            }
        }
        current = archive.parent(ancestor);
    }

    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;
    use crate::core::TimeSampling;
    use crate::geom::{XformOp, XformSample};

    fn translate(x: f64, y: f64, z: f64) -> XformSample {
        XformSample { ops: vec![XformOp::translate(x, y, z)], inherits: true }
    }

    #[test]
    fn test_root_level_node_is_identity() {
        let mut a = MemoryArchive::new("t");
        let g = a.add_group(0, "g").unwrap();
        let w = world_matrix(&a, g, 0.0, true);
        assert_eq!(w.matrix, DMat4::IDENTITY);
        assert!(w.is_complete());
    }

    #[test]
    fn test_chain_order() {
        // parent translates, grandparent scales: the point is translated first
        let mut a = MemoryArchive::new("t");
        let top = a
            .add_xform(0, "top", TimeSampling::IDENTITY, vec![XformSample {
                ops: vec![XformOp::scale(2.0, 2.0, 2.0)],
                inherits: true,
            }])
            .unwrap();
        let group = a.add_group(top, "group").unwrap();
        let mid = a
            .add_xform(group, "mid", TimeSampling::IDENTITY, vec![translate(1.0, 0.0, 0.0)])
            .unwrap();
        let leaf = a.add_group(mid, "leaf").unwrap();

        let w = world_matrix(&a, leaf, 0.0, false);
        assert_eq!(w.transform_point(DVec3::ZERO), DVec3::new(2.0, 0.0, 0.0));

        // the node's own xform is not part of its world matrix
        let w = world_matrix(&a, mid, 0.0, false);
        assert_eq!(w.transform_point(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_inherits_false_stops_ascent() {
        let mut a = MemoryArchive::new("t");
        let top = a
            .add_xform(0, "top", TimeSampling::IDENTITY, vec![translate(100.0, 0.0, 0.0)])
            .unwrap();
        let mid = a
            .add_xform(top, "mid", TimeSampling::IDENTITY, vec![
                XformSample { inherits: false, ..translate(0.0, 1.0, 0.0) },
            ])
            .unwrap();
        let leaf = a.add_group(mid, "leaf").unwrap();

        let w = world_matrix(&a, leaf, 0.0, true);
        assert_eq!(w.transform_point(DVec3::ZERO), DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_unreadable_ancestor_contributes_identity() {
        let mut a = MemoryArchive::new("t");
        let top = a
            .add_xform(0, "top", TimeSampling::IDENTITY, vec![translate(0.0, 0.0, 3.0)])
            .unwrap();
        // no samples at all
        let broken = a.add_xform(top, "broken", TimeSampling::IDENTITY, vec![]).unwrap();
        let leaf = a.add_group(broken, "leaf").unwrap();

        let w = world_matrix(&a, leaf, 0.0, true);
        assert_eq!(w.unreadable.as_slice(), &[broken]);
        assert!(!w.is_complete());
        assert_eq!(w.transform_point(DVec3::ZERO), DVec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_local_matrix_blends_and_collapses() {
        let mut a = MemoryArchive::new("t");
        let xf = a
            .add_xform(0, "xf", TimeSampling::acyclic(vec![0.0, 2.0]), vec![
                translate(0.0, 0.0, 0.0),
                translate(4.0, 0.0, 0.0),
            ])
            .unwrap();

        let (m, _) = local_matrix(&a, xf, 0.5, true).unwrap();
        assert!((m.w_axis.x - 1.0).abs() < 1e-12);

        let (m, _) = local_matrix(&a, xf, 0.5, false).unwrap();
        assert_eq!(m.w_axis.x, 0.0);

        let (m, _) = local_matrix(&a, xf, 2.0, true).unwrap();
        assert_eq!(m.w_axis.x, 4.0);
    }
}
