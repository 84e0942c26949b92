//! Archive enumeration: nodes by kind, name lookup and animated time span.

use crate::core::{NodeId, NodeKind, SceneArchive};
use crate::util::{BBox3d, Chrono};

/// Every node for which `pred` holds, depth-first in archive order.
pub fn collect_nodes<A, F>(archive: &A, pred: F) -> Vec<NodeId>
where
    A: SceneArchive + ?Sized,
    F: Fn(NodeKind) -> bool,
{
    let mut out = Vec::new();
    if !archive.is_valid() {
        return out;
    }
    let mut stack = vec![archive.root()];
    while let Some(node) = stack.pop() {
        if pred(archive.kind(node)) {
            out.push(node);
        }
        // reversed so the first child is visited first
        stack.extend(archive.children(node).iter().rev());
    }
    out
}

/// PolyMesh and SubD nodes.
pub fn geometry_nodes<A: SceneArchive + ?Sized>(archive: &A) -> Vec<NodeId> {
    collect_nodes(archive, |k| k.is_geometry())
}

pub fn xform_nodes<A: SceneArchive + ?Sized>(archive: &A) -> Vec<NodeId> {
    collect_nodes(archive, |k| k == NodeKind::Xform)
}

pub fn camera_nodes<A: SceneArchive + ?Sized>(archive: &A) -> Vec<NodeId> {
    collect_nodes(archive, |k| k == NodeKind::Camera)
}

/// First node (depth-first) named `name`, or whose full path is `name`,
/// optionally restricted to one kind.
pub fn find_named<A: SceneArchive + ?Sized>(
    archive: &A,
    name: &str,
    kind: Option<NodeKind>,
) -> Option<NodeId> {
    collect_nodes(archive, |k| kind.map_or(true, |want| want == k))
        .into_iter()
        .find(|&n| archive.name_of(n) == name || archive.full_name_of(n) == name)
}

/// Earliest first-sample and latest last-sample time over all xform, mesh,
/// subd and camera nodes. `None` when there are none.
pub fn time_span<A: SceneArchive + ?Sized>(archive: &A) -> Option<(Chrono, Chrono)> {
    let mut span: Option<(Chrono, Chrono)> = None;
    for node in collect_nodes(archive, |k| k.is_animatable()) {
        let timeline = match archive.timeline(node) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!(node, "skipping node without timeline: {e}");
                continue;
            }
        };
        let (first, last) = (timeline.first_time(), timeline.last_time());
        span = Some(match span {
            Some((lo, hi)) => (lo.min(first), hi.max(last)),
            None => (first, last),
        });
    }
    span
}

/// One readable geometry object and its read flags.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectEntry {
    pub name: String,
    pub node: NodeId,
    /// Inactive objects produce empty geometry.
    pub active: bool,
    /// Read a bounds proxy instead of full geometry.
    pub bbox: bool,
}

/// The geometry objects of an archive, in enumeration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectList {
    pub entries: Vec<ObjectEntry>,
}

impl ObjectList {
    /// All geometry nodes, active and in full mode.
    pub fn from_archive<A: SceneArchive + ?Sized>(archive: &A) -> Self {
        let entries = geometry_nodes(archive)
            .into_iter()
            .map(|node| ObjectEntry {
                name: archive.name_of(node).to_string(),
                node,
                active: true,
                bbox: false,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectEntry> {
        self.entries.iter()
    }

    /// Set the active flag of the selected rows; out-of-range rows are ignored.
    pub fn set_active(&mut self, rows: &[usize], active: bool) {
        for &r in rows {
            if let Some(e) = self.entries.get_mut(r) {
                e.active = active;
            }
        }
    }

    /// Set the bbox flag of the selected rows; out-of-range rows are ignored.
    pub fn set_bbox(&mut self, rows: &[usize], bbox: bool) {
        for &r in rows {
            if let Some(e) = self.entries.get_mut(r) {
                e.bbox = bbox;
            }
        }
    }

    /// Rows whose name contains `pattern`.
    pub fn matching(&self, pattern: &str) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name.contains(pattern))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Union of the stored self bounds of every geometry node at sample 0.
pub fn archive_bounds<A: SceneArchive + ?Sized>(archive: &A) -> BBox3d {
    let mut b = BBox3d::EMPTY;
    for node in geometry_nodes(archive) {
        match archive.self_bounds(node, 0) {
            Ok(Some(sb)) => b.expand_by_box(&sb),
            Ok(None) => {
                if let Ok(p) = archive.positions(node, 0) {
                    b.expand_by_box(&BBox3d::from_points(&p));
                }
            }
            Err(_) => {}
        }
    }
    b
}
