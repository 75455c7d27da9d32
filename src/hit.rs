#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::boxes::{AnnotationBox, BoxId, BoxStore};
use crate::camera::{Camera, DomPoint, LogicalPoint};
use crate::geom::LogicalRect;

/// Which part of a box was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Corner(Corner),
    Edge(Edge),
}

/// Corner handles of a normalized box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    Nw,
    Ne,
    Se,
    Sw,
}

/// Edge handles, located at each edge's midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    N,
    E,
    S,
    W,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Se, Corner::Sw];

    /// Position of this corner on `r`.
    #[must_use]
    pub fn position(self, r: &LogicalRect) -> LogicalPoint {
        match self {
            Self::Nw => LogicalPoint::new(r.left(), r.top()),
            Self::Ne => LogicalPoint::new(r.right(), r.top()),
            Self::Se => LogicalPoint::new(r.right(), r.bottom()),
            Self::Sw => LogicalPoint::new(r.left(), r.bottom()),
        }
    }
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::N, Edge::E, Edge::S, Edge::W];

    /// Midpoint of this edge on `r`.
    #[must_use]
    pub fn midpoint(self, r: &LogicalRect) -> LogicalPoint {
        let cx = r.x + r.width / 2.0;
        let cy = r.y + r.height / 2.0;
        match self {
            Self::N => LogicalPoint::new(cx, r.top()),
            Self::E => LogicalPoint::new(r.right(), cy),
            Self::S => LogicalPoint::new(cx, r.bottom()),
            Self::W => LogicalPoint::new(r.left(), cy),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub box_id: BoxId,
    pub part: HitPart,
}

/// Test one box. Corners win over edges, edges over the body.
///
/// `threshold` is in logical units.
#[must_use]
pub fn hit_box(b: &AnnotationBox, pt: LogicalPoint, threshold: f64) -> Option<HitPart> {
    let r = b.rect();
    let near = |h: LogicalPoint| (pt.x - h.x).abs() <= threshold && (pt.y - h.y).abs() <= threshold;

    if let Some(c) = Corner::ALL.into_iter().find(|c| near(c.position(&r))) {
        return Some(HitPart::Corner(c));
    }
    if let Some(e) = Edge::ALL.into_iter().find(|e| near(e.midpoint(&r))) {
        return Some(HitPart::Edge(e));
    }
    r.contains(pt).then_some(HitPart::Body)
}

/// Find the box under a DOM point, checking the selected box first and then
/// the remaining boxes top-most first.
///
/// `threshold_px` is measured in DOM pixels, so handles stay equally easy to
/// grab at any zoom; it is converted to logical units through the camera.
#[must_use]
pub fn hit_test(
    dom_pt: DomPoint,
    store: &BoxStore,
    camera: &Camera,
    threshold_px: f64,
    selected: Option<BoxId>,
) -> Option<Hit> {
    let pt = camera.dom_to_logical(dom_pt);
    let threshold = camera.dom_dist_to_logical(threshold_px);

    if let Some(sel) = selected.and_then(|id| store.get(&id)) {
        if let Some(part) = hit_box(sel, pt, threshold) {
            return Some(Hit { box_id: sel.id, part });
        }
    }
    store
        .iter_topmost()
        .filter(|b| Some(b.id) != selected)
        .find_map(|b| hit_box(b, pt, threshold).map(|part| Hit { box_id: b.id, part }))
}

/// CSS cursor for hovering a hit part.
#[must_use]
pub fn cursor_for(part: Option<HitPart>) -> &'static str {
    match part {
        None => "crosshair",
        Some(HitPart::Body) => "move",
        Some(HitPart::Corner(Corner::Nw | Corner::Se)) => "nwse-resize",
        Some(HitPart::Corner(Corner::Ne | Corner::Sw)) => "nesw-resize",
        Some(HitPart::Edge(Edge::N | Edge::S)) => "ns-resize",
        Some(HitPart::Edge(Edge::E | Edge::W)) => "ew-resize",
    }
}
