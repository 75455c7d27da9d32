//! Box model: annotation boxes, sparse patches, and the ordered in-memory store.
//!
//! `AnnotationBox` is the corner-pair representation edited by the pointer
//! state machine. Corners are kept exactly as the user dragged them, so a box
//! may be "inverted" (end left of start) until it is normalized. `BoxStore`
//! owns the committed boxes in draw order: later boxes are drawn on top and
//! win hit-tests.

#[cfg(test)]
#[path = "boxes_test.rs"]
mod boxes_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::LogicalPoint;
use crate::geom::LogicalRect;

/// Unique identifier for an annotation box.
pub type BoxId = Uuid;

/// A bounding box in logical (image pixel) space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBox {
    /// Unique identifier for this box.
    pub id: BoxId,
    /// Corner where the drag started.
    pub start: LogicalPoint,
    /// Corner opposite `start`.
    pub end: LogicalPoint,
    /// Class label.
    pub label: String,
}

impl AnnotationBox {
    /// Create a box with a fresh id.
    #[must_use]
    pub fn new(start: LogicalPoint, end: LogicalPoint, label: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), start, end, label: label.into() }
    }

    /// Create a box from a top-left corner and size.
    #[must_use]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64, label: impl Into<String>) -> Self {
        Self::new(LogicalPoint::new(x, y), LogicalPoint::new(x + width, y + height), label)
    }

    /// The effective (non-inverted) rectangle.
    #[must_use]
    pub fn rect(&self) -> LogicalRect {
        LogicalRect::from_corners(self.start, self.end)
    }
}

/// Sparse update for a committed box. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<LogicalPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<LogicalPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BoxPatch {
    /// A patch that only changes the label.
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self { label: Some(label.into()), ..Default::default() }
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.label.is_none()
    }
}

/// Committed boxes in draw order.
#[derive(Debug, Clone, Default)]
pub struct BoxStore {
    boxes: Vec<AnnotationBox>,
}

impl BoxStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Append a box on top. A box with the same id is replaced in place.
    pub fn insert(&mut self, b: AnnotationBox) {
        if let Some(existing) = self.get_mut(&b.id) {
            *existing = b;
        } else {
            self.boxes.push(b);
        }
    }

    /// Remove a box by id, returning it if it was present.
    pub fn remove(&mut self, id: &BoxId) -> Option<AnnotationBox> {
        let idx = self.boxes.iter().position(|b| b.id == *id)?;
        Some(self.boxes.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &BoxId) -> Option<&AnnotationBox> {
        self.boxes.iter().find(|b| b.id == *id)
    }

    pub fn get_mut(&mut self, id: &BoxId) -> Option<&mut AnnotationBox> {
        self.boxes.iter_mut().find(|b| b.id == *id)
    }

    /// Apply a patch to an existing box. Returns false if the box doesn't exist.
    pub fn apply_patch(&mut self, id: &BoxId, patch: &BoxPatch) -> bool {
        let Some(b) = self.get_mut(id) else {
            return false;
        };
        if let Some(start) = patch.start {
            b.start = start;
        }
        if let Some(end) = patch.end {
            b.end = end;
        }
        if let Some(ref label) = patch.label {
            b.label.clone_from(label);
        }
        true
    }

    /// Replace all boxes.
    pub fn load(&mut self, boxes: Vec<AnnotationBox>) {
        self.boxes = boxes;
    }

    /// Remove every box.
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    /// All boxes, bottom first.
    #[must_use]
    pub fn as_slice(&self) -> &[AnnotationBox] {
        &self.boxes
    }

    /// Iterate boxes top-most first (hit-test order).
    pub fn iter_topmost(&self) -> impl Iterator<Item = &AnnotationBox> {
        self.boxes.iter().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
