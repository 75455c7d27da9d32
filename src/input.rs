//! Input model: mouse buttons, keys, wheel deltas, and the gesture state machine.
//!
//! `EditState` is the gesture being tracked between pointer-down and
//! pointer-up. Each variant carries exactly the context its gesture needs, so
//! contradictory states ("moving while drawing") cannot be expressed.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::boxes::{AnnotationBox, BoxId};
use crate::camera::DomPoint;
use crate::hit::{Corner, Edge};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button; drags pan the view.
    Middle,
    /// Right mouse button; ignored by the editor.
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// The gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum EditState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A new box is being dragged out; `draft.start` is the anchor corner.
    /// The draft is not in the store until pointer-up commits it.
    Drawing { draft: AnnotationBox },
    /// A committed box is being dragged by its body.
    Moving {
        id: BoxId,
        /// DOM position of the previous pointer event.
        last: DomPoint,
        /// The box as it was at pointer-down, restored on cancel.
        original: AnnotationBox,
    },
    /// A committed box is being resized by one corner.
    ResizingCorner { id: BoxId, corner: Corner, last: DomPoint, original: AnnotationBox },
    /// A committed box is being resized by one edge.
    ResizingEdge { id: BoxId, edge: Edge, last: DomPoint, original: AnnotationBox },
    /// The view is being panned.
    Panning { last: DomPoint },
}

impl EditState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Short name for logs and tests.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Drawing { .. } => "drawing",
            Self::Moving { .. } => "moving",
            Self::ResizingCorner { .. } => "resizing-corner",
            Self::ResizingEdge { .. } => "resizing-edge",
            Self::Panning { .. } => "panning",
        }
    }

    /// Id of the committed box this gesture edits, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<BoxId> {
        match self {
            Self::Moving { id, .. } | Self::ResizingCorner { id, .. } | Self::ResizingEdge { id, .. } => Some(*id),
            _ => None,
        }
    }
}
