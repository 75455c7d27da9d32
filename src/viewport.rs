//! Viewport culling: which boxes can possibly be on screen this frame.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::Serialize;

use crate::boxes::AnnotationBox;
use crate::camera::Camera;
use crate::geom::{LogicalRect, Size};

/// The visible sub-rectangle of the logical canvas.
pub type Viewport = LogicalRect;

impl LogicalRect {
    /// A viewport that contains every finite box.
    ///
    /// Kept finite so `right()`/`bottom()` never evaluate `-inf + inf`.
    #[must_use]
    pub fn unbounded() -> Self {
        let half = f64::MAX / 2.0;
        Self { x: -half, y: -half, width: f64::MAX, height: f64::MAX }
    }
}

/// Culling diagnostics for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewportStats {
    pub total_boxes: usize,
    pub visible_boxes: usize,
    pub culled_boxes: usize,
    /// Fraction of boxes skipped, `0..=1`.
    pub optimization_ratio: f64,
    /// `total / visible`; 1 when nothing was drawn.
    pub estimated_speedup: f64,
}

/// Visible logical rectangle for a canvas of `canvas` DOM pixels.
///
/// `padding` (logical px) widens the rectangle on every side so boxes just
/// outside the edge are already drawn when a pan brings them in.
#[must_use]
pub fn compute_viewport(canvas: Size, pan_x: f64, pan_y: f64, zoom: f64, padding: f64) -> Viewport {
    Viewport {
        x: -pan_x / zoom - padding,
        y: -pan_y / zoom - padding,
        width: canvas.width / zoom + 2.0 * padding,
        height: canvas.height / zoom + 2.0 * padding,
    }
}

/// [`compute_viewport`] for a camera.
#[must_use]
pub fn camera_viewport(camera: &Camera, canvas: Size, padding: f64) -> Viewport {
    compute_viewport(canvas, camera.pan_x, camera.pan_y, camera.zoom, padding)
}

/// Boxes whose rectangle intersects `viewport`, in input order.
#[must_use]
pub fn filter<'a>(boxes: &'a [AnnotationBox], viewport: &Viewport) -> Vec<&'a AnnotationBox> {
    boxes.iter().filter(|b| b.rect().intersects(viewport)).collect()
}

/// Culling statistics for `visible` out of `total` boxes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn stats(total: usize, visible: usize) -> ViewportStats {
    let culled = total.saturating_sub(visible);
    let optimization_ratio = if total == 0 { 0.0 } else { culled as f64 / total as f64 };
    let estimated_speedup = if total == 0 || visible == 0 { 1.0 } else { total as f64 / visible as f64 };
    ViewportStats { total_boxes: total, visible_boxes: visible, culled_boxes: culled, optimization_ratio, estimated_speedup }
}
