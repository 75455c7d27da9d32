//! Coordinate spaces and the pan/zoom camera.
//!
//! Pointer events arrive in DOM pixels; every box lives in logical (source
//! image) pixels. The two spaces get distinct point types so a value can only
//! cross between them through a [`Camera`] conversion.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in DOM space: CSS pixels relative to the canvas element's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DomPoint {
    pub x: f64,
    pub y: f64,
}

impl DomPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in logical space: pixels of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

impl LogicalPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a logical delta.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// Camera state for pan/zoom over the image.
///
/// `pan_x` / `pan_y` are in DOM pixels.
/// `zoom` is a scale factor (1.0 = one image pixel per CSS pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a DOM point to logical coordinates.
    #[must_use]
    pub fn dom_to_logical(&self, dom: DomPoint) -> LogicalPoint {
        LogicalPoint {
            x: (dom.x - self.pan_x) / self.zoom,
            y: (dom.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a logical point to DOM coordinates.
    #[must_use]
    pub fn logical_to_dom(&self, logical: LogicalPoint) -> DomPoint {
        DomPoint {
            x: logical.x * self.zoom + self.pan_x,
            y: logical.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a DOM distance (pixels) to a logical distance.
    #[must_use]
    pub fn dom_dist_to_logical(&self, dom_dist: f64) -> f64 {
        dom_dist / self.zoom
    }

    /// Set the zoom factor, keeping the logical point under `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: DomPoint, zoom: f64) {
        let before = self.dom_to_logical(anchor);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = anchor.x - before.x * self.zoom;
        self.pan_y = anchor.y - before.y * self.zoom;
    }

    /// This camera with zoom clamped to `[MIN_ZOOM, MAX_ZOOM]` and non-finite
    /// values replaced by the defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let finite_or = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        let zoom = if self.zoom.is_nan() { 1.0 } else { self.zoom.clamp(MIN_ZOOM, MAX_ZOOM) };
        Self { pan_x: finite_or(self.pan_x, 0.0), pan_y: finite_or(self.pan_y, 0.0), zoom }
    }

    /// Pan by a DOM-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }
}
