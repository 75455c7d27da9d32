//! Pure box geometry: rectangles, normalization, validity, and scaling.
//!
//! Nothing here touches editor or render state. Every function takes boxes by
//! reference and returns new values.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::boxes::AnnotationBox;
use crate::camera::LogicalPoint;
use crate::consts::SNAP_EPSILON;

/// Width and height of something, in the units of its context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero or negative.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Pixel dimensions of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The full image as a logical rectangle.
    #[must_use]
    pub fn rect(&self) -> LogicalRect {
        LogicalRect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Axis-aligned rectangle in logical space, stored as top-left plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: LogicalPoint, b: LogicalPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive AABB overlap test. Touching edges count as overlap.
    #[must_use]
    pub fn intersects(&self, other: &LogicalRect) -> bool {
        !(self.right() < other.left()
            || self.left() > other.right()
            || self.bottom() < other.top()
            || self.top() > other.bottom())
    }

    /// Returns `true` if `p` lies inside or on the border.
    #[must_use]
    pub fn contains(&self, p: LogicalPoint) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }
}

/// Reorder corners so `start` is top-left and `end` is bottom-right.
#[must_use]
pub fn normalize(b: &AnnotationBox) -> AnnotationBox {
    let r = b.rect();
    AnnotationBox {
        id: b.id,
        start: LogicalPoint::new(r.left(), r.top()),
        end: LogicalPoint::new(r.right(), r.bottom()),
        label: b.label.clone(),
    }
}

/// Absolute width and height of a box.
#[must_use]
pub fn size(b: &AnnotationBox) -> Size {
    Size::new((b.end.x - b.start.x).abs(), (b.end.y - b.start.y).abs())
}

/// Returns `false` if either dimension is smaller than `min_size`.
#[must_use]
pub fn is_valid(b: &AnnotationBox, min_size: f64) -> bool {
    let s = size(b);
    s.width >= min_size && s.height >= min_size
}

/// Multiply every coordinate by `factor`.
#[must_use]
pub fn scale(b: &AnnotationBox, factor: f64) -> AnnotationBox {
    map_coords(b, |v| v * factor)
}

/// Divide every coordinate by `factor`. The inverse of [`scale`].
#[must_use]
pub fn unscale(b: &AnnotationBox, factor: f64) -> AnnotationBox {
    map_coords(b, |v| v / factor)
}

/// Clip a box to the image bounds, keeping its corner orientation.
#[must_use]
pub fn clamp_to_image(b: &AnnotationBox, image: ImageSize) -> AnnotationBox {
    let w = f64::from(image.width);
    let h = f64::from(image.height);
    AnnotationBox {
        id: b.id,
        start: LogicalPoint::new(b.start.x.clamp(0.0, w), b.start.y.clamp(0.0, h)),
        end: LogicalPoint::new(b.end.x.clamp(0.0, w), b.end.y.clamp(0.0, h)),
        label: b.label.clone(),
    }
}

fn map_coords(b: &AnnotationBox, f: impl Fn(f64) -> f64) -> AnnotationBox {
    AnnotationBox {
        id: b.id,
        start: LogicalPoint::new(snap(f(b.start.x)), snap(f(b.start.y))),
        end: LogicalPoint::new(snap(f(b.end.x)), snap(f(b.end.y))),
        label: b.label.clone(),
    }
}

/// Snap floating-point noise back onto integers.
fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < SNAP_EPSILON { r } else { v }
}
