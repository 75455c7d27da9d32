//! Detection-format boundary: the box representation exchanged with the
//! training pipeline and the surrounding application.
//!
//! Two coordinate flavours exist. `Pixel` is top-left plus size in whole image
//! pixels. `Normalized` is YOLO style: box center plus size, each divided by
//! the image dimension so every value lies in `0..=1`. Conversion is lossy
//! only through pixel rounding.

#[cfg(test)]
#[path = "detection_test.rs"]
mod detection_test;

use serde::{Deserialize, Serialize};

use crate::boxes::AnnotationBox;
use crate::camera::LogicalPoint;
use crate::geom::ImageSize;

/// Error returned by detection-format conversions.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnnotationError {
    /// The image has a zero width or height, so normalization is undefined.
    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },
    /// A box carries a label that is not in the label set.
    #[error("unknown label: {0}")]
    UnknownLabel(String),
    /// An imported box names a class id beyond the label set and has no class name.
    #[error("class id {class_id} out of range for {labels} labels")]
    ClassOutOfRange { class_id: usize, labels: usize },
}

/// Which coordinate flavour a [`DetectionBox`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordFormat {
    /// Top-left plus size, integer image pixels.
    #[default]
    Pixel,
    /// Center plus size, relative to the image dimensions.
    Normalized,
}

/// Center-relative normalized rectangle (YOLO layout).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRect {
    /// Center x divided by image width.
    pub x: f64,
    /// Center y divided by image height.
    pub y: f64,
    /// Width divided by image width.
    pub width: f64,
    /// Height divided by image height.
    pub height: f64,
}

/// A labelled box as handed to and received from collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBox {
    /// Index of `class_name` in the label set.
    pub class_id: usize,
    /// Human-readable class label.
    pub class_name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert a box to the center-relative normalized representation.
///
/// # Errors
///
/// Returns [`AnnotationError::InvalidImageSize`] if either image dimension is zero.
pub fn to_detection_format(b: &AnnotationBox, image: ImageSize) -> Result<NormalizedRect, AnnotationError> {
    check_image(image)?;
    let w = f64::from(image.width);
    let h = f64::from(image.height);
    let r = b.rect();
    Ok(NormalizedRect {
        x: (r.left() + r.width / 2.0) / w,
        y: (r.top() + r.height / 2.0) / h,
        width: r.width / w,
        height: r.height / h,
    })
}

/// Convert a normalized rectangle back into a pixel-rounded corner-pair box.
///
/// # Errors
///
/// Returns [`AnnotationError::InvalidImageSize`] if either image dimension is zero.
pub fn from_detection_format(
    det: &NormalizedRect,
    image: ImageSize,
    label: impl Into<String>,
) -> Result<AnnotationBox, AnnotationError> {
    check_image(image)?;
    let w = f64::from(image.width);
    let h = f64::from(image.height);
    let half_w = det.width / 2.0;
    let half_h = det.height / 2.0;
    let start = LogicalPoint::new(((det.x - half_w) * w).round(), ((det.y - half_h) * h).round());
    let end = LogicalPoint::new(((det.x + half_w) * w).round(), ((det.y + half_h) * h).round());
    Ok(AnnotationBox::new(start, end, label))
}

/// Export committed boxes for collaborators.
///
/// `labels` defines the class ids: a box's `class_id` is the position of its
/// label in `labels`.
///
/// # Errors
///
/// Returns [`AnnotationError::UnknownLabel`] for a box whose label is not in
/// `labels`, or [`AnnotationError::InvalidImageSize`] when normalizing against
/// a zero-sized image.
pub fn export_boxes(
    boxes: &[AnnotationBox],
    labels: &[String],
    image: ImageSize,
    format: CoordFormat,
) -> Result<Vec<DetectionBox>, AnnotationError> {
    boxes
        .iter()
        .map(|b| {
            let class_id = labels
                .iter()
                .position(|l| *l == b.label)
                .ok_or_else(|| AnnotationError::UnknownLabel(b.label.clone()))?;
            let (x, y, width, height) = match format {
                CoordFormat::Pixel => {
                    let r = b.rect();
                    (r.x.round(), r.y.round(), r.width.round(), r.height.round())
                }
                CoordFormat::Normalized => {
                    let n = to_detection_format(b, image)?;
                    (n.x, n.y, n.width, n.height)
                }
            };
            Ok(DetectionBox { class_id, class_name: b.label.clone(), x, y, width, height })
        })
        .collect()
}

/// Hydrate editor boxes from previously-saved detections.
///
/// The label comes from `class_name` when present, otherwise from
/// `labels[class_id]`.
///
/// # Errors
///
/// Returns [`AnnotationError::ClassOutOfRange`] for a nameless detection whose
/// class id has no label, or [`AnnotationError::InvalidImageSize`] when
/// denormalizing against a zero-sized image.
pub fn import_boxes(
    detections: &[DetectionBox],
    labels: &[String],
    image: ImageSize,
    format: CoordFormat,
) -> Result<Vec<AnnotationBox>, AnnotationError> {
    detections
        .iter()
        .map(|det| {
            let label = if det.class_name.is_empty() {
                labels
                    .get(det.class_id)
                    .cloned()
                    .ok_or(AnnotationError::ClassOutOfRange { class_id: det.class_id, labels: labels.len() })?
            } else {
                det.class_name.clone()
            };
            match format {
                CoordFormat::Pixel => Ok(AnnotationBox::from_xywh(det.x, det.y, det.width, det.height, label)),
                CoordFormat::Normalized => {
                    let n = NormalizedRect { x: det.x, y: det.y, width: det.width, height: det.height };
                    from_detection_format(&n, image, label)
                }
            }
        })
        .collect()
}

fn check_image(image: ImageSize) -> Result<(), AnnotationError> {
    if image.width == 0 || image.height == 0 {
        return Err(AnnotationError::InvalidImageSize { width: image.width, height: image.height });
    }
    Ok(())
}
