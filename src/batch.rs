//! Batched box rendering.
//!
//! Boxes are grouped by their effective stroke style before any draw call is
//! issued, so `strokeStyle`, `lineWidth` and `globalAlpha` are assigned once
//! per group rather than once per box. Within a group boxes keep their input
//! order; groups are drawn in order of first appearance. Where boxes of
//! different styles overlap, the later group is drawn on top.

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;

use std::collections::HashMap;

use serde::Deserialize;

use crate::boxes::{AnnotationBox, BoxId};
use crate::surface::{DrawSurface, RenderError};

/// Fallback class colours, indexed by the label's position in the label set.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#FF3838", "#FF9D97", "#FF701F", "#FFB21D", "#CFD231", "#48F90A", "#92CC17", "#3DDB86", "#1A9334", "#00D4BB",
];

/// Caption font size in DOM pixels.
const LABEL_FONT_PX: f64 = 12.0;

/// Gap between a box's top edge and its caption baseline, in DOM pixels.
const LABEL_OFFSET_PX: f64 = 4.0;

/// Host-configurable appearance of boxes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Stroke colour for labels outside the label set.
    pub default_color: String,
    /// Per-label colour overrides.
    pub label_colors: HashMap<String, String>,
    /// Stroke width in DOM pixels; constant on screen at any zoom.
    pub line_width: f64,
    /// Stroke opacity, `0..=1`.
    pub opacity: f64,
    /// Stroke colour of the selected box.
    pub selected_color: String,
    /// Stroke width of the selected box, in DOM pixels.
    pub selected_line_width: f64,
    /// Draw the class label above each box.
    pub show_labels: bool,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            default_color: "#00FF00".to_owned(),
            label_colors: HashMap::new(),
            line_width: 2.0,
            opacity: 1.0,
            selected_color: "#1E90FF".to_owned(),
            selected_line_width: 3.0,
            show_labels: true,
        }
    }
}

/// The state a group shares: everything that costs a context assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleKey {
    pub color: String,
    /// Logical units (already divided by zoom).
    pub line_width: f64,
    pub opacity: f64,
}

impl StyleKey {
    fn hash_key(&self) -> (String, u64, u64) {
        (self.color.clone(), self.line_width.to_bits(), self.opacity.to_bits())
    }
}

/// Resolves the style of each box for one frame.
#[derive(Debug, Clone, Copy)]
pub struct BoxStyler<'a> {
    pub options: &'a StyleOptions,
    pub labels: &'a [String],
    pub selected: Option<BoxId>,
    pub zoom: f64,
}

impl BoxStyler<'_> {
    /// Colour for a label: explicit override, then palette slot, then default.
    #[must_use]
    pub fn color_for(&self, label: &str) -> &str {
        if let Some(c) = self.options.label_colors.get(label) {
            return c;
        }
        match self.labels.iter().position(|l| l == label) {
            Some(idx) => DEFAULT_PALETTE[idx % DEFAULT_PALETTE.len()],
            None => &self.options.default_color,
        }
    }

    #[must_use]
    pub fn style_for(&self, b: &AnnotationBox) -> StyleKey {
        if self.selected == Some(b.id) {
            return StyleKey {
                color: self.options.selected_color.clone(),
                line_width: self.options.selected_line_width / self.zoom,
                opacity: 1.0,
            };
        }
        StyleKey {
            color: self.color_for(&b.label).to_owned(),
            line_width: self.options.line_width / self.zoom,
            opacity: self.options.opacity,
        }
    }
}

/// Work done by one [`batch_draw_boxes`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    pub boxes: usize,
    pub groups: usize,
    /// Context state assignments issued (stroke, width, alpha, fill, font).
    pub state_changes: usize,
}

/// Draw `boxes` grouped by style.
///
/// # Errors
///
/// Returns `Err` if drawing a caption fails.
pub fn batch_draw_boxes<S: DrawSurface + ?Sized>(
    surface: &mut S,
    boxes: &[&AnnotationBox],
    styler: &BoxStyler<'_>,
) -> Result<BatchStats, RenderError> {
    let groups = group_by_style(boxes, styler);
    let mut stats = BatchStats { boxes: boxes.len(), groups: groups.len(), state_changes: 0 };
    let mut current: Option<StyleKey> = None;

    if styler.options.show_labels && !boxes.is_empty() {
        surface.set_font(&format!("{}px sans-serif", LABEL_FONT_PX / styler.zoom));
        stats.state_changes += 1;
    }

    for (style, members) in &groups {
        stats.state_changes += apply_style(surface, current.as_ref(), style);
        current = Some(style.clone());

        for b in members {
            let r = b.rect();
            surface.stroke_rect(r.x, r.y, r.width, r.height);
        }

        if styler.options.show_labels {
            surface.set_fill_style(&style.color);
            stats.state_changes += 1;
            let lift = LABEL_OFFSET_PX / styler.zoom;
            for b in members {
                if b.label.is_empty() {
                    continue;
                }
                let r = b.rect();
                surface.fill_text(&b.label, r.x, r.y - lift)?;
            }
        }
    }

    Ok(stats)
}

/// Partition boxes into style groups, in first-appearance order.
#[must_use]
pub fn group_by_style<'a>(boxes: &[&'a AnnotationBox], styler: &BoxStyler<'_>) -> Vec<(StyleKey, Vec<&'a AnnotationBox>)> {
    let mut index: HashMap<(String, u64, u64), usize> = HashMap::new();
    let mut groups: Vec<(StyleKey, Vec<&'a AnnotationBox>)> = Vec::new();
    for &b in boxes {
        let style = styler.style_for(b);
        let slot = *index.entry(style.hash_key()).or_insert_with(|| {
            groups.push((style, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(b);
    }
    groups
}

/// Assign only the properties that differ from `current`. Returns the number of assignments.
fn apply_style<S: DrawSurface + ?Sized>(surface: &mut S, current: Option<&StyleKey>, next: &StyleKey) -> usize {
    let mut changes = 0;
    if current.is_none_or(|c| c.color != next.color) {
        surface.set_stroke_style(&next.color);
        changes += 1;
    }
    if current.is_none_or(|c| c.line_width.to_bits() != next.line_width.to_bits()) {
        surface.set_line_width(next.line_width);
        changes += 1;
    }
    if current.is_none_or(|c| c.opacity.to_bits() != next.opacity.to_bits()) {
        surface.set_global_alpha(next.opacity);
        changes += 1;
    }
    changes
}
