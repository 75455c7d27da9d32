//! Host-supplied configuration, parsed from JSON.
//!
//! Every field has a default from [`crate::consts`], so hosts only send what
//! they want to change:
//!
//! ```json
//! { "editor": { "multiple_boxes": false, "min_size": 50 }, "pipeline": { "fps": 30 } }
//! ```

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::batch::StyleOptions;
use crate::consts::{DEFAULT_FPS, EDGE_THRESHOLD_PX, INTERACTIVE_THROTTLE_MS, MIN_BOX_SIZE, VIEWPORT_PADDING};

/// Error returned by [`CanvasConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input is not valid JSON for this shape.
    #[error("invalid canvas config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field parsed but its value is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Box editor behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Handle hit slop in DOM pixels.
    pub edge_threshold_px: f64,
    /// Drafts smaller than this (logical px) on either axis are discarded.
    pub min_size: f64,
    /// Allow more than one box. When `false` drawing stops after the first commit.
    pub multiple_boxes: bool,
    /// Keep boxes inside the image bounds.
    pub clamp_to_image: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { edge_threshold_px: EDGE_THRESHOLD_PX, min_size: MIN_BOX_SIZE, multiple_boxes: true, clamp_to_image: true }
    }
}

/// Render pipeline tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum scheduled renders per second.
    pub fps: f64,
    /// Logical px drawn beyond each viewport edge.
    pub viewport_padding: f64,
    /// Minimum interval between visible blits during drags, in milliseconds.
    pub interactive_throttle_ms: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { fps: DEFAULT_FPS, viewport_padding: VIEWPORT_PADDING, interactive_throttle_ms: INTERACTIVE_THROTTLE_MS }
    }
}

/// Complete configuration for one mounted canvas.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub editor: EditorConfig,
    pub pipeline: PipelineConfig,
    pub style: StyleOptions,
}

impl CanvasConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("editor.edge_threshold_px", self.editor.edge_threshold_px)?;
        non_negative("editor.min_size", self.editor.min_size)?;
        positive("pipeline.fps", self.pipeline.fps)?;
        non_negative("pipeline.viewport_padding", self.pipeline.viewport_padding)?;
        non_negative("pipeline.interactive_throttle_ms", self.pipeline.interactive_throttle_ms)?;
        positive("style.line_width", self.style.line_width)?;
        positive("style.selected_line_width", self.style.selected_line_width)?;
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(ConfigError::Invalid { field: "style.opacity", reason: format!("{} is outside 0..=1", self.style.opacity) });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        return Ok(());
    }
    Err(ConfigError::Invalid { field, reason: format!("{v} must be finite and >= 0") })
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        return Ok(());
    }
    Err(ConfigError::Invalid { field, reason: format!("{v} must be finite and > 0") })
}
