//! Drawing surfaces: the capability interface every renderer draws through.
//!
//! [`DrawSurface`] is the subset of the 2D canvas API the engine needs.
//! [`Blit`] copies one surface's pixels onto another in a single call, which
//! is what makes double buffering atomic. Browser implementations live in
//! [`crate::web`]; [`RecordingSurface`] logs commands instead of rasterizing
//! and backs headless hosts and tests.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::Camera;
use crate::geom::Size;

/// Error raised while drawing or presenting a frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// A 2D context call threw.
    #[error("canvas call failed: {0}")]
    Surface(String),
    /// A scheduled render task panicked.
    #[error("render task panicked: {0}")]
    TaskPanicked(String),
    /// A layered compositor was asked for a layer it does not have.
    #[error("no layer named {0:?}")]
    UnknownLayer(String),
}

/// The 2D drawing operations used by the renderers.
///
/// Coordinates passed to the rect/text calls are interpreted under the
/// current transform: identity after [`DrawSurface::clear`] or
/// [`DrawSurface::reset_transform`], logical space after
/// [`DrawSurface::set_camera`].
pub trait DrawSurface {
    /// Backing size in pixels.
    fn size(&self) -> Size;

    /// Change the backing size. Discards current content.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backing store cannot be resized.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Clear every pixel and reset the transform to identity.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the underlying context rejects the transform reset.
    fn clear(&mut self) -> Result<(), RenderError>;

    /// Map logical coordinates to surface pixels using the camera.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the underlying context rejects the transform.
    fn set_camera(&mut self, camera: &Camera) -> Result<(), RenderError>;

    /// Return to the identity transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the underlying context rejects the transform.
    fn reset_transform(&mut self) -> Result<(), RenderError>;

    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font(&mut self, font: &str);

    /// Set the dash pattern; an empty slice draws solid lines.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the underlying context rejects the pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError>;

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw text with its baseline-left at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the underlying context throws.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError>;

    /// Returns `true` if the surface has no pixels to draw into.
    fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

/// Copy the full content of `Src` onto this surface at the origin, in one call.
pub trait Blit<Src: ?Sized> {
    /// # Errors
    ///
    /// Returns `Err` if the underlying `drawImage` call throws.
    fn blit(&mut self, src: &Src) -> Result<(), RenderError>;
}

// =============================================================
// Recording surface
// =============================================================

/// One operation captured by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Resize { width: u32, height: u32 },
    SetCamera { zoom: f64, pan_x: f64, pan_y: f64 },
    ResetTransform,
    StrokeStyle(String),
    FillStyle(String),
    LineWidth(f64),
    GlobalAlpha(f64),
    Font(String),
    LineDash(Vec<f64>),
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    FillText { text: String, x: f64, y: f64 },
    /// Content of the named surface copied onto this one.
    Blit { source: String },
}

impl DrawCommand {
    /// Returns `true` for commands that put pixels on the surface.
    #[must_use]
    pub fn is_paint(&self) -> bool {
        matches!(self, Self::StrokeRect { .. } | Self::FillRect { .. } | Self::FillText { .. } | Self::Blit { .. })
    }
}

/// A command tagged with the surface that received it.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub surface: String,
    pub command: DrawCommand,
}

/// Ordered log shared by recording surfaces, so cross-surface ordering can be checked.
pub type Journal = Rc<RefCell<Vec<JournalEntry>>>;

/// A surface that records commands instead of drawing.
///
/// Alongside the journal it tracks `frame`: the paint commands currently
/// "visible" on the surface, i.e. everything since the last clear, with
/// blitted surfaces contributing their own frame contents.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    name: String,
    width: u32,
    height: u32,
    journal: Journal,
    frame: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// A surface with its own journal.
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::with_journal(name, width, height, &Journal::default())
    }

    /// A surface that writes into an existing journal.
    #[must_use]
    pub fn with_journal(name: impl Into<String>, width: u32, height: u32, journal: &Journal) -> Self {
        Self { name: name.into(), width, height, journal: Rc::clone(journal), frame: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared journal.
    #[must_use]
    pub fn journal(&self) -> Journal {
        Rc::clone(&self.journal)
    }

    /// Every command this surface received, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.journal
            .borrow()
            .iter()
            .filter(|e| e.surface == self.name)
            .map(|e| e.command.clone())
            .collect()
    }

    /// Paint commands currently showing on this surface.
    #[must_use]
    pub fn frame(&self) -> &[DrawCommand] {
        &self.frame
    }

    fn record(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Clear | DrawCommand::Resize { .. } => self.frame.clear(),
            ref c if c.is_paint() => self.frame.push(c.clone()),
            _ => {}
        }
        self.journal
            .borrow_mut()
            .push(JournalEntry { surface: self.name.clone(), command });
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.width = width;
        self.height = height;
        self.record(DrawCommand::Resize { width, height });
        Ok(())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.record(DrawCommand::Clear);
        Ok(())
    }

    fn set_camera(&mut self, camera: &Camera) -> Result<(), RenderError> {
        self.record(DrawCommand::SetCamera { zoom: camera.zoom, pan_x: camera.pan_x, pan_y: camera.pan_y });
        Ok(())
    }

    fn reset_transform(&mut self) -> Result<(), RenderError> {
        self.record(DrawCommand::ResetTransform);
        Ok(())
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.record(DrawCommand::StrokeStyle(color.to_owned()));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.record(DrawCommand::FillStyle(color.to_owned()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.record(DrawCommand::LineWidth(width));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.record(DrawCommand::GlobalAlpha(alpha));
    }

    fn set_font(&mut self, font: &str) {
        self.record(DrawCommand::Font(font.to_owned()));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
        self.record(DrawCommand::LineDash(segments.to_vec()));
        Ok(())
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(DrawCommand::StrokeRect { x, y, width, height });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(DrawCommand::FillRect { x, y, width, height });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError> {
        self.record(DrawCommand::FillText { text: text.to_owned(), x, y });
        Ok(())
    }
}

impl Blit<RecordingSurface> for RecordingSurface {
    fn blit(&mut self, src: &RecordingSurface) -> Result<(), RenderError> {
        self.journal
            .borrow_mut()
            .push(JournalEntry { surface: self.name.clone(), command: DrawCommand::Blit { source: src.name.clone() } });
        self.frame.extend(src.frame.iter().cloned());
        Ok(())
    }
}
