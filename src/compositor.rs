//! Offscreen double buffering.
//!
//! Frames are drawn on a hidden surface and copied to the visible surface in a
//! single blit, so the visible canvas only ever shows a complete frame.
//! [`LayeredCompositor`] keeps several named hidden surfaces and stacks them,
//! letting a static layer (the image) be drawn once and reused while only the
//! box layer is redrawn.

#[cfg(test)]
#[path = "compositor_test.rs"]
mod compositor_test;

use crate::surface::{Blit, DrawSurface, RenderError};

/// Outcome of a present call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presented {
    /// The new frame is on the visible surface.
    Blitted,
    /// The frame was drawn offscreen; the blit waits for the throttle interval.
    Deferred,
    /// Nothing happened: disposed, or a surface has no pixels.
    Skipped,
}

/// One hidden surface per visible surface.
pub struct OffscreenCompositor<V, H> {
    visible: V,
    hidden: H,
    last_blit_ms: Option<f64>,
    pending_blit: bool,
    disposed: bool,
}

impl<V, H> OffscreenCompositor<V, H>
where
    V: DrawSurface + Blit<H>,
    H: DrawSurface,
{
    /// Pair a visible surface with a hidden one, sizing the hidden surface to match.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the hidden surface cannot be resized.
    pub fn new(visible: V, mut hidden: H) -> Result<Self, RenderError> {
        let size = visible.size();
        if hidden.size() != size {
            hidden.resize(to_px(size.width), to_px(size.height))?;
        }
        Ok(Self { visible, hidden, last_blit_ms: None, pending_blit: false, disposed: false })
    }

    #[must_use]
    pub fn visible(&self) -> &V {
        &self.visible
    }

    #[must_use]
    pub fn hidden(&self) -> &H {
        &self.hidden
    }

    /// Whether a throttled frame is waiting to be blitted.
    #[must_use]
    pub fn has_pending_blit(&self) -> bool {
        self.pending_blit
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Draw a frame offscreen, then present it with one blit.
    ///
    /// If `draw` fails nothing is blitted and the previous frame stays visible.
    ///
    /// # Errors
    ///
    /// Returns the error from `draw`, or from clearing/blitting.
    pub fn render<F>(&mut self, draw: F) -> Result<Presented, RenderError>
    where
        F: FnOnce(&mut H) -> Result<(), RenderError>,
    {
        if !self.draw_hidden(draw)? {
            return Ok(Presented::Skipped);
        }
        self.present()?;
        Ok(Presented::Blitted)
    }

    /// Draw offscreen every time, but blit at most once per `interval_ms`.
    ///
    /// The interval is measured from the last throttled blit or [`flush`](Self::flush).
    /// Blits made by [`render`](Self::render) do not count, so the first
    /// interactive frame after a full frame is presented immediately.
    ///
    /// # Errors
    ///
    /// Returns the error from `draw`, or from clearing/blitting.
    pub fn render_with_throttle<F>(&mut self, draw: F, interval_ms: f64, now_ms: f64) -> Result<Presented, RenderError>
    where
        F: FnOnce(&mut H) -> Result<(), RenderError>,
    {
        if !self.draw_hidden(draw)? {
            return Ok(Presented::Skipped);
        }
        let due = self.last_blit_ms.is_none_or(|last| now_ms - last >= interval_ms);
        if !due {
            self.pending_blit = true;
            return Ok(Presented::Deferred);
        }
        self.present()?;
        self.last_blit_ms = Some(now_ms);
        Ok(Presented::Blitted)
    }

    /// Blit a deferred frame, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `Err` if clearing or blitting fails.
    pub fn flush(&mut self, now_ms: f64) -> Result<Presented, RenderError> {
        if self.disposed || !self.pending_blit {
            return Ok(Presented::Skipped);
        }
        self.present()?;
        self.last_blit_ms = Some(now_ms);
        Ok(Presented::Blitted)
    }

    /// Resize both surfaces. The hidden surface always tracks the visible one.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either surface cannot be resized.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.visible.resize(width, height)?;
        self.hidden.resize(width, height)?;
        self.pending_blit = false;
        Ok(())
    }

    /// Stop presenting. Every later call is a no-op.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.pending_blit = false;
    }

    /// Returns `false` when the frame was skipped.
    fn draw_hidden<F>(&mut self, draw: F) -> Result<bool, RenderError>
    where
        F: FnOnce(&mut H) -> Result<(), RenderError>,
    {
        if self.disposed || self.hidden.is_empty() || self.visible.is_empty() {
            return Ok(false);
        }
        // Clearing the hidden surface discards any deferred frame with it.
        self.pending_blit = false;
        self.hidden.clear()?;
        draw(&mut self.hidden)?;
        Ok(true)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.visible.clear()?;
        self.visible.blit(&self.hidden)?;
        self.pending_blit = false;
        Ok(())
    }
}

// =============================================================
// Layers
// =============================================================

struct Layer<H> {
    name: String,
    surface: H,
    visible: bool,
}

/// Several named hidden surfaces stacked onto one visible surface.
pub struct LayeredCompositor<V, H> {
    visible: V,
    layers: Vec<Layer<H>>,
    /// Layer names, bottom first. Layers missing from the order are not composited.
    order: Vec<String>,
    disposed: bool,
}

impl<V, H> LayeredCompositor<V, H>
where
    V: DrawSurface + Blit<H>,
    H: DrawSurface,
{
    #[must_use]
    pub fn new(visible: V) -> Self {
        Self { visible, layers: Vec::new(), order: Vec::new(), disposed: false }
    }

    #[must_use]
    pub fn visible(&self) -> &V {
        &self.visible
    }

    /// Add (or replace) a layer on top of the current order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the surface cannot be sized to the visible surface.
    pub fn add_layer(&mut self, name: impl Into<String>, mut surface: H) -> Result<(), RenderError> {
        let name = name.into();
        let size = self.visible.size();
        if surface.size() != size {
            surface.resize(to_px(size.width), to_px(size.height))?;
        }
        if let Some(layer) = self.layers.iter_mut().find(|l| l.name == name) {
            layer.surface = surface;
            return Ok(());
        }
        self.layers.push(Layer { name: name.clone(), surface, visible: true });
        self.order.push(name);
        Ok(())
    }

    /// Remove a layer, returning its surface.
    pub fn remove_layer(&mut self, name: &str) -> Option<H> {
        self.order.retain(|n| n != name);
        let idx = self.layers.iter().position(|l| l.name == name)?;
        Some(self.layers.remove(idx).surface)
    }

    /// Names of all layers, in composite order.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Set the composite order, bottom first. Unknown names are ignored.
    pub fn set_order(&mut self, names: &[&str]) {
        self.order = names
            .iter()
            .filter(|n| self.layers.iter().any(|l| l.name == **n))
            .map(|n| (*n).to_owned())
            .collect();
    }

    /// Show or hide a layer without discarding its content.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownLayer`] if no such layer exists.
    pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> Result<(), RenderError> {
        let layer = self.layer_mut(name)?;
        layer.visible = visible;
        Ok(())
    }

    /// Clear a layer and redraw it. Does not composite.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownLayer`], or the error from `draw`.
    pub fn render_layer<F>(&mut self, name: &str, draw: F) -> Result<Presented, RenderError>
    where
        F: FnOnce(&mut H) -> Result<(), RenderError>,
    {
        if self.disposed {
            return Ok(Presented::Skipped);
        }
        let layer = self.layer_mut(name)?;
        if layer.surface.is_empty() {
            return Ok(Presented::Skipped);
        }
        layer.surface.clear()?;
        draw(&mut layer.surface)?;
        Ok(Presented::Deferred)
    }

    /// Clear the visible surface and blit every visible layer in order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if clearing or any blit fails.
    pub fn composite(&mut self) -> Result<Presented, RenderError> {
        if self.disposed || self.visible.is_empty() {
            return Ok(Presented::Skipped);
        }
        self.visible.clear()?;
        for name in &self.order {
            if let Some(layer) = self.layers.iter().find(|l| l.name == *name && l.visible) {
                self.visible.blit(&layer.surface)?;
            }
        }
        Ok(Presented::Blitted)
    }

    /// Resize the visible surface and every layer.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any surface cannot be resized.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.visible.resize(width, height)?;
        for layer in &mut self.layers {
            layer.surface.resize(width, height)?;
        }
        Ok(())
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    fn layer_mut(&mut self, name: &str) -> Result<&mut Layer<H>, RenderError> {
        self.layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| RenderError::UnknownLayer(name.to_owned()))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_px(v: f64) -> u32 {
    v.max(0.0).round() as u32
}
