//! Browser surfaces backed by `web-sys` 2D contexts, and mounting.
//!
//! This module is the only place that touches the DOM. The hidden buffer is
//! an `OffscreenCanvas` where the browser has one and a detached `<canvas>`
//! element otherwise; [`HiddenSurface`] picks once, at construction.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, OffscreenCanvas, OffscreenCanvasRenderingContext2d,
};

use crate::camera::Camera;
use crate::config::CanvasConfig;
use crate::engine::Engine;
use crate::geom::{ImageSize, Size};
use crate::pipeline::Backdrop;
use crate::surface::{Blit, DrawSurface, RenderError};

impl From<JsValue> for RenderError {
    fn from(value: JsValue) -> Self {
        Self::Surface(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// The browser engine type.
pub type WebEngine = Engine<CanvasSurface, HiddenSurface>;

/// A `<canvas>` element and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap a canvas element. Returns `None` if no 2D context is available.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = match canvas.get_context("2d") {
            Ok(Some(obj)) => obj.dyn_into::<CanvasRenderingContext2d>(),
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = ?e, "canvas 2d context unavailable");
                return None;
            }
        };
        match ctx {
            Ok(ctx) => Some(Self { canvas, ctx }),
            Err(_) => None,
        }
    }

    /// A detached canvas of the given size, used as a hidden buffer fallback.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no document or the element cannot be created.
    pub fn detached(width: u32, height: u32) -> Result<Self, RenderError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| RenderError::Surface("no document".to_owned()))?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| RenderError::Surface("created element is not a canvas".to_owned()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        Self::new(canvas).ok_or_else(|| RenderError::Surface("detached canvas has no 2d context".to_owned()))
    }

    #[must_use]
    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Draw an image stretched to `size` logical pixels at the origin.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `drawImage` throws (e.g. the image is broken).
    pub fn draw_image(&mut self, image: &HtmlImageElement, size: ImageSize) -> Result<(), RenderError> {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, f64::from(size.width), f64::from(size.height))?;
        Ok(())
    }
}

/// An `OffscreenCanvas` and its 2D context.
pub struct OffscreenSurface {
    canvas: OffscreenCanvas,
    ctx: OffscreenCanvasRenderingContext2d,
}

impl OffscreenSurface {
    /// # Errors
    ///
    /// Returns `Err` where `OffscreenCanvas` is unsupported or has no 2D context.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let canvas = OffscreenCanvas::new(width, height)?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| RenderError::Surface("offscreen canvas has no 2d context".to_owned()))?
            .dyn_into::<OffscreenCanvasRenderingContext2d>()
            .map_err(|_| RenderError::Surface("unexpected offscreen context type".to_owned()))?;
        Ok(Self { canvas, ctx })
    }

    /// Draw an image stretched to `size` logical pixels at the origin.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `drawImage` throws.
    pub fn draw_image(&mut self, image: &HtmlImageElement, size: ImageSize) -> Result<(), RenderError> {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, f64::from(size.width), f64::from(size.height))?;
        Ok(())
    }
}

/// Both 2D context types expose the same drawing API under different names.
macro_rules! impl_draw_surface {
    ($surface:ty) => {
        impl DrawSurface for $surface {
            fn size(&self) -> Size {
                Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
            }

            fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
                Ok(())
            }

            fn clear(&mut self) -> Result<(), RenderError> {
                self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
                let size = self.size();
                self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
                Ok(())
            }

            fn set_camera(&mut self, camera: &Camera) -> Result<(), RenderError> {
                self.ctx
                    .set_transform(camera.zoom, 0.0, 0.0, camera.zoom, camera.pan_x, camera.pan_y)?;
                Ok(())
            }

            fn reset_transform(&mut self) -> Result<(), RenderError> {
                self.ctx.reset_transform()?;
                Ok(())
            }

            fn set_stroke_style(&mut self, color: &str) {
                self.ctx.set_stroke_style_str(color);
            }

            fn set_fill_style(&mut self, color: &str) {
                self.ctx.set_fill_style_str(color);
            }

            fn set_line_width(&mut self, width: f64) {
                self.ctx.set_line_width(width);
            }

            fn set_global_alpha(&mut self, alpha: f64) {
                self.ctx.set_global_alpha(alpha);
            }

            fn set_font(&mut self, font: &str) {
                self.ctx.set_font(font);
            }

            fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
                let dash: js_sys::Array = segments.iter().map(|s| JsValue::from_f64(*s)).collect();
                self.ctx.set_line_dash(&dash)?;
                Ok(())
            }

            fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
                self.ctx.stroke_rect(x, y, width, height);
            }

            fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
                self.ctx.fill_rect(x, y, width, height);
            }

            fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError> {
                self.ctx.fill_text(text, x, y)?;
                Ok(())
            }
        }
    };
}

impl_draw_surface!(CanvasSurface);
impl_draw_surface!(OffscreenSurface);

/// Hidden buffer: offscreen where supported, a detached canvas otherwise.
pub enum HiddenSurface {
    Offscreen(OffscreenSurface),
    Fallback(CanvasSurface),
}

impl HiddenSurface {
    /// # Errors
    ///
    /// Returns `Err` only if neither buffer kind can be created.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        match OffscreenSurface::new(width, height) {
            Ok(s) => Ok(Self::Offscreen(s)),
            Err(e) => {
                tracing::warn!(error = %e, "OffscreenCanvas unavailable, falling back to a detached canvas");
                CanvasSurface::detached(width, height).map(Self::Fallback)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `Err` if `drawImage` throws.
    pub fn draw_image(&mut self, image: &HtmlImageElement, size: ImageSize) -> Result<(), RenderError> {
        match self {
            Self::Offscreen(s) => s.draw_image(image, size),
            Self::Fallback(s) => s.draw_image(image, size),
        }
    }

    fn inner(&self) -> &dyn DrawSurface {
        match self {
            Self::Offscreen(s) => s,
            Self::Fallback(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn DrawSurface {
        match self {
            Self::Offscreen(s) => s,
            Self::Fallback(s) => s,
        }
    }
}

impl DrawSurface for HiddenSurface {
    fn size(&self) -> Size {
        self.inner().size()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.inner_mut().resize(width, height)
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.inner_mut().clear()
    }

    fn set_camera(&mut self, camera: &Camera) -> Result<(), RenderError> {
        self.inner_mut().set_camera(camera)
    }

    fn reset_transform(&mut self) -> Result<(), RenderError> {
        self.inner_mut().reset_transform()
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.inner_mut().set_stroke_style(color);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.inner_mut().set_fill_style(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.inner_mut().set_line_width(width);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.inner_mut().set_global_alpha(alpha);
    }

    fn set_font(&mut self, font: &str) {
        self.inner_mut().set_font(font);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), RenderError> {
        self.inner_mut().set_line_dash(segments)
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner_mut().stroke_rect(x, y, width, height);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner_mut().fill_rect(x, y, width, height);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), RenderError> {
        self.inner_mut().fill_text(text, x, y)
    }
}

impl Blit<HiddenSurface> for CanvasSurface {
    fn blit(&mut self, src: &HiddenSurface) -> Result<(), RenderError> {
        match src {
            HiddenSurface::Offscreen(s) => self.ctx.draw_image_with_offscreen_canvas(&s.canvas, 0.0, 0.0)?,
            HiddenSurface::Fallback(s) => self.ctx.draw_image_with_html_canvas_element(&s.canvas, 0.0, 0.0)?,
        }
        Ok(())
    }
}

impl Blit<CanvasSurface> for CanvasSurface {
    fn blit(&mut self, src: &CanvasSurface) -> Result<(), RenderError> {
        self.ctx.draw_image_with_html_canvas_element(&src.canvas, 0.0, 0.0)?;
        Ok(())
    }
}

/// Build a browser engine on a mounted `<canvas>`.
///
/// Returns `None` when the canvas has no 2D context or no hidden buffer can
/// be created; the host simply gets no drawing, never an exception.
#[must_use]
pub fn mount(canvas: HtmlCanvasElement, config: CanvasConfig) -> Option<WebEngine> {
    let visible = CanvasSurface::new(canvas)?;
    let size = visible.size();
    let hidden = match HiddenSurface::new(px(size.width), px(size.height)) {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!(error = %e, "no hidden buffer; canvas will not render");
            return None;
        }
    };
    match Engine::new(visible, hidden, config) {
        Ok(engine) => Some(engine),
        Err(e) => {
            tracing::warn!(error = %e, "engine construction failed");
            None
        }
    }
}

/// A backdrop that draws `image` at its natural logical size.
#[must_use]
pub fn image_backdrop(image: HtmlImageElement, size: ImageSize) -> Box<Backdrop<HiddenSurface>> {
    Box::new(move |surface: &mut HiddenSurface| surface.draw_image(&image, size))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn px(v: f64) -> u32 {
    v.max(0.0).round() as u32
}
