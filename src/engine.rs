use crate::batch::StyleOptions;
use crate::boxes::{AnnotationBox, BoxId, BoxPatch};
use crate::camera::{Camera, DomPoint};
use crate::compositor::OffscreenCompositor;
use crate::config::CanvasConfig;
use crate::detection::{AnnotationError, CoordFormat, DetectionBox};
use crate::editor::{Action, BoxEditor};
use crate::geom::ImageSize;
use crate::input::{Button, EditState, Key, WheelDelta};
use crate::pipeline::{Backdrop, RenderKind, RenderPipeline, Scene};
use crate::scheduler::{Priority, Tick};
use crate::surface::{Blit, DrawSurface, RenderError};
use crate::viewport::ViewportStats;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// One mounted annotation canvas: the editor plus its render pipeline.
///
/// Input handlers forward to the [`BoxEditor`] and turn its `RenderNeeded`
/// actions into scheduled frames. The host calls [`Engine::tick`] once per
/// animation frame.
pub struct Engine<V, H> {
    pub editor: BoxEditor,
    pipeline: RenderPipeline<V, H>,
    style: StyleOptions,
    backdrop: Option<Box<Backdrop<H>>>,
    disposed: bool,
}

impl<V, H> Engine<V, H>
where
    V: DrawSurface + Blit<H>,
    H: DrawSurface,
{
    /// Create an engine drawing onto `visible` through the `hidden` buffer.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the hidden surface cannot be sized to the visible one.
    pub fn new(visible: V, hidden: H, config: CanvasConfig) -> Result<Self, RenderError> {
        let compositor = OffscreenCompositor::new(visible, hidden)?;
        Ok(Self {
            editor: BoxEditor::new(config.editor),
            pipeline: RenderPipeline::new(compositor, config.pipeline),
            style: config.style,
            backdrop: None,
            disposed: false,
        })
    }

    // --- Collaborator inputs ---

    /// Set the image dimensions and how to draw it.
    pub fn set_image(&mut self, image: ImageSize, backdrop: Option<Box<Backdrop<H>>>) {
        self.editor.set_image(image);
        self.backdrop = backdrop;
        self.request(RenderKind::Full, Priority::High);
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.editor.set_labels(labels);
        self.request(RenderKind::Full, Priority::Low);
    }

    pub fn set_style(&mut self, style: StyleOptions) {
        self.style = style;
        self.request(RenderKind::Full, Priority::Low);
    }

    pub fn load_boxes(&mut self, boxes: Vec<AnnotationBox>) {
        self.editor.load_boxes(boxes);
        self.request(RenderKind::Full, Priority::High);
    }

    /// Hydrate from saved detections.
    ///
    /// # Errors
    ///
    /// Returns the conversion error; current boxes are kept.
    pub fn import(&mut self, detections: &[DetectionBox], format: CoordFormat) -> Result<(), AnnotationError> {
        self.editor.import(detections, format)?;
        self.request(RenderKind::Full, Priority::High);
        Ok(())
    }

    /// Export the committed boxes.
    ///
    /// # Errors
    ///
    /// See [`BoxEditor::export`].
    pub fn export(&self, format: CoordFormat) -> Result<Vec<DetectionBox>, AnnotationError> {
        self.editor.export(format)
    }

    // --- Edits ---

    pub fn update_box(&mut self, id: &BoxId, patch: BoxPatch) -> Vec<Action> {
        let actions = self.editor.update_box(id, patch);
        self.request_for(&actions, RenderKind::Full, Priority::Low);
        actions
    }

    pub fn delete_box(&mut self, id: &BoxId) -> Vec<Action> {
        let actions = self.editor.delete_box(id);
        self.request_for(&actions, RenderKind::Full, Priority::High);
        actions
    }

    pub fn clear_boxes(&mut self) -> Vec<Action> {
        let actions = self.editor.clear_boxes();
        self.request_for(&actions, RenderKind::Full, Priority::High);
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, dom_pt: DomPoint, button: Button) -> Vec<Action> {
        let actions = self.editor.on_pointer_down(dom_pt, button);
        self.request_for(&actions, RenderKind::Full, Priority::High);
        actions
    }

    pub fn on_pointer_move(&mut self, dom_pt: DomPoint) -> Vec<Action> {
        let actions = self.editor.on_pointer_move(dom_pt);
        self.request_for(&actions, RenderKind::Interactive, Priority::Normal);
        actions
    }

    pub fn on_pointer_up(&mut self, dom_pt: DomPoint, button: Button) -> Vec<Action> {
        let actions = self.editor.on_pointer_up(dom_pt, button);
        self.request_for(&actions, RenderKind::Full, Priority::High);
        actions
    }

    pub fn on_wheel(&mut self, dom_pt: DomPoint, delta: WheelDelta) -> Vec<Action> {
        let actions = self.editor.on_wheel(dom_pt, delta);
        self.request_for(&actions, RenderKind::Interactive, Priority::Normal);
        actions
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        let actions = self.editor.on_key_down(key);
        self.request_for(&actions, RenderKind::Full, Priority::High);
        actions
    }

    // --- Viewport ---

    /// Resize the canvas backing store.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface cannot be resized.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.pipeline.resize(width, height)?;
        self.request(RenderKind::Full, Priority::High);
        Ok(())
    }

    /// Replace the camera (e.g. fit-to-screen from the host). Zoom is clamped
    /// to the supported range.
    pub fn set_camera(&mut self, camera: Camera) {
        self.editor.camera = camera.sanitized();
        self.request(RenderKind::Full, Priority::High);
    }

    // --- Render ---

    /// Drive the pipeline. Call once per animation frame.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        if self.disposed {
            return Tick::Disposed;
        }
        let draft = match &self.editor.state {
            EditState::Drawing { draft } => Some(draft),
            _ => None,
        };
        let scene = Scene {
            boxes: self.editor.boxes(),
            draft,
            selected: self.editor.selection(),
            labels: self.editor.labels(),
            camera: self.editor.camera,
            style: &self.style,
            backdrop: self.backdrop.as_deref(),
        };
        self.pipeline.tick(now_ms, &scene)
    }

    pub fn set_error_hook(&mut self, hook: impl FnMut(Priority, &RenderError) + 'static) {
        self.pipeline.set_error_hook(hook);
    }

    /// Culling statistics from the last frame.
    #[must_use]
    pub fn stats(&self) -> Option<ViewportStats> {
        self.pipeline.stats()
    }

    #[must_use]
    pub fn pipeline(&self) -> &RenderPipeline<V, H> {
        &self.pipeline
    }

    /// Stop all scheduled and future rendering. Used on unmount.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.pipeline.dispose();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn request_for(&mut self, actions: &[Action], kind: RenderKind, priority: Priority) {
        if actions.iter().any(|a| matches!(a, Action::RenderNeeded)) {
            self.request(kind, priority);
        }
    }

    fn request(&mut self, kind: RenderKind, priority: Priority) {
        if !self.disposed {
            self.pipeline.request_render(kind, priority);
        }
    }
}
