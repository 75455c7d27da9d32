//! The optimized render path: schedule → cull → draw offscreen → blit.
//!
//! A render request only records *that* a frame is wanted. The frame itself
//! is produced on the next scheduler tick from whatever the scene looks like
//! at that moment, so a burst of pointer events costs one frame.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use crate::batch::{self, BatchStats, BoxStyler, StyleOptions};
use crate::boxes::{AnnotationBox, BoxId};
use crate::camera::Camera;
use crate::compositor::{OffscreenCompositor, Presented};
use crate::config::PipelineConfig;
use crate::consts::{DRAFT_DASH_PX, HANDLE_HALF_PX};
use crate::hit::{Corner, Edge};
use crate::scheduler::{Priority, RenderScheduler, Tick};
use crate::surface::{Blit, DrawSurface, RenderError};
use crate::viewport::{self, ViewportStats};

/// How a requested frame is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Blit as soon as the frame is drawn.
    Full,
    /// Draw offscreen every time, blit at most once per throttle interval.
    Interactive,
}

/// Draws the static background (normally the image) in logical coordinates.
pub type Backdrop<H> = dyn Fn(&mut H) -> Result<(), RenderError>;

/// Read-only view of everything a frame needs.
pub struct Scene<'a, H> {
    pub boxes: &'a [AnnotationBox],
    /// The box being drawn, not yet committed.
    pub draft: Option<&'a AnnotationBox>,
    pub selected: Option<BoxId>,
    pub labels: &'a [String],
    pub camera: Camera,
    pub style: &'a StyleOptions,
    pub backdrop: Option<&'a Backdrop<H>>,
}

/// What the last executed frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub viewport: ViewportStats,
    pub batch: BatchStats,
    pub presented: Presented,
}

/// Scheduler, compositor and diagnostics for one canvas.
pub struct RenderPipeline<V, H> {
    scheduler: RenderScheduler<RenderKind>,
    compositor: OffscreenCompositor<V, H>,
    config: PipelineConfig,
    last_frame: Option<FrameReport>,
}

impl<V, H> RenderPipeline<V, H>
where
    V: DrawSurface + Blit<H>,
    H: DrawSurface,
{
    #[must_use]
    pub fn new(compositor: OffscreenCompositor<V, H>, config: PipelineConfig) -> Self {
        Self { scheduler: RenderScheduler::new(config.fps), compositor, config, last_frame: None }
    }

    /// Ask for a frame. Coalesces with any pending request of the same priority.
    pub fn request_render(&mut self, kind: RenderKind, priority: Priority) -> bool {
        self.scheduler.schedule(kind, priority)
    }

    /// Produce the highest-priority pending frame if the frame gate allows.
    ///
    /// With nothing pending, presents any frame a throttled render left offscreen.
    pub fn tick(&mut self, now_ms: f64, scene: &Scene<'_, H>) -> Tick {
        let Self { scheduler, compositor, config, last_frame } = self;
        let tick = scheduler.tick_with(now_ms, |kind| {
            let report = draw_frame(compositor, config, scene, kind, now_ms)?;
            *last_frame = Some(report);
            Ok(())
        });
        if tick == Tick::Idle && compositor.has_pending_blit() {
            if let Err(e) = compositor.flush(now_ms) {
                tracing::error!(error = %e, "deferred blit failed");
            }
        }
        tick
    }

    /// Request and immediately try to produce a frame.
    pub fn optimized_render(&mut self, scene: &Scene<'_, H>, kind: RenderKind, priority: Priority, now_ms: f64) -> Tick {
        self.request_render(kind, priority);
        self.tick(now_ms, scene)
    }

    /// Diagnostics from the most recent frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<FrameReport> {
        self.last_frame
    }

    #[must_use]
    pub fn stats(&self) -> Option<ViewportStats> {
        self.last_frame.map(|f| f.viewport)
    }

    #[must_use]
    pub fn scheduler(&self) -> &RenderScheduler<RenderKind> {
        &self.scheduler
    }

    pub fn set_error_hook(&mut self, hook: impl FnMut(Priority, &RenderError) + 'static) {
        self.scheduler.set_error_hook(hook);
    }

    #[must_use]
    pub fn compositor(&self) -> &OffscreenCompositor<V, H> {
        &self.compositor
    }

    /// Resize both surfaces.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a surface cannot be resized.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.compositor.resize(width, height)
    }

    /// Drop pending requests.
    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    /// Stop all further work.
    pub fn dispose(&mut self) {
        self.scheduler.dispose();
        self.compositor.dispose();
    }
}

fn draw_frame<V, H>(
    compositor: &mut OffscreenCompositor<V, H>,
    config: &PipelineConfig,
    scene: &Scene<'_, H>,
    kind: RenderKind,
    now_ms: f64,
) -> Result<FrameReport, RenderError>
where
    V: DrawSurface + Blit<H>,
    H: DrawSurface,
{
    let canvas = compositor.visible().size();
    let vp = viewport::camera_viewport(&scene.camera, canvas, config.viewport_padding);
    let visible = viewport::filter(scene.boxes, &vp);
    let stats = viewport::stats(scene.boxes.len(), visible.len());
    tracing::debug!(total = stats.total_boxes, visible = stats.visible_boxes, "viewport culled");

    let zoom = scene.camera.zoom;
    let styler = BoxStyler { options: scene.style, labels: scene.labels, selected: scene.selected, zoom };
    let selected = scene
        .selected
        .and_then(|id| visible.iter().copied().find(|b| b.id == id));
    let mut batch_stats = BatchStats::default();

    let draw = |surface: &mut H| -> Result<(), RenderError> {
        surface.set_camera(&scene.camera)?;
        if let Some(backdrop) = scene.backdrop {
            backdrop(surface)?;
        }
        batch_stats = batch::batch_draw_boxes(surface, &visible, &styler)?;
        surface.set_global_alpha(1.0);
        if let Some(draft) = scene.draft {
            draw_draft(surface, draft, &styler)?;
        }
        if let Some(sel) = selected {
            draw_handles(surface, sel, zoom, &scene.style.selected_color);
        }
        surface.reset_transform()
    };

    let presented = match kind {
        RenderKind::Full => compositor.render(draw)?,
        RenderKind::Interactive => compositor.render_with_throttle(draw, config.interactive_throttle_ms, now_ms)?,
    };
    Ok(FrameReport { viewport: stats, batch: batch_stats, presented })
}

/// Dashed outline for the box being drawn.
fn draw_draft<H: DrawSurface>(surface: &mut H, draft: &AnnotationBox, styler: &BoxStyler<'_>) -> Result<(), RenderError> {
    let dash = DRAFT_DASH_PX / styler.zoom;
    let r = draft.rect();
    surface.set_stroke_style(styler.color_for(&draft.label));
    surface.set_line_width(styler.options.line_width / styler.zoom);
    surface.set_line_dash(&[dash, dash])?;
    surface.stroke_rect(r.x, r.y, r.width, r.height);
    surface.set_line_dash(&[])
}

/// Corner and edge handles of the selected box, constant size on screen.
fn draw_handles<H: DrawSurface>(surface: &mut H, b: &AnnotationBox, zoom: f64, color: &str) {
    let half = HANDLE_HALF_PX / zoom;
    let r = b.rect();
    surface.set_fill_style(color);
    let corners = Corner::ALL.into_iter().map(|c| c.position(&r));
    let edges = Edge::ALL.into_iter().map(|e| e.midpoint(&r));
    for p in corners.chain(edges) {
        surface.fill_rect(p.x - half, p.y - half, half * 2.0, half * 2.0);
    }
}
