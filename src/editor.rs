//! The interactive box editor: owns the box list and drives the gesture state machine.
//!
//! Pointer handlers take DOM-space points, convert them through the camera
//! immediately, and only ever store logical coordinates. Every handler returns
//! the [`Action`]s the host should react to (persisting a commit, changing the
//! cursor, scheduling a render).

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use crate::boxes::{AnnotationBox, BoxId, BoxPatch, BoxStore};
use crate::camera::{Camera, DomPoint};
use crate::config::EditorConfig;
use crate::consts::WHEEL_ZOOM_STEP;
use crate::detection::{self, AnnotationError, CoordFormat, DetectionBox};
use crate::geom::{self, ImageSize};
use crate::hit::{self, Corner, Edge, Hit, HitPart};
use crate::input::{Button, EditState, Key, WheelDelta};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A drawn box passed validation and joined the list.
    BoxCreated(AnnotationBox),
    /// A committed box changed; `patch` holds the new values.
    BoxUpdated { id: BoxId, patch: BoxPatch },
    BoxDeleted { id: BoxId },
    BoxesCleared,
    SelectionChanged(Option<BoxId>),
    SetCursor(String),
    RenderNeeded,
}

/// Editor state for one canvas.
pub struct BoxEditor {
    pub store: BoxStore,
    pub camera: Camera,
    pub state: EditState,
    config: EditorConfig,
    labels: Vec<String>,
    current_label: String,
    image: Option<ImageSize>,
    selected: Option<BoxId>,
    cursor: &'static str,
}

impl Default for BoxEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl BoxEditor {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: BoxStore::new(),
            camera: Camera::default(),
            state: EditState::Idle,
            config,
            labels: Vec::new(),
            current_label: String::new(),
            image: None,
            selected: None,
            cursor: hit::cursor_for(None),
        }
    }

    // --- Collaborator inputs ---

    /// Set the image being annotated. Boxes are clamped to it when enabled.
    pub fn set_image(&mut self, image: ImageSize) {
        self.image = Some(image);
    }

    /// Replace the label set. The current label falls back to the first label
    /// if it is no longer in the set.
    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
        if !self.labels.contains(&self.current_label) {
            self.current_label = self.labels.first().cloned().unwrap_or_default();
        }
    }

    /// Choose the label given to newly drawn boxes. Returns false for unknown labels.
    pub fn set_current_label(&mut self, label: &str) -> bool {
        if !self.labels.iter().any(|l| l == label) {
            return false;
        }
        label.clone_into(&mut self.current_label);
        true
    }

    /// Replace all boxes, dropping any gesture and selection.
    pub fn load_boxes(&mut self, boxes: Vec<AnnotationBox>) {
        self.state = EditState::Idle;
        self.selected = None;
        self.store.load(boxes);
    }

    /// Hydrate from saved detections.
    ///
    /// # Errors
    ///
    /// Returns the conversion error; the current boxes are kept in that case.
    pub fn import(&mut self, detections: &[DetectionBox], format: CoordFormat) -> Result<(), AnnotationError> {
        let image = self.image.unwrap_or(ImageSize::new(0, 0));
        let boxes = detection::import_boxes(detections, &self.labels, image, format)?;
        self.load_boxes(boxes);
        Ok(())
    }

    /// Export committed boxes for collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError::InvalidImageSize`] if no image is set and
    /// normalized output is requested, or [`AnnotationError::UnknownLabel`].
    pub fn export(&self, format: CoordFormat) -> Result<Vec<DetectionBox>, AnnotationError> {
        let image = self.image.unwrap_or(ImageSize::new(0, 0));
        detection::export_boxes(self.store.as_slice(), &self.labels, image, format)
    }

    // --- Queries ---

    #[must_use]
    pub fn boxes(&self) -> &[AnnotationBox] {
        self.store.as_slice()
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn current_label(&self) -> &str {
        &self.current_label
    }

    #[must_use]
    pub fn image(&self) -> Option<ImageSize> {
        self.image
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn selection(&self) -> Option<BoxId> {
        self.selected
    }

    /// The box being drawn, moved or resized, if any.
    #[must_use]
    pub fn active_box(&self) -> Option<&AnnotationBox> {
        match &self.state {
            EditState::Drawing { draft } => Some(draft),
            state => state.editing_id().and_then(|id| self.store.get(&id)),
        }
    }

    /// Whether a new box may be started on empty canvas.
    ///
    /// Drawing needs a current label; boxes without one could not be exported.
    #[must_use]
    pub fn can_draw(&self) -> bool {
        !self.current_label.is_empty() && (self.config.multiple_boxes || self.store.is_empty())
    }

    // --- External edits ---

    /// Patch a committed box without going through pointer events.
    pub fn update_box(&mut self, id: &BoxId, patch: BoxPatch) -> Vec<Action> {
        if patch.is_empty() || !self.store.apply_patch(id, &patch) {
            return Vec::new();
        }
        vec![Action::BoxUpdated { id: *id, patch }, Action::RenderNeeded]
    }

    /// Delete a committed box.
    pub fn delete_box(&mut self, id: &BoxId) -> Vec<Action> {
        if self.store.remove(id).is_none() {
            return Vec::new();
        }
        if self.state.editing_id() == Some(*id) {
            self.state = EditState::Idle;
        }
        let mut actions = vec![Action::BoxDeleted { id: *id }];
        if self.selected == Some(*id) {
            self.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        tracing::debug!(%id, remaining = self.store.len(), "box deleted");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove every box and return to idle.
    pub fn clear_boxes(&mut self) -> Vec<Action> {
        self.store.clear();
        self.state = EditState::Idle;
        self.selected = None;
        vec![Action::BoxesCleared, Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Abandon the current gesture: drafts are dropped, edited boxes restored.
    pub fn cancel_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.state) {
            EditState::Idle => Vec::new(),
            EditState::Drawing { .. } | EditState::Panning { .. } => vec![Action::RenderNeeded],
            EditState::Moving { original, .. }
            | EditState::ResizingCorner { original, .. }
            | EditState::ResizingEdge { original, .. } => {
                self.store.insert(original);
                vec![Action::RenderNeeded]
            }
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, dom_pt: DomPoint, button: Button) -> Vec<Action> {
        if self.state.is_active() {
            return Vec::new();
        }
        match button {
            Button::Secondary => Vec::new(),
            Button::Middle => {
                self.state = EditState::Panning { last: dom_pt };
                self.cursor = "grabbing";
                vec![Action::SetCursor(self.cursor.to_owned())]
            }
            Button::Primary => self.begin_primary(dom_pt),
        }
    }

    pub fn on_pointer_move(&mut self, dom_pt: DomPoint) -> Vec<Action> {
        let zoom = self.camera.zoom;
        match &mut self.state {
            EditState::Idle => self.update_hover(dom_pt),
            EditState::Drawing { draft } => {
                draft.end = self.camera.dom_to_logical(dom_pt);
                vec![Action::RenderNeeded]
            }
            EditState::Panning { last } => {
                let (dx, dy) = (dom_pt.x - last.x, dom_pt.y - last.y);
                *last = dom_pt;
                self.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            EditState::Moving { id, last, .. } => {
                let (dx, dy) = ((dom_pt.x - last.x) / zoom, (dom_pt.y - last.y) / zoom);
                *last = dom_pt;
                let id = *id;
                self.translate_box(&id, dx, dy);
                vec![Action::RenderNeeded]
            }
            EditState::ResizingCorner { id, corner, last, .. } => {
                let (dx, dy) = ((dom_pt.x - last.x) / zoom, (dom_pt.y - last.y) / zoom);
                *last = dom_pt;
                if let Some(b) = self.store.get_mut(id) {
                    resize_corner(b, *corner, dx, dy);
                }
                vec![Action::RenderNeeded]
            }
            EditState::ResizingEdge { id, edge, last, .. } => {
                let (dx, dy) = ((dom_pt.x - last.x) / zoom, (dom_pt.y - last.y) / zoom);
                *last = dom_pt;
                if let Some(b) = self.store.get_mut(id) {
                    resize_edge(b, *edge, dx, dy);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, dom_pt: DomPoint, _button: Button) -> Vec<Action> {
        match std::mem::take(&mut self.state) {
            EditState::Idle => Vec::new(),
            EditState::Panning { .. } => {
                let mut actions = self.update_hover(dom_pt);
                actions.push(Action::RenderNeeded);
                actions
            }
            EditState::Drawing { mut draft } => {
                draft.end = self.camera.dom_to_logical(dom_pt);
                self.commit_draft(draft)
            }
            EditState::Moving { id, original, .. }
            | EditState::ResizingCorner { id, original, .. }
            | EditState::ResizingEdge { id, original, .. } => self.finish_edit(&id, &original),
        }
    }

    /// Zoom about the pointer. Scrolling down zooms out.
    pub fn on_wheel(&mut self, dom_pt: DomPoint, delta: WheelDelta) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { WHEEL_ZOOM_STEP } else { 1.0 / WHEEL_ZOOM_STEP };
        let before = self.camera;
        self.camera.zoom_about(dom_pt, self.camera.zoom * factor);
        if self.camera == before {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    /// `Delete`/`Backspace` remove the selected box; `Escape` cancels the gesture.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => self.cancel_gesture(),
            "Delete" | "Backspace" if !self.state.is_active() => match self.selected {
                Some(id) => self.delete_box(&id),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    // --- Internals ---

    fn begin_primary(&mut self, dom_pt: DomPoint) -> Vec<Action> {
        let hit = hit::hit_test(dom_pt, &self.store, &self.camera, self.config.edge_threshold_px, self.selected);
        let mut actions = Vec::new();

        let Some(Hit { box_id, part }) = hit else {
            if self.selected.take().is_some() {
                actions.push(Action::SelectionChanged(None));
                actions.push(Action::RenderNeeded);
            }
            if self.can_draw() {
                let anchor = self.camera.dom_to_logical(dom_pt);
                let draft = AnnotationBox::new(anchor, anchor, self.current_label.clone());
                self.state = EditState::Drawing { draft };
                actions.push(Action::RenderNeeded);
            }
            return actions;
        };

        let Some(b) = self.store.get_mut(&box_id) else {
            return actions;
        };
        // Handles are defined on the normalized box.
        *b = geom::normalize(b);
        let original = b.clone();

        self.state = match part {
            HitPart::Body => EditState::Moving { id: box_id, last: dom_pt, original },
            HitPart::Corner(corner) => EditState::ResizingCorner { id: box_id, corner, last: dom_pt, original },
            HitPart::Edge(edge) => EditState::ResizingEdge { id: box_id, edge, last: dom_pt, original },
        };
        if self.selected != Some(box_id) {
            self.selected = Some(box_id);
            actions.push(Action::SelectionChanged(Some(box_id)));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn commit_draft(&mut self, draft: AnnotationBox) -> Vec<Action> {
        let mut b = geom::normalize(&draft);
        if let (true, Some(image)) = (self.config.clamp_to_image, self.image) {
            b = geom::clamp_to_image(&b, image);
        }
        if !geom::is_valid(&b, self.config.min_size) {
            let size = geom::size(&b);
            tracing::debug!(width = size.width, height = size.height, min = self.config.min_size, "draft discarded");
            return vec![Action::RenderNeeded];
        }
        tracing::debug!(id = %b.id, label = %b.label, "box committed");
        let id = b.id;
        self.store.insert(b.clone());
        self.selected = Some(id);
        vec![Action::BoxCreated(b), Action::SelectionChanged(Some(id)), Action::RenderNeeded]
    }

    fn finish_edit(&mut self, id: &BoxId, original: &AnnotationBox) -> Vec<Action> {
        let clamp = self.config.clamp_to_image;
        let min_size = self.config.min_size;
        let image = self.image;
        let Some(b) = self.store.get_mut(id) else {
            return vec![Action::RenderNeeded];
        };
        let mut done = geom::normalize(b);
        if let (true, Some(image)) = (clamp, image) {
            done = geom::clamp_to_image(&done, image);
        }
        if !geom::is_valid(&done, min_size) {
            let size = geom::size(&done);
            tracing::debug!(id = %id, width = size.width, height = size.height, "undersized edit reverted");
            *b = original.clone();
            return vec![Action::RenderNeeded];
        }
        *b = done.clone();
        if done.start == original.start && done.end == original.end {
            return vec![Action::RenderNeeded];
        }
        let patch = BoxPatch { start: Some(done.start), end: Some(done.end), label: None };
        vec![Action::BoxUpdated { id: *id, patch }, Action::RenderNeeded]
    }

    fn translate_box(&mut self, id: &BoxId, mut dx: f64, mut dy: f64) {
        let clamp = self.config.clamp_to_image;
        let image = self.image;
        let Some(b) = self.store.get_mut(id) else {
            return;
        };
        if let (true, Some(image)) = (clamp, image) {
            let r = b.rect();
            let bounds = image.rect();
            // Boxes larger than the image cannot be kept inside; move them freely.
            if r.width <= bounds.width && r.height <= bounds.height {
                dx = dx.clamp(bounds.left() - r.left(), bounds.right() - r.right());
                dy = dy.clamp(bounds.top() - r.top(), bounds.bottom() - r.bottom());
            }
        }
        b.start = b.start.offset(dx, dy);
        b.end = b.end.offset(dx, dy);
    }

    fn update_hover(&mut self, dom_pt: DomPoint) -> Vec<Action> {
        let part = hit::hit_test(dom_pt, &self.store, &self.camera, self.config.edge_threshold_px, self.selected)
            .map(|h| h.part);
        let cursor = match part {
            None if !self.can_draw() => "default",
            part => hit::cursor_for(part),
        };
        if cursor == self.cursor {
            return Vec::new();
        }
        self.cursor = cursor;
        vec![Action::SetCursor(cursor.to_owned())]
    }
}

/// Move one corner of a normalized box by a logical delta.
fn resize_corner(b: &mut AnnotationBox, corner: Corner, dx: f64, dy: f64) {
    match corner {
        Corner::Nw => {
            b.start.x += dx;
            b.start.y += dy;
        }
        Corner::Ne => {
            b.end.x += dx;
            b.start.y += dy;
        }
        Corner::Se => {
            b.end.x += dx;
            b.end.y += dy;
        }
        Corner::Sw => {
            b.start.x += dx;
            b.end.y += dy;
        }
    }
}

/// Move one edge of a normalized box by a logical delta.
fn resize_edge(b: &mut AnnotationBox, edge: Edge, dx: f64, dy: f64) {
    match edge {
        Edge::N => b.start.y += dy,
        Edge::S => b.end.y += dy,
        Edge::W => b.start.x += dx,
        Edge::E => b.end.x += dx,
    }
}
