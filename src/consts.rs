//! Shared numeric constants for the annotation canvas.

// ── Editing ─────────────────────────────────────────────────────

/// Minimum box width/height (logical px) for a drawn box to be committed.
pub const MIN_BOX_SIZE: f64 = 10.0;

/// Minimum box width/height (logical px) accepted when confirming a crop.
pub const MIN_CROP_SIZE: f64 = 50.0;

/// Hit slop around corner and edge handles, in DOM (screen) pixels.
pub const EDGE_THRESHOLD_PX: f64 = 15.0;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Zoom multiplier applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

// ── Rendering ───────────────────────────────────────────────────

/// Target frame rate for the render scheduler.
pub const DEFAULT_FPS: f64 = 60.0;

/// Extra logical px around the visible area whose boxes are still drawn.
pub const VIEWPORT_PADDING: f64 = 50.0;

/// Minimum interval between visible blits while dragging, in milliseconds.
pub const INTERACTIVE_THROTTLE_MS: f64 = 16.0;

/// Handle square half-size in DOM pixels.
pub const HANDLE_HALF_PX: f64 = 4.0;

/// Dash segment length for the in-progress box outline, in DOM pixels.
pub const DRAFT_DASH_PX: f64 = 6.0;

/// Values closer than this to an integer snap to it after scaling.
pub const SNAP_EPSILON: f64 = 1e-9;
