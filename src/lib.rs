//! Interactive bounding-box annotation canvas.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! box-labelling surface used to build object-detection training data and to
//! pick crop regions: translating pointer events into box edits in image
//! coordinates, and drawing many boxes smoothly through a scheduled, culled,
//! batched and double-buffered render path. The host application supplies
//! the image, the label set and any saved boxes, and receives the finished
//! boxes through [`detection::export_boxes`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | One editor + render pipeline per mounted canvas |
//! | [`editor`] | Box list ownership and the pointer gesture state machine |
//! | [`input`] | Buttons, keys, and the [`input::EditState`] machine |
//! | [`hit`] | Corner / edge / body hit-testing |
//! | [`boxes`] | Box type, patches, and the ordered store |
//! | [`camera`] | DOM vs. logical coordinates and pan/zoom |
//! | [`geom`] | Pure box geometry |
//! | [`detection`] | Pixel / YOLO-normalized exchange format |
//! | [`viewport`] | Visible-area computation and culling |
//! | [`scheduler`] | Coalescing, priority-aware frame scheduler |
//! | [`batch`] | Style-grouped box drawing |
//! | [`compositor`] | Offscreen double buffering and layers |
//! | [`pipeline`] | Schedule → cull → draw → blit |
//! | [`surface`] | Drawing capability traits and a recording surface |
//! | [`web`] | `web-sys` surfaces and mounting |
//! | [`config`] | Host configuration |
//! | [`consts`] | Shared numeric constants (thresholds, minimum sizes, etc.) |

pub mod batch;
pub mod boxes;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod consts;
pub mod detection;
pub mod editor;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod input;
pub mod pipeline;
pub mod scheduler;
pub mod surface;
pub mod viewport;
pub mod web;
