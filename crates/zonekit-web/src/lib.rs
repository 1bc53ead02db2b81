//! ZoneKit browser bindings
//!
//! Exposes the zone editors to JavaScript as `ZoneCanvas`, drawing onto an
//! `HtmlCanvasElement` through its 2D context.

mod canvas;
mod error;
mod listeners;
mod surface;

pub use canvas::{EditorFlavor, ZoneCanvas, init_logging};
pub use error::{HostError, HostResult};
pub use surface::CanvasSurface;
