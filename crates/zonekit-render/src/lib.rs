//! ZoneKit Render Library
//!
//! Drawing-surface abstraction and the painter that rasterizes a zone editor
//! onto it.

mod painter;
mod style;
mod surface;
mod view;

#[cfg(test)]
mod recording;

pub use painter::paint_editor;
pub use style::{PaintStyle, SerializableColor};
pub use surface::{Surface, SurfaceError, SurfaceResult};
pub use view::EditorView;
