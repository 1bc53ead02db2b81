//! ZoneKit Core Library
//!
//! Platform-agnostic zone and lane annotation engine: shapes, coordinate
//! mapping, hit-testing, undo history and the interactive editors.

pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod input;
pub mod mapper;
pub mod shapes;

pub use config::EditorConfig;
pub use editor::{
    DrawMode, LanePolicy, PolygonEditor, PolygonKind, Preview, RectKind, RectangleEditor, Redraw,
    ZoneEditor, ZoneKind,
};
pub use error::{EditorError, EditorResult};
pub use history::{ActionLock, History};
pub use input::{EditorCommand, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use mapper::CoordinateMapper;
pub use shapes::{Lane, Polygon, Rectangle, Zone, ZoneLane, ZoneShape};
