//! Drawing-surface abstraction.

use kurbo::{BezPath, Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Drawing context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("Draw failed: {0}")]
    Draw(String),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Something an editor can be painted onto.
///
/// All coordinates are screen (backing-store) pixels; the painter applies
/// the image-to-screen mapping before calling in. Implementations may hold a
/// bound source image that [`draw_image`](Surface::draw_image) blits.
pub trait Surface {
    /// Backing-store size in pixels.
    fn size(&self) -> Size;

    /// Resize the backing store. Implementations may discard their pixels.
    fn set_size(&mut self, size: Size);

    /// Wipe the whole surface, optionally filling it with `background`.
    fn clear(&mut self, background: Option<Color>);

    /// Draw the bound source image scaled into `dest`.
    fn draw_image(&mut self, dest: Rect) -> SurfaceResult<()>;

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) -> SurfaceResult<()>;

    fn fill_path(&mut self, path: &BezPath, color: Color) -> SurfaceResult<()>;
}
