//! Shape-kind strategies plugged into the generic editor.

use crate::shapes::{Lane, ZoneShape};
use kurbo::Point;
use std::fmt;

/// How much of the surface needs repainting after an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Redraw {
    #[default]
    None,
    /// Only the in-progress overlay changed.
    Overlay,
    /// Committed geometry or selection changed.
    Full,
}

impl Redraw {
    /// Combine two hints, keeping the larger one.
    pub fn merge(self, other: Redraw) -> Redraw {
        self.max(other)
    }

    pub fn is_needed(self) -> bool {
        self != Redraw::None
    }
}

/// Image-space thresholds handed to a kind while it builds a draft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraftContext {
    pub min_rect_size: f64,
    pub close_tolerance: f64,
}

/// Result of feeding a pointer event to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftStep<S> {
    Continue,
    Commit(S),
    Discard,
}

/// In-progress geometry, for overlay rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Outline {
        points: Vec<Point>,
        /// Draw the closing edge back to the first point.
        closed: bool,
        /// Rubber-band end following the pointer.
        cursor: Option<Point>,
        /// Pointer is close enough to the first point to close the shape.
        near_first: bool,
    },
    Lane {
        zone: usize,
        lane: Lane,
    },
}

/// Drawing strategy for one zone shape.
///
/// Rectangles are drawn by dragging corners; polygons by adding vertices
/// click by click. Everything else (selection, dragging, lanes, history) is
/// shared by [`ZoneEditor`](super::ZoneEditor).
pub trait ZoneKind: fmt::Debug + Sized + 'static {
    type Shape: ZoneShape;
    type Draft: Clone + fmt::Debug;

    /// Human-readable name for logs.
    const LABEL: &'static str;

    /// Dragging a zone body moves the zone (otherwise it only selects it).
    const BODY_DRAG_MOVES: bool;

    /// Start a draft at the first pointer-down on empty space.
    fn begin(point: Point) -> Self::Draft;

    /// Pointer-down while a draft is in progress.
    fn press(draft: &mut Self::Draft, point: Point, ctx: &DraftContext) -> DraftStep<Self::Shape>;

    /// Pointer-move while a draft is in progress.
    fn drag(draft: &mut Self::Draft, point: Point, ctx: &DraftContext) -> Redraw;

    /// Pointer-up while a draft is in progress.
    fn release(draft: &mut Self::Draft, point: Point, ctx: &DraftContext)
        -> DraftStep<Self::Shape>;

    fn preview(draft: &Self::Draft) -> Preview;
}
