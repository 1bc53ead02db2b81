//! Click-to-add-vertex drawing for polygon zones.

use super::kind::{DraftContext, DraftStep, Preview, Redraw, ZoneKind};
use super::{LanePolicy, ZoneEditor};
use crate::config::EditorConfig;
use crate::shapes::{MIN_POLYGON_VERTICES, Polygon};
use kurbo::Point;

/// Polygon being clicked out.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonDraft {
    pub vertices: Vec<Point>,
    /// Last pointer position, for the rubber-band edge.
    pub cursor: Option<Point>,
    /// Pointer is within closing distance of the first vertex.
    pub near_first: bool,
}

impl PolygonDraft {
    fn can_close_at(&self, point: Point, tolerance: f64) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
            && self
                .vertices
                .first()
                .is_some_and(|first| first.distance(point) <= tolerance)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonKind;

impl ZoneKind for PolygonKind {
    type Shape = Polygon;
    type Draft = PolygonDraft;

    const LABEL: &'static str = "polygon";
    const BODY_DRAG_MOVES: bool = false;

    fn begin(point: Point) -> PolygonDraft {
        PolygonDraft {
            vertices: vec![point],
            cursor: Some(point),
            near_first: false,
        }
    }

    fn press(draft: &mut PolygonDraft, point: Point, ctx: &DraftContext) -> DraftStep<Polygon> {
        // Closing takes priority over adding a vertex near the start.
        if draft.can_close_at(point, ctx.close_tolerance) {
            return DraftStep::Commit(Polygon::new(std::mem::take(&mut draft.vertices)));
        }
        draft.vertices.push(point);
        draft.cursor = Some(point);
        draft.near_first = false;
        DraftStep::Continue
    }

    fn drag(draft: &mut PolygonDraft, point: Point, ctx: &DraftContext) -> Redraw {
        draft.cursor = Some(point);
        draft.near_first = draft.can_close_at(point, ctx.close_tolerance);
        Redraw::Overlay
    }

    fn release(_draft: &mut PolygonDraft, _point: Point, _ctx: &DraftContext) -> DraftStep<Polygon> {
        DraftStep::Continue
    }

    fn preview(draft: &PolygonDraft) -> Preview {
        Preview::Outline {
            points: draft.vertices.clone(),
            closed: false,
            cursor: draft.cursor,
            near_first: draft.near_first,
        }
    }
}

impl ZoneEditor<PolygonKind> {
    /// Polygon editor without lanes.
    pub fn polygons(config: EditorConfig) -> Self {
        Self::new(config, None)
    }

    /// Polygon editor whose lanes stay inside their polygon.
    pub fn polygons_with_lanes(config: EditorConfig) -> Self {
        let policy = LanePolicy::contained(config.min_lane_length);
        Self::new(config, Some(policy))
    }
}
