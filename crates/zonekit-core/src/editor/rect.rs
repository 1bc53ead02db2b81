//! Drag-corners drawing for rectangle zones.

use super::kind::{DraftContext, DraftStep, Preview, Redraw, ZoneKind};
use super::{LanePolicy, ZoneEditor};
use crate::config::EditorConfig;
use crate::shapes::{Rectangle, ZoneShape};
use kurbo::Point;

/// Rectangle being dragged out; corners in any order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectDraft {
    pub anchor: Point,
    pub corner: Point,
}

impl RectDraft {
    fn rectangle(&self) -> Rectangle {
        Rectangle::from_corners(self.anchor, self.corner)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RectKind;

impl ZoneKind for RectKind {
    type Shape = Rectangle;
    type Draft = RectDraft;

    const LABEL: &'static str = "rectangle";
    const BODY_DRAG_MOVES: bool = true;

    fn begin(point: Point) -> RectDraft {
        RectDraft {
            anchor: point,
            corner: point,
        }
    }

    fn press(_draft: &mut RectDraft, _point: Point, _ctx: &DraftContext) -> DraftStep<Rectangle> {
        DraftStep::Continue
    }

    fn drag(draft: &mut RectDraft, point: Point, _ctx: &DraftContext) -> Redraw {
        draft.corner = point;
        Redraw::Overlay
    }

    fn release(draft: &mut RectDraft, point: Point, ctx: &DraftContext) -> DraftStep<Rectangle> {
        draft.corner = point;
        let rect = draft.rectangle();
        if rect.exceeds(ctx.min_rect_size) {
            DraftStep::Commit(rect)
        } else {
            DraftStep::Discard
        }
    }

    fn preview(draft: &RectDraft) -> Preview {
        Preview::Outline {
            points: draft.rectangle().vertices(),
            closed: true,
            cursor: None,
            near_first: false,
        }
    }
}

impl ZoneEditor<RectKind> {
    /// Rectangle editor without lanes.
    pub fn rectangles(config: EditorConfig) -> Self {
        Self::new(config, None)
    }

    /// Rectangle editor whose zones carry free-form lanes.
    pub fn rectangles_with_lanes(config: EditorConfig) -> Self {
        Self::new(config, Some(LanePolicy::free()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DrawMode, RectangleEditor};
    use crate::input::{MouseButton, PointerEvent};
    use crate::shapes::{Lane, ZoneLane};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn drag(editor: &mut RectangleEditor, from: (f64, f64), to: (f64, f64)) {
        editor.handle_pointer(PointerEvent::Down {
            position: Point::new(from.0, from.1),
            button: MouseButton::Left,
        });
        editor.handle_pointer(PointerEvent::Move {
            position: Point::new(to.0, to.1),
        });
        editor.handle_pointer(PointerEvent::Up {
            position: Point::new(to.0, to.1),
            button: MouseButton::Left,
        });
    }

    #[test]
    fn test_drag_direction_is_normalized() {
        let mut forward = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut forward, (10.0, 20.0), (110.0, 80.0));
        let mut backward = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut backward, (110.0, 80.0), (10.0, 20.0));

        let expected = vec![Rectangle::new(10.0, 20.0, 110.0, 80.0)];
        assert_eq!(forward.shapes(), expected);
        assert_eq!(backward.shapes(), expected);
        let r = backward.shapes()[0];
        assert!(r.x1 <= r.x2 && r.y1 <= r.y2);
    }

    #[test]
    fn test_undersized_drag_is_discarded() {
        let created = Rc::new(RefCell::new(0));
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        let counter = created.clone();
        editor.on_zone_created(move |_, _| *counter.borrow_mut() += 1);

        drag(&mut editor, (0.0, 0.0), (9.0, 200.0));
        drag(&mut editor, (300.0, 300.0), (500.0, 310.0));
        assert!(editor.shapes().is_empty());
        assert_eq!(*created.borrow(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_commit_selects_and_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        let sink = seen.clone();
        editor.on_zone_created(move |index, rect| sink.borrow_mut().push((index, *rect)));

        drag(&mut editor, (0.0, 0.0), (40.0, 40.0));
        assert_eq!(editor.active_zone(), Some(0));
        assert_eq!(
            seen.borrow().as_slice(),
            &[(0, Rectangle::new(0.0, 0.0, 40.0, 40.0))]
        );

        // Undo restores silently.
        editor.undo();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_body_drag_moves_and_saves_once() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));

        editor.handle_pointer(PointerEvent::Down {
            position: Point::new(50.0, 50.0),
            button: MouseButton::Left,
        });
        for step in 1..=5 {
            let d = step as f64 * 10.0;
            editor.handle_pointer(PointerEvent::Move {
                position: Point::new(50.0 + d, 50.0 + d / 2.0),
            });
        }
        editor.handle_pointer(PointerEvent::Up {
            position: Point::new(100.0, 75.0),
            button: MouseButton::Left,
        });

        assert_eq!(editor.shapes(), vec![Rectangle::new(50.0, 25.0, 150.0, 125.0)]);
        assert!(editor.undo());
        assert_eq!(editor.shapes(), vec![Rectangle::new(0.0, 0.0, 100.0, 100.0)]);
        assert!(editor.undo());
        assert!(editor.shapes().is_empty());
    }

    #[test]
    fn test_click_on_body_does_not_save() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        drag(&mut editor, (50.0, 50.0), (50.0, 50.0));
        assert!(editor.undo());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_corner_drag_resizes() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        drag(&mut editor, (100.0, 100.0), (140.0, 120.0));
        assert_eq!(editor.shapes(), vec![Rectangle::new(0.0, 0.0, 140.0, 120.0)]);

        // Dragging past the opposite corner flips and renormalizes.
        drag(&mut editor, (0.0, 0.0), (200.0, 150.0));
        assert_eq!(editor.shapes(), vec![Rectangle::new(140.0, 120.0, 200.0, 150.0)]);
    }

    #[test]
    fn test_corner_drag_below_minimum_reverts() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        drag(&mut editor, (100.0, 100.0), (5.0, 60.0));
        assert_eq!(editor.shapes(), vec![Rectangle::new(0.0, 0.0, 100.0, 100.0)]);
        assert!(editor.undo());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_escape_cancels_rectangle_draft() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.handle_pointer(PointerEvent::Down {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Left,
        });
        editor.handle_pointer(PointerEvent::Move {
            position: Point::new(80.0, 80.0),
        });
        assert!(editor.preview().is_some());
        editor.cancel_draft();
        editor.handle_pointer(PointerEvent::Up {
            position: Point::new(80.0, 80.0),
            button: MouseButton::Left,
        });
        assert!(editor.shapes().is_empty());
        assert!(editor.preview().is_none());
    }

    #[test]
    fn test_preview_is_normalized_outline() {
        let draft = RectDraft {
            anchor: Point::new(30.0, 30.0),
            corner: Point::new(10.0, 20.0),
        };
        let Preview::Outline { points, closed, .. } = RectKind::preview(&draft) else {
            panic!("expected outline");
        };
        assert!(closed);
        assert_eq!(points[0], Point::new(10.0, 20.0));
        assert_eq!(points[2], Point::new(30.0, 30.0));
    }

    #[test]
    fn test_lane_requires_active_zone() {
        let mut editor = RectangleEditor::rectangles_with_lanes(EditorConfig::default());
        editor.set_draw_mode(DrawMode::Lane).unwrap();
        drag(&mut editor, (10.0, 10.0), (60.0, 60.0));
        assert!(editor.lanes().is_empty());
        assert!(!editor.is_gesture_active());
    }

    #[test]
    fn test_free_lane_in_active_zone() {
        let lanes = Rc::new(RefCell::new(Vec::new()));
        let mut editor = RectangleEditor::rectangles_with_lanes(EditorConfig::default());
        let sink = lanes.clone();
        editor.on_lane_created(move |zone, lane| sink.borrow_mut().push((zone, *lane)));

        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        editor.set_draw_mode(DrawMode::Lane).unwrap();
        // The endpoint may leave a rectangle zone.
        drag(&mut editor, (20.0, 20.0), (150.0, 40.0));

        let expected = Lane::new(Point::new(20.0, 20.0), Point::new(150.0, 40.0));
        assert_eq!(editor.lanes(), vec![ZoneLane { zone: 0, lane: expected }]);
        assert_eq!(lanes.borrow().as_slice(), &[(0, expected)]);
    }

    #[test]
    fn test_zero_length_lane_is_discarded() {
        let mut editor = RectangleEditor::rectangles_with_lanes(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        editor.set_draw_mode(DrawMode::Lane).unwrap();
        drag(&mut editor, (20.0, 20.0), (20.0, 20.0));
        assert!(editor.lanes().is_empty());
    }

    #[test]
    fn test_mode_switch_drops_lane_draft() {
        let mut editor = RectangleEditor::rectangles_with_lanes(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        editor.set_draw_mode(DrawMode::Lane).unwrap();
        editor.handle_pointer(PointerEvent::Down {
            position: Point::new(20.0, 20.0),
            button: MouseButton::Left,
        });
        editor.set_draw_mode(DrawMode::Zone).unwrap();
        assert!(editor.preview().is_none());
        editor.handle_pointer(PointerEvent::Up {
            position: Point::new(60.0, 60.0),
            button: MouseButton::Left,
        });
        assert!(editor.lanes().is_empty());
    }

    #[test]
    fn test_moving_zone_moves_lanes() {
        let mut editor = RectangleEditor::rectangles_with_lanes(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        editor.set_draw_mode(DrawMode::Lane).unwrap();
        drag(&mut editor, (20.0, 20.0), (80.0, 20.0));
        editor.set_draw_mode(DrawMode::Zone).unwrap();
        drag(&mut editor, (50.0, 50.0), (60.0, 70.0));

        let lane = editor.lanes()[0].lane;
        assert_eq!(lane.start, Point::new(30.0, 40.0));
        assert_eq!(lane.end, Point::new(90.0, 40.0));
    }

    #[test]
    fn test_reset_zones_clears_lanes() {
        let mut editor = RectangleEditor::rectangles_with_lanes(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (100.0, 100.0));
        editor.set_draw_mode(DrawMode::Lane).unwrap();
        drag(&mut editor, (20.0, 20.0), (80.0, 20.0));
        editor.reset_zones();
        assert!(!editor.has_zones());
        assert!(editor.lanes().is_empty());
        assert_eq!(editor.active_zone(), None);
        assert!(editor.undo());
        assert_eq!(editor.lanes().len(), 1);
    }

    #[test]
    fn test_set_zones_without_lane_support_drops_lanes() {
        use crate::shapes::Zone;
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.set_zones(vec![Zone::with_lanes(
            Rectangle::new(0.0, 0.0, 50.0, 50.0),
            vec![Lane::new(Point::new(1.0, 1.0), Point::new(9.0, 9.0))],
        )]);
        assert_eq!(editor.zone_count(), 1);
        assert!(editor.lanes().is_empty());
    }
}
