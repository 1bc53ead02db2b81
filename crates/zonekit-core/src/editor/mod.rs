//! Interactive zone/lane editor.
//!
//! One generic [`ZoneEditor`] drives all four editor flavors. The shape kind
//! (rectangle or polygon) decides how a new zone is drawn; the optional
//! [`LanePolicy`] decides whether zones carry lanes and whether lane endpoints
//! are kept inside their zone.

mod kind;
mod polygon;
mod rect;

pub use kind::{DraftContext, DraftStep, Preview, Redraw, ZoneKind};
pub use polygon::{PolygonDraft, PolygonKind};
pub use rect::{RectDraft, RectKind};

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::hit_test::{self, ZoneHit};
use crate::input::{EditorCommand, KeyEvent, MouseButton, PointerEvent};
use crate::mapper::CoordinateMapper;
use crate::shapes::{Lane, Zone, ZoneLane, ZoneShape};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Editor for rectangle zones.
pub type RectangleEditor = ZoneEditor<RectKind>;
/// Editor for polygon zones.
pub type PolygonEditor = ZoneEditor<PolygonKind>;

/// What a pointer-down on empty space creates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    #[default]
    Zone,
    Lane,
}

impl FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zone" | "rectangle" | "polygon" => Ok(DrawMode::Zone),
            "lane" => Ok(DrawMode::Lane),
            other => Err(format!("unknown draw mode '{other}'")),
        }
    }
}

/// Lane rules for an editor that supports lanes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanePolicy {
    /// Snap lane endpoints that leave the owning zone onto its boundary.
    pub clamp_to_zone: bool,
    /// Lanes not longer than this (image px) are discarded.
    pub min_length: f64,
}

impl LanePolicy {
    /// Lanes may extend past their zone.
    pub fn free() -> Self {
        Self {
            clamp_to_zone: false,
            min_length: 0.0,
        }
    }

    /// Lanes stay within their zone.
    pub fn contained(min_length: f64) -> Self {
        Self {
            clamp_to_zone: true,
            min_length,
        }
    }

    fn constrain<S: ZoneShape>(&self, zone: &Zone<S>, point: Point) -> Point {
        if self.clamp_to_zone {
            zone.shape.clamp(point)
        } else {
            point
        }
    }

    fn accepts(&self, lane: &Lane) -> bool {
        lane.length() > self.min_length
    }

    /// Re-establish the lane rules on a zone whose shape or lanes changed.
    ///
    /// Returns how many lanes became too short and were removed.
    fn enforce<S: ZoneShape>(&self, zone: &mut Zone<S>) -> usize {
        if self.clamp_to_zone {
            zone.clamp_lanes();
        }
        let before = zone.lanes.len();
        zone.lanes.retain(|lane| self.accepts(lane));
        before - zone.lanes.len()
    }
}

/// Committed state captured by the history.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot<S> {
    zones: Vec<Zone<S>>,
    active: Option<usize>,
}

/// Multi-event interaction in progress.
#[derive(Debug)]
enum Gesture<K: ZoneKind> {
    Idle,
    Drawing(K::Draft),
    MovingZone {
        zone: usize,
        grab: Vec2,
        moved: bool,
    },
    DraggingVertex {
        zone: usize,
        vertex: usize,
        before: Zone<K::Shape>,
        moved: bool,
    },
    DrawingLane {
        zone: usize,
        lane: Lane,
    },
}

type ZoneCallback<S> = Box<dyn FnMut(usize, &S)>;
type LaneCallback = Box<dyn FnMut(usize, &Lane)>;

/// Stateful zone editor working in image space.
///
/// Pointer events arrive in screen coordinates and are mapped to image
/// space immediately, so container resizes never touch stored geometry.
pub struct ZoneEditor<K: ZoneKind> {
    config: EditorConfig,
    lanes: Option<LanePolicy>,
    zones: Vec<Zone<K::Shape>>,
    active: Option<usize>,
    mode: DrawMode,
    gesture: Gesture<K>,
    mapper: CoordinateMapper,
    /// Container size received while a gesture was active.
    pending_resize: Option<Size>,
    history: History<Snapshot<K::Shape>>,
    on_zone_created: Vec<ZoneCallback<K::Shape>>,
    on_lane_created: Vec<LaneCallback>,
    destroyed: bool,
}

impl<K: ZoneKind> ZoneEditor<K> {
    /// Create an editor; `lanes` enables lane mode.
    pub fn new(config: EditorConfig, lanes: Option<LanePolicy>) -> Self {
        let history = History::new(
            Snapshot {
                zones: Vec::new(),
                active: None,
            },
            config.history_limit,
            Duration::from_millis(config.action_lock_ms),
        );
        Self {
            config,
            lanes,
            zones: Vec::new(),
            active: None,
            mode: DrawMode::Zone,
            gesture: Gesture::Idle,
            mapper: CoordinateMapper::new(),
            pending_resize: None,
            history,
            on_zone_created: Vec::new(),
            on_lane_created: Vec::new(),
            destroyed: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn supports_lanes(&self) -> bool {
        self.lanes.is_some()
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.mode
    }

    /// Switch between zone and lane drawing.
    ///
    /// Any half-drawn shape is dropped and any drag is finished first, so
    /// nothing stale survives the switch.
    pub fn set_draw_mode(&mut self, mode: DrawMode) -> EditorResult<()> {
        if mode == DrawMode::Lane && !self.supports_lanes() {
            log::warn!("lane mode requested on a {} editor without lanes", K::LABEL);
            return Err(EditorError::LanesUnsupported);
        }
        self.settle_gesture();
        self.mode = mode;
        Ok(())
    }

    // --- Queries -------------------------------------------------------

    /// Committed zones, in image space.
    pub fn zones(&self) -> &[Zone<K::Shape>] {
        &self.zones
    }

    /// Deep copy of the committed shapes, in image space.
    pub fn shapes(&self) -> Vec<K::Shape> {
        self.zones.iter().map(|z| z.shape.clone()).collect()
    }

    /// All lanes with their owning zone index, in image space.
    pub fn lanes(&self) -> Vec<ZoneLane> {
        self.zones
            .iter()
            .enumerate()
            .flat_map(|(zone, z)| z.lanes.iter().map(move |&lane| ZoneLane { zone, lane }))
            .collect()
    }

    /// Zones divided by the image's natural size.
    pub fn normalized_zones(&self) -> EditorResult<Vec<Zone<K::Shape>>> {
        let image = self.image_size()?;
        Ok(self.zones.iter().map(|z| z.normalized(image)).collect())
    }

    /// Lanes divided by the image's natural size.
    pub fn normalized_lanes(&self) -> EditorResult<Vec<ZoneLane>> {
        let image = self.image_size()?;
        Ok(self
            .lanes()
            .into_iter()
            .map(|zl| ZoneLane {
                zone: zl.zone,
                lane: zl
                    .lane
                    .map_points(|p| Point::new(p.x / image.width, p.y / image.height)),
            })
            .collect())
    }

    /// Normalized zones as JSON.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(crate::shapes::zones_to_json(&self.normalized_zones()?)?)
    }

    pub fn active_zone(&self) -> Option<usize> {
        self.active
    }

    pub fn has_zones(&self) -> bool {
        !self.zones.is_empty()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.destroyed && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.destroyed && self.history.can_redo()
    }

    pub fn is_gesture_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// In-progress geometry, if a shape or lane is being drawn.
    pub fn preview(&self) -> Option<Preview> {
        match &self.gesture {
            Gesture::Drawing(draft) => Some(K::preview(draft)),
            Gesture::DrawingLane { zone, lane } => Some(Preview::Lane {
                zone: *zone,
                lane: *lane,
            }),
            _ => None,
        }
    }

    /// `(zone, vertex)` currently being dragged.
    pub fn dragged_vertex(&self) -> Option<(usize, usize)> {
        match self.gesture {
            Gesture::DraggingVertex { zone, vertex, .. } => Some((zone, vertex)),
            _ => None,
        }
    }

    fn image_size(&self) -> EditorResult<Size> {
        self.mapper.image_size().ok_or(EditorError::MissingImage)
    }

    // --- Callbacks -----------------------------------------------------

    /// Called once per committed zone with its index.
    pub fn on_zone_created(&mut self, callback: impl FnMut(usize, &K::Shape) + 'static) {
        self.on_zone_created.push(Box::new(callback));
    }

    /// Called once per committed lane with its owning zone index.
    pub fn on_lane_created(&mut self, callback: impl FnMut(usize, &Lane) + 'static) {
        self.on_lane_created.push(Box::new(callback));
    }

    // --- Mutators ------------------------------------------------------

    /// Replace every zone (one history entry).
    ///
    /// Shapes that cannot be committed (degenerate rectangles, polygons
    /// with fewer than three points) are dropped. Lanes are removed when
    /// unsupported, otherwise they go through the same clamp and length
    /// rules as drawn lanes.
    pub fn set_zones(&mut self, zones: Vec<Zone<K::Shape>>) {
        if self.destroyed {
            return;
        }
        self.settle_gesture();
        let total = zones.len();
        let policy = self.lanes;
        self.zones = zones
            .into_iter()
            .filter_map(|mut zone| {
                if !zone.shape.finish_edit(0.0) {
                    return None;
                }
                match policy {
                    None => zone.lanes.clear(),
                    Some(p) => {
                        p.enforce(&mut zone);
                    }
                }
                Some(zone)
            })
            .collect();
        if self.zones.len() < total {
            log::warn!(
                "dropped {} invalid {} zone(s) on replace",
                total - self.zones.len(),
                K::LABEL
            );
        }
        self.active = None;
        self.save_history();
    }

    /// Replace every zone with lane-less shapes (one history entry).
    pub fn set_shapes(&mut self, shapes: Vec<K::Shape>) {
        self.set_zones(shapes.into_iter().map(Zone::new).collect());
    }

    /// Replace every zone from normalized coordinates (one history entry).
    pub fn load_normalized(&mut self, zones: Vec<Zone<K::Shape>>) -> EditorResult<()> {
        let image = self.image_size()?;
        self.set_zones(zones.iter().map(|z| z.denormalized(image)).collect());
        Ok(())
    }

    /// Replace every zone from normalized JSON (one history entry).
    pub fn load_json(&mut self, json: &str) -> EditorResult<()> {
        let zones = crate::shapes::zones_from_json(json)?;
        self.load_normalized(zones)
    }

    /// Remove every zone and lane (one history entry).
    pub fn clear_all(&mut self) {
        if self.destroyed {
            return;
        }
        self.settle_gesture();
        self.zones.clear();
        self.active = None;
        self.save_history();
    }

    /// Alias of [`clear_all`](Self::clear_all) for lane editors.
    pub fn reset_zones(&mut self) {
        self.clear_all();
    }

    /// Delete the active zone and its lanes.
    pub fn delete_active_zone(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.settle_gesture();
        let Some(index) = self.active.filter(|&i| i < self.zones.len()) else {
            return false;
        };
        self.zones.remove(index);
        self.active = None;
        log::debug!("deleted {} zone #{}", K::LABEL, index);
        self.save_history();
        true
    }

    /// Change the selection. Selection alone does not create history.
    pub fn select_zone(&mut self, index: Option<usize>) -> EditorResult<()> {
        if let Some(i) = index {
            if i >= self.zones.len() {
                return Err(EditorError::ZoneOutOfRange {
                    index: i,
                    count: self.zones.len(),
                });
            }
        }
        self.active = index;
        Ok(())
    }

    /// Restore the previous snapshot.
    pub fn undo(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.settle_gesture();
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Re-apply the next snapshot.
    pub fn redo(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.settle_gesture();
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Bind or replace the source image.
    ///
    /// Stored geometry stays in the old image's pixel space; callers that
    /// switch to a differently sized image reload their normalized zones.
    pub fn set_image_size(&mut self, size: Option<Size>) -> Redraw {
        if self.destroyed {
            return Redraw::None;
        }
        self.settle_gesture();
        if let Some(container) = self.pending_resize.take() {
            self.mapper.resize(container);
        }
        self.mapper.set_image_size(size);
        Redraw::Full
    }

    /// React to a container resize.
    ///
    /// Deferred while a gesture is active; zero-area sizes are ignored.
    pub fn resize(&mut self, container: Size) -> Redraw {
        if self.destroyed {
            return Redraw::None;
        }
        if self.is_gesture_active() {
            log::debug!("deferring resize to {container:?} until the gesture ends");
            self.pending_resize = Some(container);
            return Redraw::None;
        }
        self.apply_resize(container)
    }

    /// Tear down: drop callbacks and state; later events are ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.gesture = Gesture::Idle;
        self.pending_resize = None;
        self.on_zone_created.clear();
        self.on_lane_created.clear();
        self.zones.clear();
        self.active = None;
        self.history.reset(Snapshot {
            zones: Vec::new(),
            active: None,
        });
        log::debug!("{} editor destroyed", K::LABEL);
    }

    // --- Events --------------------------------------------------------

    /// Handle a pointer event in screen coordinates.
    ///
    /// Hosts should deliver move/up events from the whole window while a
    /// gesture is active so a release outside the canvas still ends it.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Redraw {
        if self.destroyed {
            return Redraw::None;
        }
        let point = self.mapper.screen_to_image(event.position());
        let redraw = match event {
            PointerEvent::Down {
                button: MouseButton::Left,
                ..
            } => self.pointer_down(point),
            PointerEvent::Move { .. } => self.pointer_move(point),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.pointer_up(point),
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => Redraw::None,
        };
        redraw.merge(self.flush_pending_resize())
    }

    /// Handle a key press, throttling undo/redo with the action lock.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Redraw {
        self.handle_key_at(event, Instant::now())
    }

    /// [`handle_key`](Self::handle_key) with an explicit clock.
    pub fn handle_key_at(&mut self, event: &KeyEvent, now: Instant) -> Redraw {
        if self.destroyed {
            return Redraw::None;
        }
        let Some(command) = EditorCommand::from_key(event) else {
            return Redraw::None;
        };
        let redraw = match command {
            EditorCommand::Undo | EditorCommand::Redo => {
                self.settle_gesture();
                let snapshot = if command == EditorCommand::Undo {
                    self.history.undo_throttled(now).cloned()
                } else {
                    self.history.redo_throttled(now).cloned()
                };
                match snapshot {
                    Some(s) => {
                        self.restore(s);
                        Redraw::Full
                    }
                    None => Redraw::None,
                }
            }
            EditorCommand::Cancel => self.cancel_draft(),
            // A held Delete key must not eat one zone per repeat.
            EditorCommand::DeleteActive if !self.is_gesture_active() && !event.repeat => {
                if self.delete_active_zone() {
                    Redraw::Full
                } else {
                    Redraw::None
                }
            }
            EditorCommand::DeleteActive => Redraw::None,
        };
        redraw.merge(self.flush_pending_resize())
    }

    /// Drop an in-progress shape or lane without touching history.
    pub fn cancel_draft(&mut self) -> Redraw {
        match self.gesture {
            Gesture::Drawing(_) | Gesture::DrawingLane { .. } => {
                self.gesture = Gesture::Idle;
                log::debug!("cancelled in-progress {} draft", K::LABEL);
                Redraw::Overlay.merge(self.flush_pending_resize())
            }
            _ => Redraw::None,
        }
    }

    fn pointer_down(&mut self, point: Point) -> Redraw {
        let ctx = self.draft_context();
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => match self.mode {
                DrawMode::Zone => self.begin_zone_gesture(point),
                DrawMode::Lane => self.begin_lane(point),
            },
            Gesture::Drawing(mut draft) => match K::press(&mut draft, point, &ctx) {
                DraftStep::Continue => {
                    self.gesture = Gesture::Drawing(draft);
                    Redraw::Overlay
                }
                DraftStep::Commit(shape) => self.commit_zone(shape),
                DraftStep::Discard => Redraw::Overlay,
            },
            // A second press during a drag (missed release): keep the drag.
            other => {
                self.gesture = other;
                Redraw::None
            }
        }
    }

    fn begin_zone_gesture(&mut self, point: Point) -> Redraw {
        let tolerance = self.mapper.screen_to_image_distance(self.config.hit_tolerance);
        match hit_test::hit_zones(&self.zones, point, tolerance) {
            Some(ZoneHit::Vertex { zone, vertex }) => {
                self.active = Some(zone);
                self.gesture = Gesture::DraggingVertex {
                    zone,
                    vertex,
                    before: self.zones[zone].clone(),
                    moved: false,
                };
                Redraw::Full
            }
            Some(ZoneHit::Body { zone }) => {
                self.active = Some(zone);
                if K::BODY_DRAG_MOVES {
                    self.gesture = Gesture::MovingZone {
                        zone,
                        grab: point - self.zones[zone].shape.origin(),
                        moved: false,
                    };
                }
                Redraw::Full
            }
            None => {
                self.gesture = Gesture::Drawing(K::begin(point));
                Redraw::Overlay
            }
        }
    }

    fn begin_lane(&mut self, point: Point) -> Redraw {
        let Some(policy) = self.lanes else {
            return Redraw::None;
        };
        let Some(zone) = self.active.filter(|&i| i < self.zones.len()) else {
            log::debug!("lane ignored: no active zone");
            return Redraw::None;
        };
        let start = policy.constrain(&self.zones[zone], point);
        self.gesture = Gesture::DrawingLane {
            zone,
            lane: Lane::new(start, start),
        };
        Redraw::Overlay
    }

    fn pointer_move(&mut self, point: Point) -> Redraw {
        let ctx = self.draft_context();
        let policy = self.lanes;
        match &mut self.gesture {
            Gesture::Idle => Redraw::None,
            Gesture::Drawing(draft) => K::drag(draft, point, &ctx),
            Gesture::MovingZone { zone, grab, moved } => {
                let Some(z) = self.zones.get_mut(*zone) else {
                    return Redraw::None;
                };
                let delta = (point - *grab) - z.shape.origin();
                if delta == Vec2::ZERO {
                    return Redraw::None;
                }
                z.translate(delta);
                *moved = true;
                Redraw::Full
            }
            Gesture::DraggingVertex {
                zone,
                vertex,
                moved,
                ..
            } => {
                let Some(z) = self.zones.get_mut(*zone) else {
                    return Redraw::None;
                };
                if z.shape.vertices().get(*vertex) == Some(&point) {
                    return Redraw::None;
                }
                z.shape.set_vertex(*vertex, point);
                *moved = true;
                Redraw::Full
            }
            Gesture::DrawingLane { zone, lane } => {
                let (Some(policy), Some(z)) = (policy, self.zones.get(*zone)) else {
                    return Redraw::None;
                };
                lane.end = policy.constrain(z, point);
                Redraw::Overlay
            }
        }
    }

    fn pointer_up(&mut self, point: Point) -> Redraw {
        let ctx = self.draft_context();
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Redraw::None,
            Gesture::Drawing(mut draft) => match K::release(&mut draft, point, &ctx) {
                DraftStep::Continue => {
                    self.gesture = Gesture::Drawing(draft);
                    Redraw::Overlay
                }
                DraftStep::Commit(shape) => self.commit_zone(shape),
                DraftStep::Discard => {
                    log::debug!("discarded undersized {} draft", K::LABEL);
                    Redraw::Overlay
                }
            },
            Gesture::DrawingLane { zone, mut lane } => {
                if let (Some(policy), Some(z)) = (self.lanes, self.zones.get(zone)) {
                    lane.end = policy.constrain(z, point);
                }
                self.commit_lane(zone, lane)
            }
            drag => self.end_drag(drag),
        }
    }

    /// Finish a move or vertex drag.
    fn end_drag(&mut self, gesture: Gesture<K>) -> Redraw {
        match gesture {
            Gesture::MovingZone { moved, .. } => {
                if moved {
                    self.save_history();
                }
                Redraw::Full
            }
            Gesture::DraggingVertex {
                zone,
                before,
                moved,
                ..
            } => {
                if !moved {
                    return Redraw::Full;
                }
                let min_size = self.config.min_rect_size;
                let policy = self.lanes;
                let Some(z) = self.zones.get_mut(zone) else {
                    return Redraw::Full;
                };
                if z.shape.finish_edit(min_size) {
                    let dropped = policy.map_or(0, |p| p.enforce(z));
                    if dropped > 0 {
                        log::debug!("dropped {dropped} lane(s) collapsed by the vertex edit");
                    }
                    self.save_history();
                } else {
                    log::debug!("reverted {} vertex edit below minimum size", K::LABEL);
                    *z = before;
                }
                Redraw::Full
            }
            _ => Redraw::None,
        }
    }

    /// Finish drags and drop drafts before a programmatic change.
    fn settle_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle | Gesture::Drawing(_) | Gesture::DrawingLane { .. } => {}
            drag => {
                self.end_drag(drag);
            }
        }
        if let Some(container) = self.pending_resize.take() {
            self.apply_resize(container);
        }
    }

    fn commit_zone(&mut self, shape: K::Shape) -> Redraw {
        self.zones.push(Zone::new(shape.clone()));
        let index = self.zones.len() - 1;
        self.active = Some(index);
        log::debug!("committed {} zone #{}", K::LABEL, index);
        for callback in &mut self.on_zone_created {
            callback(index, &shape);
        }
        self.save_history();
        Redraw::Full
    }

    fn commit_lane(&mut self, zone: usize, lane: Lane) -> Redraw {
        let Some(policy) = self.lanes else {
            return Redraw::Overlay;
        };
        if !policy.accepts(&lane) {
            log::debug!("discarded lane of length {:.2}", lane.length());
            return Redraw::Overlay;
        }
        let Some(z) = self.zones.get_mut(zone) else {
            return Redraw::Overlay;
        };
        z.lanes.push(lane);
        log::debug!("committed lane #{} in zone #{}", z.lanes.len() - 1, zone);
        for callback in &mut self.on_lane_created {
            callback(zone, &lane);
        }
        self.save_history();
        Redraw::Full
    }

    fn draft_context(&self) -> DraftContext {
        DraftContext {
            min_rect_size: self.config.min_rect_size,
            close_tolerance: self.mapper.screen_to_image_distance(self.config.close_tolerance),
        }
    }

    fn apply_resize(&mut self, container: Size) -> Redraw {
        if self.mapper.resize(container) {
            Redraw::Full
        } else {
            log::warn!("ignoring resize to zero-area container {container:?}");
            Redraw::None
        }
    }

    fn flush_pending_resize(&mut self) -> Redraw {
        if self.is_gesture_active() {
            return Redraw::None;
        }
        match self.pending_resize.take() {
            Some(container) => self.apply_resize(container),
            None => Redraw::None,
        }
    }

    fn snapshot(&self) -> Snapshot<K::Shape> {
        Snapshot {
            zones: self.zones.clone(),
            active: self.active,
        }
    }

    fn save_history(&mut self) {
        let snapshot = self.snapshot();
        self.history.save(snapshot);
    }

    fn restore(&mut self, snapshot: Snapshot<K::Shape>) {
        self.zones = snapshot.zones;
        self.active = snapshot.active.filter(|&i| i < self.zones.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::shapes::Rectangle;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn drag(editor: &mut RectangleEditor, from: (f64, f64), to: (f64, f64)) {
        editor.handle_pointer(down(from.0, from.1));
        editor.handle_pointer(PointerEvent::Move {
            position: Point::new(to.0, to.1),
        });
        editor.handle_pointer(up(to.0, to.1));
    }

    #[test]
    fn test_draw_mode_parsing() {
        assert_eq!("lane".parse::<DrawMode>(), Ok(DrawMode::Lane));
        assert_eq!("polygon".parse::<DrawMode>(), Ok(DrawMode::Zone));
        assert!("circle".parse::<DrawMode>().is_err());
    }

    #[test]
    fn test_lane_mode_requires_lane_support() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        assert!(matches!(
            editor.set_draw_mode(DrawMode::Lane),
            Err(EditorError::LanesUnsupported)
        ));
        assert_eq!(editor.draw_mode(), DrawMode::Zone);
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        drag(&mut editor, (100.0, 100.0), (180.0, 140.0));
        drag(&mut editor, (300.0, 10.0), (220.0, 90.0));
        let final_state = editor.zones().to_vec();

        for _ in 0..3 {
            assert!(editor.undo());
        }
        assert!(editor.zones().is_empty());
        assert!(!editor.undo());

        for _ in 0..3 {
            assert!(editor.redo());
        }
        assert_eq!(editor.zones(), final_state.as_slice());
        assert!(!editor.redo());
    }

    #[test]
    fn test_commit_after_undo_invalidates_redo() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        drag(&mut editor, (100.0, 100.0), (180.0, 140.0));
        assert!(editor.undo());
        drag(&mut editor, (300.0, 300.0), (400.0, 400.0));
        assert!(!editor.redo());
        assert_eq!(editor.zone_count(), 2);
    }

    #[test]
    fn test_history_limit_from_config() {
        let config = EditorConfig {
            history_limit: 3,
            ..Default::default()
        };
        let mut editor = RectangleEditor::rectangles(config);
        for i in 0..5 {
            let x = i as f64 * 100.0;
            drag(&mut editor, (x, 0.0), (x + 50.0, 50.0));
        }
        let mut undone = 0;
        while editor.undo() {
            undone += 1;
        }
        assert_eq!(undone, 2);
        assert_eq!(editor.zone_count(), 3);
    }

    #[test]
    fn test_keyboard_undo_is_throttled() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        drag(&mut editor, (100.0, 100.0), (180.0, 140.0));
        let ctrl_z = KeyEvent::new(
            "z",
            Modifiers {
                ctrl: true,
                ..Default::default()
            },
        );
        let t0 = Instant::now();
        assert_eq!(editor.handle_key_at(&ctrl_z, t0), Redraw::Full);
        assert_eq!(
            editor.handle_key_at(&ctrl_z, t0 + Duration::from_millis(50)),
            Redraw::None
        );
        assert_eq!(editor.zone_count(), 1);
        assert_eq!(
            editor.handle_key_at(&ctrl_z, t0 + Duration::from_millis(400)),
            Redraw::Full
        );
        assert_eq!(editor.zone_count(), 0);
    }

    #[test]
    fn test_delete_key_removes_active_zone() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        let delete = KeyEvent::new("Delete", Modifiers::default());
        assert_eq!(editor.handle_key(&delete), Redraw::Full);
        assert!(!editor.has_zones());
        assert_eq!(editor.handle_key(&delete), Redraw::None);
        assert!(editor.undo());
        assert!(editor.has_zones());
    }

    #[test]
    fn test_held_delete_key_deletes_once() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        drag(&mut editor, (100.0, 100.0), (180.0, 140.0));
        editor.select_zone(Some(0)).unwrap();

        let mut held = KeyEvent::new("Delete", Modifiers::default());
        held.repeat = true;
        assert_eq!(editor.handle_key(&held), Redraw::None);
        assert_eq!(editor.zone_count(), 2);

        held.repeat = false;
        assert_eq!(editor.handle_key(&held), Redraw::Full);
        assert_eq!(editor.zone_count(), 1);
    }

    #[test]
    fn test_delete_without_selection() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        editor.select_zone(None).unwrap();
        assert!(!editor.delete_active_zone());
        assert_eq!(editor.zone_count(), 1);
    }

    #[test]
    fn test_select_zone_out_of_range() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        assert!(matches!(
            editor.select_zone(Some(0)),
            Err(EditorError::ZoneOutOfRange { index: 0, count: 0 })
        ));
    }

    #[test]
    fn test_set_and_clear_each_save_one_entry() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.set_shapes(vec![
            Rectangle::new(0.0, 0.0, 40.0, 40.0),
            Rectangle::new(90.0, 90.0, 60.0, 60.0),
        ]);
        // Inverted corners are normalized on replace.
        assert_eq!(editor.shapes()[1], Rectangle::new(60.0, 60.0, 90.0, 90.0));
        editor.clear_all();
        assert!(!editor.has_zones());
        assert!(editor.undo());
        assert_eq!(editor.zone_count(), 2);
        assert!(editor.undo());
        assert_eq!(editor.zone_count(), 0);
        assert!(!editor.undo());
    }

    #[test]
    fn test_set_zones_drops_degenerate_shapes() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.set_shapes(vec![
            Rectangle::new(0.0, 0.0, 40.0, 40.0),
            Rectangle::new(5.0, 5.0, 5.0, 30.0),
        ]);
        assert_eq!(editor.zone_count(), 1);
    }

    #[test]
    fn test_normalized_requires_image() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        assert!(matches!(
            editor.normalized_zones(),
            Err(EditorError::MissingImage)
        ));
        assert!(matches!(
            editor.load_normalized(Vec::new()),
            Err(EditorError::MissingImage)
        ));
    }

    #[test]
    fn test_normalized_roundtrip() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.resize(Size::new(800.0, 600.0));
        editor.set_image_size(Some(Size::new(1920.0, 1080.0)));
        editor.set_shapes(vec![Rectangle::new(100.0, 50.0, 900.0, 700.0)]);
        let original = editor.shapes();

        let normalized = editor.normalized_zones().unwrap();
        assert!((normalized[0].shape.x2 - 900.0 / 1920.0).abs() < 1e-12);
        editor.load_normalized(normalized).unwrap();
        let restored = editor.shapes();
        assert!((restored[0].x1 - original[0].x1).abs() < 1e-9);
        assert!((restored[0].y2 - original[0].y2).abs() < 1e-9);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.set_image_size(Some(Size::new(200.0, 100.0)));
        editor.set_shapes(vec![Rectangle::new(20.0, 10.0, 120.0, 90.0)]);
        let json = editor.to_json().unwrap();
        editor.clear_all();
        editor.load_json(&json).unwrap();
        let r = editor.shapes()[0];
        assert!((r.x1 - 20.0).abs() < 1e-9 && (r.y2 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_during_idle_keeps_geometry() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.resize(Size::new(800.0, 600.0));
        editor.set_image_size(Some(Size::new(800.0, 600.0)));
        editor.set_shapes(vec![Rectangle::new(10.0, 10.0, 50.0, 50.0)]);

        assert_eq!(editor.resize(Size::new(400.0, 300.0)), Redraw::Full);
        assert_eq!(editor.shapes(), vec![Rectangle::new(10.0, 10.0, 50.0, 50.0)]);
        assert!((editor.mapper().scale.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_resize_during_gesture_is_deferred() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.resize(Size::new(800.0, 600.0));
        editor.set_image_size(Some(Size::new(800.0, 600.0)));

        editor.handle_pointer(down(100.0, 100.0));
        assert_eq!(editor.resize(Size::new(400.0, 300.0)), Redraw::None);
        assert!((editor.mapper().scale.x - 1.0).abs() < 1e-12);
        editor.handle_pointer(PointerEvent::Move {
            position: Point::new(200.0, 200.0),
        });
        editor.handle_pointer(up(200.0, 200.0));

        // Mapped with the pre-resize scale, then the resize applies.
        assert_eq!(editor.shapes(), vec![Rectangle::new(100.0, 100.0, 200.0, 200.0)]);
        assert!((editor.mapper().scale.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_resize_is_ignored() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.resize(Size::new(800.0, 600.0));
        editor.set_image_size(Some(Size::new(400.0, 300.0)));
        let before = editor.mapper().clone();
        assert_eq!(editor.resize(Size::new(0.0, 0.0)), Redraw::None);
        assert_eq!(editor.mapper(), &before);
    }

    #[test]
    fn test_pointer_mapped_through_letterbox() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.resize(Size::new(1000.0, 500.0));
        editor.set_image_size(Some(Size::new(200.0, 100.0)));
        // scale 5, no offset: screen (50,50)-(300,250) -> image (10,10)-(60,50)
        let mut e = editor;
        e.handle_pointer(down(50.0, 50.0));
        e.handle_pointer(PointerEvent::Move {
            position: Point::new(300.0, 250.0),
        });
        e.handle_pointer(up(300.0, 250.0));
        assert_eq!(e.shapes(), vec![Rectangle::new(10.0, 10.0, 60.0, 50.0)]);
    }

    #[test]
    fn test_destroy_ignores_later_events() {
        let created = Rc::new(RefCell::new(0));
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        let counter = created.clone();
        editor.on_zone_created(move |_, _| *counter.borrow_mut() += 1);

        editor.destroy();
        drag(&mut editor, (0.0, 0.0), (80.0, 80.0));
        assert!(editor.is_destroyed());
        assert!(editor.shapes().is_empty());
        assert_eq!(*created.borrow(), 0);
        assert!(!editor.undo());
        editor.destroy();
    }

    #[test]
    fn test_right_button_is_ignored() {
        let mut editor = RectangleEditor::rectangles(EditorConfig::default());
        editor.handle_pointer(PointerEvent::Down {
            position: Point::new(0.0, 0.0),
            button: MouseButton::Right,
        });
        assert!(!editor.is_gesture_active());
    }
}
