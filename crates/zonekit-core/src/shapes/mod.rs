//! Zone and lane geometry.
//!
//! Every shape here lives in image space while it is edited. The same types
//! carry normalized (0..1) coordinates when exported.

mod lane;
mod polygon;
mod rectangle;

pub use lane::{Lane, ZoneLane};
pub use polygon::{MIN_POLYGON_VERTICES, Polygon};
pub use rectangle::Rectangle;

use crate::hit_test;
use kurbo::{Point, Rect, Size, Vec2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common behavior of zone shapes, used by the generic editor.
pub trait ZoneShape: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    /// Manipulable vertices (rectangle corners, polygon points).
    fn vertices(&self) -> Vec<Point>;

    /// Move one vertex. Out-of-range indices are ignored.
    fn set_vertex(&mut self, index: usize, to: Point);

    /// Closed boundary ring.
    fn outline(&self) -> Vec<Point>;

    /// Whether `point` lies in the zone body.
    fn contains(&self, point: Point) -> bool;

    /// Anchor used when dragging the whole zone.
    fn origin(&self) -> Point;

    fn translate(&mut self, delta: Vec2);

    /// Apply a point mapping to every coordinate.
    fn map_points(&self, f: impl Fn(Point) -> Point) -> Self;

    /// Restore invariants after an interactive vertex edit.
    ///
    /// Returns `false` when the edited shape is no longer valid.
    fn finish_edit(&mut self, min_size: f64) -> bool;

    fn bounds(&self) -> Rect {
        let outline = self.outline();
        let mut points = outline.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }

    /// Nearest point of the zone to `point`: itself if inside, else on the boundary.
    fn clamp(&self, point: Point) -> Point {
        hit_test::clamp_to_polygon(point, &self.outline())
    }
}

/// A committed zone and the lanes it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone<S> {
    pub shape: S,
    #[serde(default)]
    pub lanes: Vec<Lane>,
}

impl<S: ZoneShape> Zone<S> {
    pub fn new(shape: S) -> Self {
        Self {
            shape,
            lanes: Vec::new(),
        }
    }

    pub fn with_lanes(shape: S, lanes: Vec<Lane>) -> Self {
        Self { shape, lanes }
    }

    /// Move the zone together with its lanes.
    pub fn translate(&mut self, delta: Vec2) {
        self.shape.translate(delta);
        for lane in &mut self.lanes {
            lane.translate(delta);
        }
    }

    /// Scale every coordinate of the zone and its lanes.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        let f = |p: Point| Point::new(p.x * sx, p.y * sy);
        Self {
            shape: self.shape.map_points(f),
            lanes: self.lanes.iter().map(|lane| lane.map_points(f)).collect(),
        }
    }

    /// Image space to normalized space.
    pub fn normalized(&self, image: Size) -> Self {
        self.scaled(1.0 / image.width, 1.0 / image.height)
    }

    /// Normalized space to image space.
    pub fn denormalized(&self, image: Size) -> Self {
        self.scaled(image.width, image.height)
    }

    /// Snap every lane endpoint into the zone.
    pub fn clamp_lanes(&mut self) {
        for lane in &mut self.lanes {
            lane.start = self.shape.clamp(lane.start);
            lane.end = self.shape.clamp(lane.end);
        }
    }
}

/// Serialize zones to JSON.
pub fn zones_to_json<S: ZoneShape>(zones: &[Zone<S>]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(zones)
}

/// Deserialize zones from JSON.
pub fn zones_from_json<S: ZoneShape>(json: &str) -> Result<Vec<Zone<S>>, serde_json::Error> {
    serde_json::from_str(json)
}
