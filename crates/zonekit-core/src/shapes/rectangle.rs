//! Axis-aligned rectangle zone.

use super::ZoneShape;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Rectangle given by two corners.
///
/// Committed rectangles satisfy `x1 <= x2 && y1 <= y2`; while a corner is
/// being dragged the order may be temporarily inverted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Rectangle {
    /// Create a rectangle with corners as given (no reordering).
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a rectangle from two arbitrary corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(p1.x, p1.y, p2.x, p2.y).normalized()
    }

    /// Sort the corners so that `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }

    /// Both sides strictly longer than `min`.
    pub fn exceeds(&self, min: f64) -> bool {
        self.width() > min && self.height() > min
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.x2, self.y2).abs()
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }
}

impl ZoneShape for Rectangle {
    fn vertices(&self) -> Vec<Point> {
        self.corners().to_vec()
    }

    fn set_vertex(&mut self, index: usize, to: Point) {
        match index {
            0 => (self.x1, self.y1) = (to.x, to.y),
            1 => (self.x2, self.y1) = (to.x, to.y),
            2 => (self.x2, self.y2) = (to.x, to.y),
            3 => (self.x1, self.y2) = (to.x, to.y),
            _ => {}
        }
    }

    fn outline(&self) -> Vec<Point> {
        self.normalized().corners().to_vec()
    }

    fn contains(&self, point: Point) -> bool {
        let r = self.as_rect();
        point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
    }

    fn origin(&self) -> Point {
        Point::new(self.x1.min(self.x2), self.y1.min(self.y2))
    }

    fn translate(&mut self, delta: Vec2) {
        self.x1 += delta.x;
        self.x2 += delta.x;
        self.y1 += delta.y;
        self.y2 += delta.y;
    }

    fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        let a = f(Point::new(self.x1, self.y1));
        let b = f(Point::new(self.x2, self.y2));
        Self::new(a.x, a.y, b.x, b.y)
    }

    fn finish_edit(&mut self, min_size: f64) -> bool {
        *self = self.normalized();
        self.exceeds(min_size)
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn clamp(&self, point: Point) -> Point {
        let r = self.as_rect();
        Point::new(point.x.clamp(r.x0, r.x1), point.y.clamp(r.y0, r.y1))
    }
}
