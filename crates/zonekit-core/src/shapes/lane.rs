//! Directed lanes owned by zones.

use crate::hit_test;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A directed segment inside a zone, from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub start: Point,
    pub end: Point,
}

impl Lane {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        hit_test::segment_length(self.start, self.end)
    }

    /// Unit direction, or zero for a degenerate lane.
    pub fn direction(&self) -> Vec2 {
        let v = self.end - self.start;
        let len = v.hypot();
        if len > 0.0 { v / len } else { Vec2::ZERO }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }

    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self::new(f(self.start), f(self.end))
    }
}

/// A lane together with the index of its owning zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneLane {
    pub zone: usize,
    pub lane: Lane,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_direction() {
        let lane = Lane::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((lane.length() - 5.0).abs() < 1e-9);
        let d = lane.direction();
        assert!((d.x - 0.6).abs() < 1e-9 && (d.y - 0.8).abs() < 1e-9);
        assert_eq!(Lane::new(Point::ZERO, Point::ZERO).direction(), Vec2::ZERO);
    }
}
