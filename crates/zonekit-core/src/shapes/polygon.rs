//! Polygon zone.

use super::ZoneShape;
use crate::hit_test;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum number of vertices of a committed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Closed polygon; edges run `i -> i + 1`, wrapping to the first vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Enough vertices to be committed.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= MIN_POLYGON_VERTICES
    }
}

impl ZoneShape for Polygon {
    fn vertices(&self) -> Vec<Point> {
        self.points.clone()
    }

    fn set_vertex(&mut self, index: usize, to: Point) {
        if let Some(p) = self.points.get_mut(index) {
            *p = to;
        }
    }

    fn outline(&self) -> Vec<Point> {
        self.points.clone()
    }

    fn contains(&self, point: Point) -> bool {
        hit_test::point_in_polygon(point, &self.points)
    }

    fn origin(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    fn map_points(&self, f: impl Fn(Point) -> Point) -> Self {
        Self::new(self.points.iter().map(|p| f(*p)).collect())
    }

    fn finish_edit(&mut self, _min_size: f64) -> bool {
        self.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete() {
        let sq = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert!(sq.is_complete());
        assert!(!Polygon::new(vec![Point::ZERO, Point::new(1.0, 1.0)]).is_complete());
    }

    #[test]
    fn test_set_vertex_out_of_range_is_ignored() {
        let mut tri = Polygon::new(vec![Point::ZERO, Point::new(5.0, 0.0), Point::new(0.0, 5.0)]);
        let before = tri.clone();
        tri.set_vertex(7, Point::new(1.0, 1.0));
        assert_eq!(tri, before);
        tri.set_vertex(1, Point::new(6.0, 1.0));
        assert_eq!(tri.points[1], Point::new(6.0, 1.0));
    }
}
