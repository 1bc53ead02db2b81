//! Rasterizes an editor onto a [`Surface`].

use crate::style::PaintStyle;
use crate::surface::{Surface, SurfaceResult};
use kurbo::{BezPath, Circle, Point, Shape as _, Vec2};
use peniko::Color;
use zonekit_core::{CoordinateMapper, Lane, Preview, ZoneEditor, ZoneKind, ZoneShape};

/// Paint one full frame: background, image, zones, lanes, handles, overlay.
///
/// `with_image` is false when the host has no source image to blit; the
/// zones are still painted through the current mapping.
pub fn paint_editor<K: ZoneKind, S: Surface>(
    surface: &mut S,
    editor: &ZoneEditor<K>,
    style: &PaintStyle,
    with_image: bool,
) -> SurfaceResult<()> {
    surface.clear(style.background.map(Color::from));
    let mut painter = Painter {
        surface,
        style,
        mapper: editor.mapper(),
    };

    if with_image {
        if let Some(dest) = painter.mapper.image_rect() {
            painter.surface.draw_image(dest)?;
        }
    }

    let active = editor.active_zone();
    for (index, zone) in editor.zones().iter().enumerate() {
        painter.zone(&zone.shape.outline(), active == Some(index))?;
    }
    for zone_lane in editor.lanes() {
        painter.lane(&zone_lane.lane, style.lane_stroke.into())?;
    }

    if let Some(zone) = active.and_then(|i| editor.zones().get(i)) {
        let dragged = editor
            .dragged_vertex()
            .filter(|(z, _)| Some(*z) == active)
            .map(|(_, v)| v);
        painter.handles(&zone.shape.vertices(), dragged)?;
    }

    if let Some(preview) = editor.preview() {
        painter.preview(&preview)?;
    }
    Ok(())
}

struct Painter<'a, S: Surface> {
    surface: &'a mut S,
    style: &'a PaintStyle,
    mapper: &'a CoordinateMapper,
}

impl<S: Surface> Painter<'_, S> {
    /// Screen-space path through image-space points.
    fn path(&self, points: &[Point], closed: bool) -> BezPath {
        let mut path = BezPath::new();
        let mut screen = points.iter().map(|p| self.mapper.image_to_screen(*p));
        if let Some(first) = screen.next() {
            path.move_to(first);
            for p in screen {
                path.line_to(p);
            }
            if closed {
                path.close_path();
            }
        }
        path
    }

    fn zone(&mut self, outline: &[Point], active: bool) -> SurfaceResult<()> {
        let path = self.path(outline, true);
        let (stroke, fill) = if active {
            (self.style.active_stroke, self.style.active_fill)
        } else {
            (self.style.zone_stroke, self.style.zone_fill)
        };
        self.surface.fill_path(&path, fill.into())?;
        self.surface
            .stroke_path(&path, stroke.into(), self.style.zone_width)
    }

    /// Lane shaft plus a filled arrowhead at its end.
    fn lane(&mut self, lane: &Lane, color: Color) -> SurfaceResult<()> {
        let screen = lane.map_points(|p| self.mapper.image_to_screen(p));
        let mut shaft = BezPath::new();
        shaft.move_to(screen.start);
        shaft.line_to(screen.end);
        self.surface
            .stroke_path(&shaft, color, self.style.lane_width)?;

        let dir = screen.direction();
        if dir == Vec2::ZERO {
            return Ok(());
        }
        let size = self.style.arrow_size;
        let perp = Vec2::new(-dir.y, dir.x);
        let back = screen.end - dir * size;
        let mut head = BezPath::new();
        head.move_to(screen.end);
        head.line_to(back + perp * size * 0.5);
        head.line_to(back - perp * size * 0.5);
        head.close_path();
        self.surface.fill_path(&head, color)
    }

    /// Vertex handles; the dragged one is drawn in the stroke color.
    fn handles(&mut self, vertices: &[Point], highlighted: Option<usize>) -> SurfaceResult<()> {
        for (index, vertex) in vertices.iter().enumerate() {
            let center = self.mapper.image_to_screen(*vertex);
            let path = Circle::new(center, self.style.handle_radius).to_path(0.1);
            let fill = if highlighted == Some(index) {
                self.style.handle_stroke
            } else {
                self.style.handle_fill
            };
            self.surface.fill_path(&path, fill.into())?;
            self.surface
                .stroke_path(&path, self.style.handle_stroke.into(), 1.5)?;
        }
        Ok(())
    }

    fn preview(&mut self, preview: &Preview) -> SurfaceResult<()> {
        match preview {
            Preview::Outline {
                points,
                closed,
                cursor,
                near_first,
            } => {
                let Some(first) = points.first() else {
                    return Ok(());
                };
                let mut path = self.path(points, *closed);
                if let (false, Some(cursor)) = (*closed, cursor) {
                    path.line_to(self.mapper.image_to_screen(*cursor));
                }
                self.surface
                    .stroke_path(&path, self.style.draft_stroke.into(), self.style.zone_width)?;
                if !*closed {
                    self.handles(points, None)?;
                }
                if *near_first {
                    let ring = Circle::new(
                        self.mapper.image_to_screen(*first),
                        self.style.handle_radius * 2.0,
                    )
                    .to_path(0.1);
                    self.surface
                        .stroke_path(&ring, self.style.close_hint.into(), 2.0)?;
                }
                Ok(())
            }
            Preview::Lane { lane, .. } => {
                let color: Color = self.style.draft_stroke.into();
                self.lane(lane, color)
            }
        }
    }
}
