//! In-memory surface that records draw calls, for tests.

use crate::surface::{Surface, SurfaceError, SurfaceResult};
use kurbo::{BezPath, Rect, Shape as _, Size};
use peniko::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Clear(Option<[u8; 4]>),
    Image(Rect),
    Stroke { bounds: Rect, color: [u8; 4], width: f64 },
    Fill { bounds: Rect, color: [u8; 4] },
}

fn rgba(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub size: Size,
    pub ops: Vec<Op>,
    pub resizes: Vec<Size>,
    pub fail_images: bool,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn strokes_with(&self, color: [u8; 4]) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Stroke { bounds, color: c, .. } if *c == color => Some(*bounds),
                _ => None,
            })
            .collect()
    }

    pub fn fills_with(&self, color: [u8; 4]) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill { bounds, color: c } if *c == color => Some(*bounds),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn set_size(&mut self, size: Size) {
        self.size = size;
        self.resizes.push(size);
    }

    fn clear(&mut self, background: Option<Color>) {
        self.ops.clear();
        self.ops.push(Op::Clear(background.map(rgba)));
    }

    fn draw_image(&mut self, dest: Rect) -> SurfaceResult<()> {
        if self.fail_images {
            return Err(SurfaceError::Draw("image not decoded".into()));
        }
        self.ops.push(Op::Image(dest));
        Ok(())
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) -> SurfaceResult<()> {
        self.ops.push(Op::Stroke {
            bounds: path.bounding_box(),
            color: rgba(color),
            width,
        });
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) -> SurfaceResult<()> {
        self.ops.push(Op::Fill {
            bounds: path.bounding_box(),
            color: rgba(color),
        });
        Ok(())
    }
}
