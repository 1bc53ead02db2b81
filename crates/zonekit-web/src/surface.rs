//! `Surface` backed by a 2D canvas context.

use crate::error::describe;
use kurbo::{BezPath, PathEl, Rect, Size};
use peniko::Color;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};
use zonekit_render::{Surface, SurfaceError, SurfaceResult};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    image: Option<HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> SurfaceResult<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| SurfaceError::ContextUnavailable(describe(&e)))?
            .ok_or_else(|| SurfaceError::ContextUnavailable("2d context not supported".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::ContextUnavailable("unexpected context type".into()))?;
        Ok(Self {
            canvas,
            ctx,
            image: None,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Image blitted by `draw_image`.
    pub fn set_image(&mut self, image: Option<HtmlImageElement>) {
        self.image = image;
    }

    fn trace(&self, path: &BezPath) {
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => self.ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(a, b, p) => self.ctx.bezier_curve_to(a.x, a.y, b.x, b.y, p.x, p.y),
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
    }
}

fn css_color(color: Color) -> String {
    let c = color.to_rgba8();
    format!("rgba({}, {}, {}, {:.3})", c.r, c.g, c.b, f64::from(c.a) / 255.0)
}

impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn set_size(&mut self, size: Size) {
        self.canvas.set_width(size.width.round().max(0.0) as u32);
        self.canvas.set_height(size.height.round().max(0.0) as u32);
    }

    fn clear(&mut self, background: Option<Color>) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        if let Some(color) = background {
            self.ctx.set_fill_style_str(&css_color(color));
            self.ctx.fill_rect(0.0, 0.0, size.width, size.height);
        }
    }

    fn draw_image(&mut self, dest: Rect) -> SurfaceResult<()> {
        let Some(image) = &self.image else {
            return Ok(());
        };
        if !image.complete() || image.natural_width() == 0 {
            log::debug!("source image not decoded yet, skipping blit");
            return Ok(());
        }
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                dest.x0,
                dest.y0,
                dest.width(),
                dest.height(),
            )
            .map_err(|e| SurfaceError::Draw(describe(&e)))
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) -> SurfaceResult<()> {
        self.trace(path);
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(width);
        self.ctx.stroke();
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) -> SurfaceResult<()> {
        self.trace(path);
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill();
        Ok(())
    }
}
