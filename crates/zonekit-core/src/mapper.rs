//! Screen <-> image coordinate mapping with aspect-preserving letterboxing.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Maps between canvas (screen) pixels and source-image pixels.
///
/// The image is fitted inside the container preserving its aspect ratio and
/// centered along the slack axis. Without an image the mapping is identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    /// Natural pixel size of the source image, if one is bound.
    image_size: Option<Size>,
    /// Last accepted container size.
    container: Size,
    /// Screen px per image px along each axis.
    pub scale: Vec2,
    /// Letterbox offset of the image's top-left corner in screen px.
    pub offset: Vec2,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            image_size: None,
            container: Size::ZERO,
            scale: Vec2::new(1.0, 1.0),
            offset: Vec2::ZERO,
        }
    }
}

impl CoordinateMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Natural size of the bound image.
    pub fn image_size(&self) -> Option<Size> {
        self.image_size
    }

    /// Container size the current scale/offset were computed for.
    pub fn container(&self) -> Size {
        self.container
    }

    /// Bind (or unbind) the source image and refit to the current container.
    ///
    /// Images with a zero dimension are treated as no image.
    pub fn set_image_size(&mut self, size: Option<Size>) {
        self.image_size = size.filter(|s| s.width > 0.0 && s.height > 0.0);
        if self.image_size.is_none() {
            self.scale = Vec2::new(1.0, 1.0);
            self.offset = Vec2::ZERO;
            return;
        }
        let container = self.container;
        if !self.resize(container) {
            // No usable container yet: keep identity until the first resize.
            self.scale = Vec2::new(1.0, 1.0);
            self.offset = Vec2::ZERO;
        }
    }

    /// Recompute scale and offset for a new container size.
    ///
    /// Returns `false` and keeps the previous mapping when the container has
    /// zero area.
    pub fn resize(&mut self, container: Size) -> bool {
        if !(container.width > 0.0 && container.height > 0.0) {
            return false;
        }
        self.container = container;
        let Some(image) = self.image_size else {
            return true;
        };

        let container_ratio = container.width / container.height;
        let image_ratio = image.width / image.height;
        let (fit_w, fit_h) = if container_ratio > image_ratio {
            let h = container.height;
            (h * image.width / image.height, h)
        } else {
            let w = container.width;
            (w, w * image.height / image.width)
        };

        self.offset = Vec2::new(
            (container.width - fit_w) / 2.0,
            (container.height - fit_h) / 2.0,
        );
        self.scale = Vec2::new(fit_w / image.width, fit_h / image.height);
        true
    }

    /// Image-to-screen transform for rendering.
    pub fn transform(&self) -> Affine {
        Affine::new([
            self.scale.x,
            0.0,
            0.0,
            self.scale.y,
            self.offset.x,
            self.offset.y,
        ])
    }

    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.x) / self.scale.x,
            (screen.y - self.offset.y) / self.scale.y,
        )
    }

    pub fn image_to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale.x + self.offset.x,
            image.y * self.scale.y + self.offset.y,
        )
    }

    /// Convert a screen-space distance (tolerance) to image space.
    pub fn screen_to_image_distance(&self, distance: f64) -> f64 {
        let scale = self.scale.x.min(self.scale.y);
        if scale > 0.0 { distance / scale } else { distance }
    }

    /// Screen rectangle the image occupies.
    pub fn image_rect(&self) -> Option<Rect> {
        let image = self.image_size?;
        let origin = self.image_to_screen(Point::ZERO);
        let corner = self.image_to_screen(Point::new(image.width, image.height));
        Some(Rect::from_points(origin, corner))
    }
}
