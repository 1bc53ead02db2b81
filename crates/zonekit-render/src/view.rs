//! One editor bound to one drawing surface.

use crate::painter::paint_editor;
use crate::style::PaintStyle;
use crate::surface::{Surface, SurfaceResult};
use kurbo::Size;
use zonekit_core::{KeyEvent, PointerEvent, Redraw, ZoneEditor, ZoneKind};

/// Routes host events into an editor and repaints its surface as needed.
pub struct EditorView<K: ZoneKind, S: Surface> {
    editor: ZoneEditor<K>,
    surface: S,
    style: PaintStyle,
    has_image: bool,
}

impl<K: ZoneKind, S: Surface> EditorView<K, S> {
    pub fn new(editor: ZoneEditor<K>, surface: S, style: PaintStyle) -> Self {
        Self {
            editor,
            surface,
            style,
            has_image: false,
        }
    }

    pub fn editor(&self) -> &ZoneEditor<K> {
        &self.editor
    }

    /// Mutable access for programmatic changes; call
    /// [`repaint`](Self::repaint) afterwards.
    pub fn editor_mut(&mut self) -> &mut ZoneEditor<K> {
        &mut self.editor
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn style(&self) -> &PaintStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: PaintStyle) -> SurfaceResult<()> {
        self.style = style;
        self.repaint()
    }

    /// Bind, replace or drop the source image by its natural size.
    pub fn bind_image(&mut self, natural_size: Option<Size>) -> SurfaceResult<()> {
        let redraw = self.editor.set_image_size(natural_size);
        self.has_image = self.editor.mapper().image_size().is_some();
        self.refresh(redraw)
    }

    /// Container size changed (CSS pixels).
    pub fn resize(&mut self, container: Size) -> SurfaceResult<()> {
        let redraw = self.editor.resize(container);
        self.refresh(redraw)
    }

    pub fn pointer(&mut self, event: PointerEvent) -> SurfaceResult<Redraw> {
        let redraw = self.editor.handle_pointer(event);
        self.refresh(redraw)?;
        Ok(redraw)
    }

    pub fn key(&mut self, event: &KeyEvent) -> SurfaceResult<Redraw> {
        let redraw = self.editor.handle_key(event);
        self.refresh(redraw)?;
        Ok(redraw)
    }

    pub fn refresh(&mut self, redraw: Redraw) -> SurfaceResult<()> {
        if redraw.is_needed() {
            self.repaint()
        } else {
            Ok(())
        }
    }

    /// Repaint the whole frame.
    ///
    /// The backing store follows the mapper's container first, which also
    /// picks up resizes that were deferred during a gesture.
    pub fn repaint(&mut self) -> SurfaceResult<()> {
        if self.editor.is_destroyed() {
            return Ok(());
        }
        let container = self.editor.mapper().container();
        if container.width > 0.0 && container.height > 0.0 && container != self.surface.size() {
            log::debug!("resizing surface backing store to {container:?}");
            self.surface.set_size(container);
        }
        paint_editor(&mut self.surface, &self.editor, &self.style, self.has_image)
    }

    /// Destroy the editor and wipe the surface.
    pub fn destroy(&mut self) {
        self.editor.destroy();
        self.has_image = false;
        self.surface.clear(None);
    }
}
