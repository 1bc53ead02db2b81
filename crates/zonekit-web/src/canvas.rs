//! JavaScript-facing editor bound to a `<canvas>` element.

use crate::error::{HostError, HostResult, describe};
use crate::listeners::{ListenerGuard, ObserverGuard, content_size};
use crate::surface::CanvasSurface;
use kurbo::{Point, Size};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::str::FromStr;
use std::sync::Once;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, HtmlCanvasElement, HtmlElement, HtmlImageElement, KeyboardEvent, MouseEvent,
    PointerEvent as DomPointerEvent, Window,
};
use zonekit_core::{
    DrawMode, EditorCommand, EditorConfig, KeyEvent, Lane, Modifiers, MouseButton, PointerEvent,
    PolygonKind, RectKind, ZoneEditor, ZoneKind,
};
use zonekit_render::{EditorView, PaintStyle};

/// Install the panic hook and the console logger (idempotent).
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    static LOGGER: Once = Once::new();
    console_error_panic_hook::set_once();
    LOGGER.call_once(|| {
        // A host page may already have installed its own logger.
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("console logger already installed");
        }
    });
}

/// The editor flavors a host can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFlavor {
    Rectangle,
    RectangleLanes,
    Polygon,
    PolygonLanes,
}

impl FromStr for EditorFlavor {
    type Err = HostError;

    fn from_str(s: &str) -> HostResult<Self> {
        match s {
            "rectangle" => Ok(EditorFlavor::Rectangle),
            "rectangle-lanes" | "rectangle_lanes" => Ok(EditorFlavor::RectangleLanes),
            "polygon" => Ok(EditorFlavor::Polygon),
            "polygon-lanes" | "polygon_lanes" => Ok(EditorFlavor::PolygonLanes),
            other => Err(HostError::UnknownKind(other.to_string())),
        }
    }
}

enum AnyView {
    Rect(EditorView<RectKind, CanvasSurface>),
    Polygon(EditorView<PolygonKind, CanvasSurface>),
}

macro_rules! with_view {
    ($view:expr, $v:ident => $body:expr) => {
        match $view {
            AnyView::Rect($v) => $body,
            AnyView::Polygon($v) => $body,
        }
    };
}

struct Inner {
    view: AnyView,
    canvas: HtmlCanvasElement,
}

enum Notice {
    Zone { index: usize, shape: JsValue },
    Lane { zone: usize, lane: JsValue },
}

/// JS creation callbacks.
///
/// The editor only queues notices; they are delivered once the editor borrow
/// is released, so a callback may call back into the `ZoneCanvas`.
#[derive(Default)]
struct Hooks {
    pending: RefCell<Vec<Notice>>,
    zone_created: RefCell<Option<js_sys::Function>>,
    lane_created: RefCell<Option<js_sys::Function>>,
}

impl Hooks {
    fn push_zone<S: Serialize>(&self, index: usize, shape: &S) {
        match serde_wasm_bindgen::to_value(shape) {
            Ok(shape) => self.pending.borrow_mut().push(Notice::Zone { index, shape }),
            Err(e) => log::warn!("failed to convert created zone: {e}"),
        }
    }

    fn push_lane(&self, zone: usize, lane: &Lane) {
        match serde_wasm_bindgen::to_value(lane) {
            Ok(lane) => self.pending.borrow_mut().push(Notice::Lane { zone, lane }),
            Err(e) => log::warn!("failed to convert created lane: {e}"),
        }
    }

    fn flush(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for notice in pending {
            let (callback, value, index) = match notice {
                Notice::Zone { index, shape } => (self.zone_created.borrow().clone(), shape, index),
                Notice::Lane { zone, lane } => (self.lane_created.borrow().clone(), lane, zone),
            };
            let Some(callback) = callback else {
                continue;
            };
            if let Err(e) = callback.call2(&JsValue::NULL, &value, &JsValue::from_f64(index as f64)) {
                log::warn!("creation callback threw: {}", describe(&e));
            }
        }
    }

    fn clear(&self) {
        self.pending.borrow_mut().clear();
        self.zone_created.borrow_mut().take();
        self.lane_created.borrow_mut().take();
    }
}

fn view_for<K: ZoneKind>(
    mut editor: ZoneEditor<K>,
    surface: CanvasSurface,
    hooks: &Rc<Hooks>,
) -> EditorView<K, CanvasSurface> {
    let zone_hooks = Rc::clone(hooks);
    editor.on_zone_created(move |index, shape| zone_hooks.push_zone(index, shape));
    let lane_hooks = Rc::clone(hooks);
    editor.on_lane_created(move |zone, lane| lane_hooks.push_lane(zone, lane));
    EditorView::new(editor, surface, PaintStyle::default())
}

/// Run `f` on the editor from an event listener, then deliver callbacks.
fn dispatch(
    inner: &Weak<RefCell<Inner>>,
    hooks: &Weak<Hooks>,
    f: impl FnOnce(&mut Inner) -> HostResult<()>,
) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let result = match inner.try_borrow_mut() {
        Ok(mut guard) => f(&mut guard),
        Err(_) => {
            log::warn!("dropping re-entrant editor event");
            return;
        }
    };
    if let Err(e) = result {
        log::error!("editor event failed: {e}");
    }
    if let Some(hooks) = hooks.upgrade() {
        hooks.flush();
    }
}

fn local_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Point {
    let rect = canvas.get_bounding_client_rect();
    Point::new(
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    )
}

/// Element whose size the canvas follows: its parent, or itself.
fn container_of(canvas: &HtmlCanvasElement) -> Element {
    canvas
        .parent_element()
        .unwrap_or_else(|| canvas.clone().into())
}

/// Keys typed into form fields are not editor shortcuts.
fn typing_into_field(event: &Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<HtmlElement>().ok())
        .is_some_and(|el| {
            el.is_content_editable() || matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
        })
}

fn key_event(event: &KeyboardEvent) -> KeyEvent {
    KeyEvent {
        key: event.key(),
        modifiers: Modifiers {
            shift: event.shift_key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        },
        repeat: event.repeat(),
    }
}

/// Zone/lane editor attached to a canvas element.
///
/// Pointer-down is observed on the canvas; pointer move/up and keys are
/// observed on `window` so a gesture released outside the canvas still ends.
/// Every listener and the resize observer are removed by `destroy()` or when
/// the object is freed.
#[wasm_bindgen]
pub struct ZoneCanvas {
    inner: Rc<RefCell<Inner>>,
    hooks: Rc<Hooks>,
    listeners: Vec<ListenerGuard>,
    observer: Option<ObserverGuard>,
}

#[wasm_bindgen]
impl ZoneCanvas {
    /// `kind` is one of `rectangle`, `rectangle-lanes`, `polygon`,
    /// `polygon-lanes`. `config` is an optional `EditorConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, kind: &str, config: JsValue) -> Result<ZoneCanvas, JsValue> {
        Ok(Self::create(canvas_id, kind, config)?)
    }

    /// Bind, replace or drop the source image.
    #[wasm_bindgen(js_name = updateImage)]
    pub fn update_image(&self, image: Option<HtmlImageElement>) -> Result<(), JsValue> {
        let size = image.as_ref().map(|img| {
            Size::new(
                f64::from(img.natural_width()),
                f64::from(img.natural_height()),
            )
        });
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                v.surface_mut().set_image(image);
                v.bind_image(size)
            })?;
            Ok(())
        })?)
    }

    /// `"zone"` or `"lane"`.
    #[wasm_bindgen(js_name = setDrawMode)]
    pub fn set_draw_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = DrawMode::from_str(mode).map_err(HostError::Convert)?;
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                v.editor_mut().set_draw_mode(mode)?;
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    #[wasm_bindgen(js_name = drawMode)]
    pub fn draw_mode(&self) -> Result<String, JsValue> {
        let mode = self.with_inner(|inner| Ok(with_view!(&inner.view, v => v.editor().draw_mode())))?;
        Ok(match mode {
            DrawMode::Zone => "zone".to_string(),
            DrawMode::Lane => "lane".to_string(),
        })
    }

    /// Whether `setDrawMode("lane")` is accepted by this editor.
    #[wasm_bindgen(js_name = supportsLanes)]
    pub fn supports_lanes(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| Ok(with_view!(&inner.view, v => v.editor().supports_lanes())))?)
    }

    pub fn undo(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&mut inner.view, v => {
                let done = v.editor_mut().undo();
                v.repaint()?;
                done
            }))
        })?)
    }

    pub fn redo(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&mut inner.view, v => {
                let done = v.editor_mut().redo();
                v.repaint()?;
                done
            }))
        })?)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| Ok(with_view!(&inner.view, v => v.editor().can_undo())))?)
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| Ok(with_view!(&inner.view, v => v.editor().can_redo())))?)
    }

    /// Zones with their lanes, in image pixels.
    #[wasm_bindgen(js_name = getZones)]
    pub fn get_zones(&self) -> Result<JsValue, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&inner.view, v => serde_wasm_bindgen::to_value(v.editor().zones())?))
        })?)
    }

    /// Lanes as `{ zone, lane }`, in image pixels.
    #[wasm_bindgen(js_name = getLanes)]
    pub fn get_lanes(&self) -> Result<JsValue, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&inner.view, v => serde_wasm_bindgen::to_value(&v.editor().lanes())?))
        })?)
    }

    /// Zones with coordinates divided by the image's natural size.
    #[wasm_bindgen(js_name = getNormalizedZones)]
    pub fn get_normalized_zones(&self) -> Result<JsValue, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&inner.view, v => {
                serde_wasm_bindgen::to_value(&v.editor().normalized_zones()?)?
            }))
        })?)
    }

    #[wasm_bindgen(js_name = getNormalizedLanes)]
    pub fn get_normalized_lanes(&self) -> Result<JsValue, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&inner.view, v => {
                serde_wasm_bindgen::to_value(&v.editor().normalized_lanes()?)?
            }))
        })?)
    }

    /// Replace every zone from normalized coordinates (one undo step).
    #[wasm_bindgen(js_name = loadNormalizedZones)]
    pub fn load_normalized_zones(&self, data: JsValue) -> Result<(), JsValue> {
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                let zones = serde_wasm_bindgen::from_value(data)?;
                v.editor_mut().load_normalized(zones)?;
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    /// Replace every zone from image-pixel coordinates (one undo step).
    #[wasm_bindgen(js_name = setZones)]
    pub fn set_zones(&self, data: JsValue) -> Result<(), JsValue> {
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                let zones = serde_wasm_bindgen::from_value(data)?;
                v.editor_mut().set_zones(zones);
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    /// Normalized zones as a JSON string.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        Ok(self.with_inner(|inner| Ok(with_view!(&inner.view, v => v.editor().to_json()?)))?)
    }

    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&self, json: &str) -> Result<(), JsValue> {
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                v.editor_mut().load_json(json)?;
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&self) -> Result<(), JsValue> {
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                v.editor_mut().clear_all();
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    /// Clear zones and lanes (one undo step).
    #[wasm_bindgen(js_name = resetZones)]
    pub fn reset_zones(&self) -> Result<(), JsValue> {
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                v.editor_mut().reset_zones();
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    #[wasm_bindgen(js_name = deleteActiveZone)]
    pub fn delete_active_zone(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&mut inner.view, v => {
                let deleted = v.editor_mut().delete_active_zone();
                v.repaint()?;
                deleted
            }))
        })?)
    }

    #[wasm_bindgen(js_name = selectZone)]
    pub fn select_zone(&self, index: Option<u32>) -> Result<(), JsValue> {
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => {
                v.editor_mut().select_zone(index.map(|i| i as usize))?;
                v.repaint()
            })?;
            Ok(())
        })?)
    }

    #[wasm_bindgen(js_name = activeZone)]
    pub fn active_zone(&self) -> Result<Option<u32>, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&inner.view, v => v.editor().active_zone().map(|i| i as u32)))
        })?)
    }

    #[wasm_bindgen(js_name = hasZones)]
    pub fn has_zones(&self) -> Result<bool, JsValue> {
        Ok(self.with_inner(|inner| Ok(with_view!(&inner.view, v => v.editor().has_zones())))?)
    }

    #[wasm_bindgen(js_name = zoneCount)]
    pub fn zone_count(&self) -> Result<u32, JsValue> {
        Ok(self.with_inner(|inner| {
            Ok(with_view!(&inner.view, v => v.editor().zone_count() as u32))
        })?)
    }

    /// Partial `PaintStyle` object; missing fields keep their defaults.
    #[wasm_bindgen(js_name = setStyle)]
    pub fn set_style(&self, style: JsValue) -> Result<(), JsValue> {
        let style: PaintStyle = serde_wasm_bindgen::from_value(style).map_err(HostError::from)?;
        Ok(self.with_inner(|inner| {
            with_view!(&mut inner.view, v => v.set_style(style))?;
            Ok(())
        })?)
    }

    /// `callback(shape, index)` after each committed zone.
    #[wasm_bindgen(js_name = onZoneCreated)]
    pub fn on_zone_created(&self, callback: Option<js_sys::Function>) {
        *self.hooks.zone_created.borrow_mut() = callback;
    }

    #[wasm_bindgen(js_name = onRectangleCreated)]
    pub fn on_rectangle_created(&self, callback: Option<js_sys::Function>) {
        self.on_zone_created(callback);
    }

    #[wasm_bindgen(js_name = onPolygonCreated)]
    pub fn on_polygon_created(&self, callback: Option<js_sys::Function>) {
        self.on_zone_created(callback);
    }

    /// `callback(lane, zoneIndex)` after each committed lane.
    #[wasm_bindgen(js_name = onLaneCreated)]
    pub fn on_lane_created(&self, callback: Option<js_sys::Function>) {
        *self.hooks.lane_created.borrow_mut() = callback;
    }

    /// Remove every listener, clear the canvas and drop all state.
    ///
    /// Safe to call more than once; later calls to other methods are no-ops.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.observer = None;
        self.hooks.clear();
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => with_view!(&mut inner.view, v => v.destroy()),
            Err(_) => log::warn!("destroy called while an event was being handled"),
        }
    }
}

impl ZoneCanvas {
    fn create(canvas_id: &str, kind: &str, config: JsValue) -> HostResult<Self> {
        init_logging();
        let flavor = EditorFlavor::from_str(kind)?;
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let window = web_sys::window().ok_or(HostError::NoWindow)?;
        let document = window.document().ok_or(HostError::NoWindow)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| HostError::CanvasNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| HostError::NotACanvas(canvas_id.to_string()))?;

        let surface = CanvasSurface::new(canvas.clone())?;
        let hooks = Rc::new(Hooks::default());
        let view = match flavor {
            EditorFlavor::Rectangle => {
                AnyView::Rect(view_for(ZoneEditor::rectangles(config), surface, &hooks))
            }
            EditorFlavor::RectangleLanes => {
                AnyView::Rect(view_for(ZoneEditor::rectangles_with_lanes(config), surface, &hooks))
            }
            EditorFlavor::Polygon => {
                AnyView::Polygon(view_for(ZoneEditor::polygons(config), surface, &hooks))
            }
            EditorFlavor::PolygonLanes => {
                AnyView::Polygon(view_for(ZoneEditor::polygons_with_lanes(config), surface, &hooks))
            }
        };

        let mut this = Self {
            inner: Rc::new(RefCell::new(Inner {
                view,
                canvas: canvas.clone(),
            })),
            hooks,
            listeners: Vec::new(),
            observer: None,
        };
        this.attach(&window, &canvas)?;
        log::info!("{flavor:?} editor attached to #{canvas_id}");
        Ok(this)
    }

    /// Borrow the editor for an API call, then deliver callbacks.
    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> HostResult<T>) -> HostResult<T> {
        let result = {
            let mut inner = self.inner.try_borrow_mut().map_err(|_| HostError::Busy)?;
            f(&mut inner)
        };
        self.hooks.flush();
        result
    }

    fn attach(&mut self, window: &Window, canvas: &HtmlCanvasElement) -> HostResult<()> {
        let container = container_of(canvas);
        let initial = content_size(&container);
        self.with_inner(|inner| {
            with_view!(&mut inner.view, v => v.resize(initial))?;
            Ok(())
        })?;

        let weak = Rc::downgrade(&self.inner);
        let hooks = Rc::downgrade(&self.hooks);

        self.listeners.push(ListenerGuard::new(canvas, "pointerdown", {
            let (weak, hooks) = (weak.clone(), hooks.clone());
            move |raw: Event| {
                let Some(event) = raw.dyn_ref::<DomPointerEvent>() else {
                    return;
                };
                let Some(button) = MouseButton::from_dom(event.button()) else {
                    return;
                };
                raw.prevent_default();
                dispatch(&weak, &hooks, |inner| {
                    let position = local_position(&inner.canvas, event);
                    with_view!(&mut inner.view, v => v.pointer(PointerEvent::Down { position, button }))?;
                    Ok(())
                });
            }
        })?);

        self.listeners.push(ListenerGuard::new(window, "pointermove", {
            let (weak, hooks) = (weak.clone(), hooks.clone());
            move |raw: Event| {
                let Some(event) = raw.dyn_ref::<DomPointerEvent>() else {
                    return;
                };
                dispatch(&weak, &hooks, |inner| {
                    let position = local_position(&inner.canvas, event);
                    with_view!(&mut inner.view, v => v.pointer(PointerEvent::Move { position }))?;
                    Ok(())
                });
            }
        })?);

        for kind in ["pointerup", "pointercancel"] {
            self.listeners.push(ListenerGuard::new(window, kind, {
                let (weak, hooks) = (weak.clone(), hooks.clone());
                move |raw: Event| {
                    let Some(event) = raw.dyn_ref::<DomPointerEvent>() else {
                        return;
                    };
                    let button = MouseButton::from_dom(event.button()).unwrap_or(MouseButton::Left);
                    dispatch(&weak, &hooks, |inner| {
                        let position = local_position(&inner.canvas, event);
                        with_view!(&mut inner.view, v => v.pointer(PointerEvent::Up { position, button }))?;
                        Ok(())
                    });
                }
            })?);
        }

        self.listeners.push(ListenerGuard::new(window, "keydown", {
            let (weak, hooks) = (weak.clone(), hooks.clone());
            move |raw: Event| {
                let Some(event) = raw.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if typing_into_field(&raw) {
                    return;
                }
                let key = key_event(event);
                if matches!(
                    EditorCommand::from_key(&key),
                    Some(EditorCommand::Undo | EditorCommand::Redo)
                ) {
                    raw.prevent_default();
                }
                dispatch(&weak, &hooks, |inner| {
                    with_view!(&mut inner.view, v => v.key(&key))?;
                    Ok(())
                });
            }
        })?);

        self.observer = Some(ObserverGuard::new(&container, move |size| {
            dispatch(&weak, &hooks, |inner| {
                with_view!(&mut inner.view, v => v.resize(size))?;
                Ok(())
            });
        })?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_parsing() {
        assert_eq!(
            "rectangle".parse::<EditorFlavor>().unwrap(),
            EditorFlavor::Rectangle
        );
        assert_eq!(
            "polygon-lanes".parse::<EditorFlavor>().unwrap(),
            EditorFlavor::PolygonLanes
        );
        assert_eq!(
            "rectangle_lanes".parse::<EditorFlavor>().unwrap(),
            EditorFlavor::RectangleLanes
        );
        assert!(matches!(
            "circle".parse::<EditorFlavor>(),
            Err(HostError::UnknownKind(kind)) if kind == "circle"
        ));
    }
}
