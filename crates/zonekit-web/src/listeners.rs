//! Scoped DOM registrations, removed when dropped.

use crate::error::{HostError, HostResult, describe};
use js_sys::Array;
use kurbo::Size;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, Event, EventTarget, ResizeObserver, ResizeObserverEntry};

/// An event listener that unregisters itself on drop.
pub struct ListenerGuard {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl ListenerGuard {
    pub fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> HostResult<Self> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|e| HostError::Listener {
                kind,
                message: describe(&e),
            })?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove '{}' listener: {}", self.kind, describe(&e));
        }
    }
}

/// Content-box size of `element`, the same box `ResizeObserver` reports.
pub fn content_size(element: &Element) -> Size {
    let client = Size::new(
        f64::from(element.client_width()),
        f64::from(element.client_height()),
    );
    let padding = web_sys::window()
        .and_then(|window| window.get_computed_style(element).ok().flatten())
        .map(|style| {
            let px = |name: &str| {
                style
                    .get_property_value(name)
                    .map(|value| parse_px(&value))
                    .unwrap_or(0.0)
            };
            Size::new(
                px("padding-left") + px("padding-right"),
                px("padding-top") + px("padding-bottom"),
            )
        })
        .unwrap_or(Size::ZERO);
    strip_padding(client, padding)
}

/// Parse a computed CSS length such as `"12.5px"`; anything else is 0.
fn parse_px(value: &str) -> f64 {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .parse()
        .unwrap_or(0.0)
}

fn strip_padding(client: Size, padding: Size) -> Size {
    Size::new(
        (client.width - padding.width).max(0.0),
        (client.height - padding.height).max(0.0),
    )
}

/// A `ResizeObserver` on one element, disconnected on drop.
pub struct ObserverGuard {
    observer: ResizeObserver,
    _closure: Closure<dyn FnMut(Array)>,
}

impl ObserverGuard {
    /// Report the content-box size of `target` whenever it changes.
    pub fn new(target: &Element, mut handler: impl FnMut(Size) + 'static) -> HostResult<Self> {
        let closure = Closure::<dyn FnMut(Array)>::new(move |entries: Array| {
            // Only the latest size matters.
            let last = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<ResizeObserverEntry>().ok())
                .last();
            if let Some(entry) = last {
                let rect = entry.content_rect();
                handler(Size::new(rect.width(), rect.height()));
            }
        });
        let observer =
            ResizeObserver::new(closure.as_ref().unchecked_ref()).map_err(|e| HostError::Listener {
                kind: "resize",
                message: describe(&e),
            })?;
        observer.observe(target);
        Ok(Self {
            observer,
            _closure: closure,
        })
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
