//! Host errors and their JavaScript form.

use js_sys::Reflect;
use thiserror::Error;
use wasm_bindgen::JsValue;
use zonekit_core::EditorError;
use zonekit_render::SurfaceError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("No browser window available")]
    NoWindow,
    #[error("Canvas element '{0}' not found")]
    CanvasNotFound(String),
    #[error("Element '{0}' is not a <canvas>")]
    NotACanvas(String),
    #[error("Unknown editor kind '{0}'")]
    UnknownKind(String),
    #[error("Failed to register '{kind}' listener: {message}")]
    Listener { kind: &'static str, message: String },
    #[error("Invalid argument: {0}")]
    Convert(String),
    #[error("Editor is busy handling another event")]
    Busy,
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl HostError {
    /// Stable identifier exposed to JavaScript as `error.code`.
    pub fn code(&self) -> &'static str {
        match self {
            HostError::NoWindow => "no_window",
            HostError::CanvasNotFound(_) => "canvas_not_found",
            HostError::NotACanvas(_) => "not_a_canvas",
            HostError::UnknownKind(_) => "unknown_kind",
            HostError::Listener { .. } => "listener",
            HostError::Convert(_) => "invalid_argument",
            HostError::Busy => "busy",
            HostError::Editor(EditorError::MissingImage) => "missing_image",
            HostError::Editor(EditorError::LanesUnsupported) => "lanes_unsupported",
            HostError::Editor(EditorError::ZoneOutOfRange { .. }) => "zone_out_of_range",
            HostError::Editor(EditorError::Serialization(_)) => "serialization",
            HostError::Surface(_) => "surface",
        }
    }
}

impl From<serde_wasm_bindgen::Error> for HostError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        HostError::Convert(err.to_string())
    }
}

impl From<HostError> for JsValue {
    fn from(err: HostError) -> Self {
        let js = js_sys::Error::new(&err.to_string());
        let _ = Reflect::set(&js, &JsValue::from_str("code"), &JsValue::from_str(err.code()));
        js.into()
    }
}

/// Best-effort message from a thrown JavaScript value.
pub fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

pub type HostResult<T> = Result<T, HostError>;
