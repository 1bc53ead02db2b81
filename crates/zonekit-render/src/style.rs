//! Paint colors and sizes.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// RGBA color that survives a JSON round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// How zones, lanes and drafts are painted.
///
/// Widths and sizes are screen pixels, so they stay constant when the image
/// is scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintStyle {
    /// Fill behind the image; `None` leaves the surface transparent.
    pub background: Option<SerializableColor>,
    pub zone_stroke: SerializableColor,
    pub zone_fill: SerializableColor,
    pub active_stroke: SerializableColor,
    pub active_fill: SerializableColor,
    pub draft_stroke: SerializableColor,
    /// Ring around the first polygon vertex when a click would close it.
    pub close_hint: SerializableColor,
    pub lane_stroke: SerializableColor,
    pub handle_fill: SerializableColor,
    pub handle_stroke: SerializableColor,
    pub zone_width: f64,
    pub lane_width: f64,
    pub handle_radius: f64,
    /// Arrowhead length at a lane's end.
    pub arrow_size: f64,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            background: None,
            zone_stroke: SerializableColor::new(59, 130, 246, 255),
            zone_fill: SerializableColor::new(59, 130, 246, 40),
            active_stroke: SerializableColor::new(234, 88, 12, 255),
            active_fill: SerializableColor::new(234, 88, 12, 50),
            draft_stroke: SerializableColor::new(16, 185, 129, 255),
            close_hint: SerializableColor::new(250, 204, 21, 255),
            lane_stroke: SerializableColor::new(220, 38, 38, 255),
            handle_fill: SerializableColor::new(255, 255, 255, 255),
            handle_stroke: SerializableColor::new(59, 130, 246, 255),
            zone_width: 2.0,
            lane_width: 2.0,
            handle_radius: 5.0,
            arrow_size: 12.0,
        }
    }
}

impl PaintStyle {
    /// Parse a style from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
