//! Editor configuration.

use crate::history::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};

/// Tunables shared by every editor kind.
///
/// Tolerances marked "screen px" are converted to image space with the
/// mapper's inverse scale, so they feel the same at any zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum committed rectangle width and height (image px, exclusive).
    pub min_rect_size: f64,
    /// Vertex and body hit tolerance (screen px).
    pub hit_tolerance: f64,
    /// Distance to the first polygon vertex that closes the polygon (screen px).
    pub close_tolerance: f64,
    /// Minimum committed length of a boundary-constrained lane (image px, exclusive).
    pub min_lane_length: f64,
    /// Maximum number of retained history snapshots.
    pub history_limit: usize,
    /// Cooldown after a keyboard undo/redo, in milliseconds.
    pub action_lock_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_rect_size: 10.0,
            hit_tolerance: 10.0,
            close_tolerance: 15.0,
            min_lane_length: 5.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            action_lock_ms: 300,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!((config.min_rect_size - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.action_lock_ms, 300);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "history_limit": 5 }"#).unwrap();
        assert_eq!(config.history_limit, 5);
        assert!((config.close_tolerance - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = EditorConfig::default();
        config.hit_tolerance = 6.0;
        let json = config.to_json().unwrap();
        assert_eq!(EditorConfig::from_json(&json).unwrap(), config);
    }
}
