//! Editor error types.

use thiserror::Error;

/// Errors returned by programmatic editor calls.
///
/// Interactive gestures never produce errors; degenerate input is discarded.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no source image is bound; normalized coordinates need image dimensions")]
    MissingImage,
    #[error("this editor does not support lanes")]
    LanesUnsupported,
    #[error("zone index {index} out of range ({count} zones)")]
    ZoneOutOfRange { index: usize, count: usize },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
