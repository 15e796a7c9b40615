//! Error types shared by the registry, renderers and native plots.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = VisualizerError> = std::result::Result<T, E>;

/// Errors raised by visualizer operations.
///
/// Every error is raised synchronously at the call that caused it; nothing is
/// retried.
#[derive(Debug, Error)]
pub enum VisualizerError {
    /// A figure identifier was not a string, integer or finite float.
    #[error("invalid identifier type for the figure: {0}")]
    InvalidIdentifier(String),
    /// Native plot data did not match the configured line count.
    #[error("invalid data length: expected {expected} series, got {actual}")]
    InvalidSeriesLength {
        /// Configured number of lines.
        expected: usize,
        /// Number of values or series supplied.
        actual: usize,
    },
    /// Raster data did not match its declared shape.
    #[error("invalid image shape: {0}")]
    ImageShape(String),
    /// A plot kind name outside the supported set.
    #[error("unknown plot kind `{0}`")]
    UnknownPlotKind(String),
    /// A color that is neither a known name nor a hex literal.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// A malformed `[color][marker][line]` format string.
    #[error("invalid format string `{0}`")]
    InvalidFormat(String),
    /// Plot arguments that cannot be drawn (length mismatch, empty data, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An image could not be encoded for display.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl VisualizerError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
