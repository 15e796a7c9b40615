//! Settings of a [`Visualizer`](crate::Visualizer).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::style::Theme;

/// Visualizer settings.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use gpui_visualizer::VisualizerConfig;
///
/// let config = VisualizerConfig::from_json_str(r#"{"default_backend_if_agg": "Qt5Agg"}"#)
///     .expect("valid settings");
/// assert_eq!(config.default_backend_if_agg, "Qt5Agg");
/// assert_eq!(config.figsize, [6.4, 4.8]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Backend restored on release when the backend active at acquire time was `agg`.
    pub default_backend_if_agg: String,
    /// Default figure size, in units.
    pub figsize: [f64; 2],
    /// Default pixels per unit.
    pub ppu: f64,
    /// Default sliding window length of native plots.
    pub native_window_size: usize,
    pub native_theme: Theme,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            default_backend_if_agg: "TkAgg".to_string(),
            figsize: [6.4, 4.8],
            ppu: 100.0,
            native_window_size: 250,
            native_theme: Theme::Light,
        }
    }
}

impl VisualizerConfig {
    /// Parse settings from JSON, filling omitted fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisualizerError;

    #[test]
    fn empty_document_yields_defaults() {
        let config = VisualizerConfig::from_json_str("{}").expect("valid settings");
        assert_eq!(config, VisualizerConfig::default());
        assert_eq!(config.default_backend_if_agg, "TkAgg");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            VisualizerConfig::from_json_str(r#"{"ppu": 50, "native_theme": "dark"}"#)
                .expect("valid settings");
        assert_eq!(config.ppu, 50.0);
        assert_eq!(config.native_theme, Theme::Dark);
        assert_eq!(config.native_window_size, 250);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = VisualizerConfig::from_json_str("{\"ppu\": \"fast\"}").expect_err("bad type");
        assert!(matches!(err, VisualizerError::Config(_)));
    }
}
