//! Style and theming.

use serde::{Deserialize, Serialize};

use crate::render::Color;

/// Visual theme for native plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light gray background.
    #[default]
    Light,
    /// Dark gray background.
    Dark,
}

impl Theme {
    /// Background color packed as `0xAABBGGRR`.
    pub fn background_packed(self) -> u32 {
        match self {
            Self::Light => 0xFFDD_DDDD,
            Self::Dark => 0xFF55_5555,
        }
    }

    /// Background color.
    pub fn background(self) -> Color {
        Color::from_packed_abgr(self.background_packed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_backgrounds_match_host_values() {
        assert_eq!(Theme::Light.background_packed(), 0xFFDDDDDD);
        assert_eq!(Theme::Dark.background_packed(), 0xFF555555);
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn theme_parses_from_lowercase_names() {
        let theme: Theme = serde_json::from_str("\"dark\"").expect("valid theme");
        assert_eq!(theme, Theme::Dark);
    }
}
