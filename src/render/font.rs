//! Glyph rasterization for tick labels and titles.
//!
//! Glyphs come from a system sans-serif font rasterized with `fontdue` and
//! cached per character and size. Without a usable font text is skipped.

use std::collections::HashMap;
use std::sync::OnceLock;

use fontdue::{Font, FontSettings, Metrics};
use log::{debug, warn};

#[cfg(target_os = "linux")]
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

#[cfg(target_os = "macos")]
const FONT_PATHS: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/HelveticaNeue.ttc",
];

#[cfg(target_os = "windows")]
const FONT_PATHS: &[&str] = &[
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\calibri.ttf",
];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const FONT_PATHS: &[&str] = &[];

static FONT: OnceLock<Option<Font>> = OnceLock::new();

/// The shared label font, loaded on first use.
pub(super) fn system_font() -> Option<&'static Font> {
    FONT.get_or_init(load_font).as_ref()
}

fn load_font() -> Option<Font> {
    for path in FONT_PATHS {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        match Font::from_bytes(data, FontSettings::default()) {
            Ok(font) => {
                debug!("label font loaded from {path}");
                return Some(font);
            }
            Err(err) => debug!("cannot parse font {path}: {err}"),
        }
    }
    warn!("no system font found; figure text will not be drawn");
    None
}

type GlyphData = (Metrics, Vec<u8>);

/// Coverage bitmaps keyed by character and half-pixel size.
#[derive(Debug, Clone, Default)]
pub(super) struct GlyphCache {
    glyphs: HashMap<(char, u32), GlyphData>,
}

impl GlyphCache {
    pub(super) fn glyph(&mut self, font: &Font, ch: char, size: f32) -> &GlyphData {
        let key = (ch, (size * 2.0).round() as u32);
        self.glyphs
            .entry(key)
            .or_insert_with(|| font.rasterize(ch, key.1 as f32 * 0.5))
    }
}

/// Distance from the top of a line to its baseline.
pub(super) fn ascent(font: &Font, size: f32) -> f32 {
    font.horizontal_line_metrics(size)
        .map_or(size * 0.8, |metrics| metrics.ascent)
}

/// Width and height of a single line of text in pixels.
pub(super) fn text_extent(font: &Font, text: &str, size: f32) -> (f32, f32) {
    if text.is_empty() {
        return (0.0, 0.0);
    }
    let width = text
        .chars()
        .map(|ch| font.metrics(ch, size).advance_width)
        .sum();
    let height = font
        .horizontal_line_metrics(size)
        .map_or(size, |metrics| metrics.ascent - metrics.descent);
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_and_uppercase_glyphs_differ() {
        let Some(font) = system_font() else {
            return;
        };
        let mut cache = GlyphCache::default();
        let lower = cache.glyph(font, 'd', 16.0).clone();
        let upper = cache.glyph(font, 'D', 16.0).clone();
        assert_ne!(lower.1, upper.1);
        assert!(lower.1.iter().any(|coverage| *coverage > 0));
    }

    #[test]
    fn extent_grows_with_size() {
        let Some(font) = system_font() else {
            return;
        };
        let (small_w, small_h) = text_extent(font, "decay", 10.0);
        let (large_w, large_h) = text_extent(font, "decay", 20.0);
        assert!(large_w > small_w && small_w > 0.0);
        assert!(large_h > small_h);
        assert_eq!(text_extent(font, "", 12.0), (0.0, 0.0));
    }
}
