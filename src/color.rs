//! Named colors, hex parsing and packing into host color values.
//!
//! Colors follow the familiar plotting conventions: CSS4 names, single-letter
//! base colors (`"r"`, `"k"`, ...), `tab:` colors and `#rgb` / `#rrggbb` /
//! `#rrggbbaa` literals.

use crate::error::{Result, VisualizerError};
use crate::render::Color;

/// Default line palette for native plots when no matching color list is given.
pub const DEFAULT_LINE_PALETTE: &[&str] = &[
    "red", "green", "blue", "orange", "cyan", "magenta", "yellow", "white", "aliceblue",
    "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black", "blanchedalmond",
    "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse", "chocolate", "coral",
    "cornflowerblue", "cornsilk", "crimson", "darkblue", "darkcyan", "darkgoldenrod", "darkgray",
    "darkgreen", "darkgrey", "darkkhaki", "darkmagenta", "darkolivegreen", "darkorange",
    "darkorchid", "darkred", "darksalmon", "darkseagreen", "darkslateblue", "darkslategray",
    "darkslategrey", "darkturquoise", "darkviolet", "deeppink", "deepskyblue", "dimgray",
    "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen", "fuchsia", "gainsboro",
    "ghostwhite", "gold", "goldenrod", "gray", "greenyellow", "grey", "honeydew", "hotpink",
    "indianred", "indigo", "ivory", "khaki", "lavender", "lavenderblush", "lawngreen",
    "lemonchiffon", "lightblue", "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray",
    "lightgreen", "lightgrey", "lightpink", "lightsalmon", "lightseagreen", "lightskyblue",
    "lightslategray", "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen",
    "linen", "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise", "mediumvioletred",
    "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite", "navy", "oldlace",
    "olive", "olivedrab", "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise",
    "palevioletred", "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple",
    "rebeccapurple", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen",
    "seashell", "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow",
    "springgreen", "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet", "wheat",
    "whitesmoke", "yellowgreen",
];

/// Default color cycle for rasterized figures.
pub const TAB10: [u32; 10] = [
    0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f, 0xbcbd22,
    0x17becf,
];

const TAB_NAMES: [&str; 10] = [
    "blue", "orange", "green", "red", "purple", "brown", "pink", "gray", "olive", "cyan",
];

const BASE_COLORS: [(char, u32); 8] = [
    ('b', 0x0000ff),
    ('g', 0x008000),
    ('r', 0xff0000),
    ('c', 0x00bfbf),
    ('m', 0xbf00bf),
    ('y', 0xbfbf00),
    ('k', 0x000000),
    ('w', 0xffffff),
];

const CSS4: &[(&str, u32)] = &[
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

/// An 8-bit RGBA color as parsed from a color specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from a `0xRRGGBB` value.
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 0xff,
        }
    }

    /// Pack into the host's `0xAABBGGRR` layout with alpha forced to opaque.
    pub fn packed_abgr(self) -> u32 {
        0xff00_0000 | (u32::from(self.b) << 16) | (u32::from(self.g) << 8) | u32::from(self.r)
    }

    /// Unpack from the host's `0xAABBGGRR` layout.
    pub fn from_packed_abgr(packed: u32) -> Self {
        Self {
            r: (packed & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: ((packed >> 16) & 0xff) as u8,
            a: ((packed >> 24) & 0xff) as u8,
        }
    }

    /// Replace the alpha channel.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }
}

impl From<Rgba8> for Color {
    fn from(value: Rgba8) -> Self {
        Color::new(
            f32::from(value.r) / 255.0,
            f32::from(value.g) / 255.0,
            f32::from(value.b) / 255.0,
            f32::from(value.a) / 255.0,
        )
    }
}

/// Parse a color specification.
///
/// Accepts `#rgb`/`#rrggbb`/`#rrggbbaa` hex, `tab:` names, `C0`-style cycle
/// references, grayscale levels such as `"0.5"`, base letters and CSS4 names.
pub fn parse_color(spec: &str) -> Result<Rgba8> {
    let trimmed = spec.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| VisualizerError::InvalidColor(spec.to_string()));
    }
    let lower = trimmed.to_ascii_lowercase();
    if let Some(name) = lower.strip_prefix("tab:") {
        return TAB_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| Rgba8::from_rgb_u32(TAB10[index]))
            .ok_or_else(|| VisualizerError::InvalidColor(spec.to_string()));
    }
    if let Some(index) = lower.strip_prefix('c').and_then(|n| n.parse::<usize>().ok()) {
        return Ok(cycle_color(index));
    }
    if let Ok(level) = lower.parse::<f64>() {
        // Grayscale level as a string, "0.0" black to "1.0" white.
        if !(0.0..=1.0).contains(&level) {
            return Err(VisualizerError::InvalidColor(spec.to_string()));
        }
        let gray = (level * 255.0).round() as u8;
        return Ok(Rgba8::new(gray, gray, gray, 0xff));
    }
    let mut chars = lower.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if let Some(color) = base_color(letter) {
            return Ok(color);
        }
    }
    CSS4.binary_search_by(|(name, _)| (*name).cmp(lower.as_str()))
        .map(|index| Rgba8::from_rgb_u32(CSS4[index].1))
        .map_err(|_| VisualizerError::InvalidColor(spec.to_string()))
}

/// Look up a single-letter base color.
pub(crate) fn base_color(letter: char) -> Option<Rgba8> {
    BASE_COLORS
        .iter()
        .find(|(c, _)| *c == letter)
        .map(|(_, rgb)| Rgba8::from_rgb_u32(*rgb))
}

/// Resolve the packed colors for `lines` native plot lines.
///
/// The requested names are used only when there is exactly one per line;
/// otherwise the first `lines` entries of [`DEFAULT_LINE_PALETTE`] are used.
pub fn line_colors<S: AsRef<str>>(lines: usize, requested: &[S]) -> Result<Vec<u32>> {
    if requested.len() == lines {
        requested
            .iter()
            .map(|name| parse_color(name.as_ref()).map(Rgba8::packed_abgr))
            .collect()
    } else {
        DEFAULT_LINE_PALETTE
            .iter()
            .cycle()
            .take(lines)
            .map(|name| parse_color(name).map(Rgba8::packed_abgr))
            .collect()
    }
}

/// Color of the `index`-th series in the default property cycle.
pub(crate) fn cycle_color(index: usize) -> Rgba8 {
    Rgba8::from_rgb_u32(TAB10[index % TAB10.len()])
}

const VIRIDIS: [u32; 9] = [
    0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
];

/// Sample the viridis colormap at `t` in `0.0..=1.0`.
pub(crate) fn viridis(t: f64) -> Rgba8 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - index as f64;
    let a = Rgba8::from_rgb_u32(VIRIDIS[index]);
    let b = Rgba8::from_rgb_u32(VIRIDIS[index + 1]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
    Rgba8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), 0xff)
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    let digit = |index: usize| -> Option<u8> {
        hex.get(index..index + 1)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
    };
    let byte = |index: usize| -> Option<u8> {
        hex.get(index..index + 2)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
    };
    match hex.len() {
        3 => Some(Rgba8::new(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
            0xff,
        )),
        6 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, 0xff)),
        8 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css4_table_is_sorted_for_binary_search() {
        assert!(CSS4.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn palette_names_are_all_known() {
        for name in DEFAULT_LINE_PALETTE {
            assert!(parse_color(name).is_ok(), "unknown palette color {name}");
        }
    }

    #[test]
    fn packs_named_colors_as_abgr() {
        let packed = |name: &str| parse_color(name).expect("known color").packed_abgr();
        assert_eq!(packed("pink"), 0xFFCBC0FF);
        assert_eq!(packed("lime"), 0xFF00FF00);
        assert_eq!(packed("skyblue"), 0xFFEBCE87);
    }

    #[test]
    fn parses_hex_and_shorthand() {
        let parse = |spec: &str| parse_color(spec).expect("valid color");
        assert_eq!(parse("#ff8000"), Rgba8::new(255, 128, 0, 255));
        assert_eq!(parse("#0f0"), Rgba8::new(0, 255, 0, 255));
        assert_eq!(parse("#11223344"), Rgba8::new(0x11, 0x22, 0x33, 0x44));
        assert_eq!(parse("k"), Rgba8::new(0, 0, 0, 255));
        assert_eq!(parse("tab:orange"), Rgba8::from_rgb_u32(0xff7f0e));
    }

    #[test]
    fn parses_cycle_references_and_gray_levels() {
        let parse = |spec: &str| parse_color(spec).expect("valid color");
        assert_eq!(parse("C0"), Rgba8::from_rgb_u32(0x1f77b4));
        assert_eq!(parse("C1"), parse("tab:orange"));
        assert_eq!(parse("c9"), cycle_color(9));
        assert_eq!(parse("0.5"), Rgba8::new(128, 128, 128, 255));
        assert_eq!(parse("0"), Rgba8::new(0, 0, 0, 255));
        assert_eq!(parse("1.0"), Rgba8::new(255, 255, 255, 255));
        assert!(matches!(
            parse_color("1.5"),
            Err(VisualizerError::InvalidColor(_))
        ));
        assert!(parse_color("C").is_err());
        assert_eq!(parse("coral"), Rgba8::from_rgb_u32(0xff7f50));
    }

    #[test]
    fn rejects_unknown_colors() {
        assert!(matches!(
            parse_color("not-a-color"),
            Err(VisualizerError::InvalidColor(_))
        ));
        assert!(parse_color("#12345").is_err());
    }

    #[test]
    fn viridis_spans_dark_purple_to_yellow() {
        assert_eq!(viridis(0.0), Rgba8::from_rgb_u32(0x440154));
        assert_eq!(viridis(1.0), Rgba8::from_rgb_u32(0xfde725));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
        assert_eq!(cycle_color(10), cycle_color(0));
    }

    #[test]
    fn mismatched_color_count_falls_back_to_palette() {
        let colors = line_colors(2, &["pink"]).expect("palette colors");
        assert_eq!(colors[0], parse_color("red").expect("known color").packed_abgr());
        assert_eq!(colors[1], parse_color("green").expect("known color").packed_abgr());
    }
}
