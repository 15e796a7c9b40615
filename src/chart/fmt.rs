//! `[color][marker][line]` format strings such as `"ro--"`.

use crate::color::{Rgba8, base_color};
use crate::error::{Result, VisualizerError};
use crate::render::{LineDash, MarkerShape};

/// Parsed format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSpec {
    /// Color from a base color letter.
    pub color: Option<Rgba8>,
    /// Marker shape.
    pub marker: Option<MarkerShape>,
    /// Line dash. `None` means the string named no line style.
    pub dash: Option<LineDash>,
}

impl FormatSpec {
    /// Parse a format string. The three parts may appear in any order.
    pub fn parse(fmt: &str) -> Result<Self> {
        let invalid = || VisualizerError::InvalidFormat(fmt.to_string());
        let mut spec = Self::default();
        let mut rest = fmt;
        while !rest.is_empty() {
            if let Some((dash, tail)) = strip_line(rest) {
                if spec.dash.replace(dash).is_some() {
                    return Err(invalid());
                }
                rest = tail;
                continue;
            }
            let mut chars = rest.chars();
            let Some(ch) = chars.next() else {
                break;
            };
            if let Some(shape) = marker_shape(ch) {
                if spec.marker.replace(shape).is_some() {
                    return Err(invalid());
                }
            } else if let Some(color) = base_color(ch) {
                if spec.color.replace(color).is_some() {
                    return Err(invalid());
                }
            } else {
                return Err(invalid());
            }
            rest = chars.as_str();
        }
        Ok(spec)
    }

    /// Line dash to draw, if any.
    ///
    /// A marker without a line style draws markers only; an empty string
    /// draws a solid line.
    pub fn line(&self) -> Option<LineDash> {
        match (self.dash, self.marker) {
            (Some(dash), _) => Some(dash),
            (None, Some(_)) => None,
            (None, None) => Some(LineDash::Solid),
        }
    }
}

fn strip_line(text: &str) -> Option<(LineDash, &str)> {
    for (prefix, dash) in [
        ("--", LineDash::Dashed),
        ("-.", LineDash::DashDot),
        ("-", LineDash::Solid),
        (":", LineDash::Dotted),
    ] {
        if let Some(tail) = text.strip_prefix(prefix) {
            return Some((dash, tail));
        }
    }
    None
}

pub(crate) fn marker_shape(ch: char) -> Option<MarkerShape> {
    Some(match ch {
        'o' => MarkerShape::Circle,
        '.' => MarkerShape::Dot,
        's' => MarkerShape::Square,
        'x' => MarkerShape::Cross,
        '+' => MarkerShape::Plus,
        '*' => MarkerShape::Star,
        'd' | 'D' => MarkerShape::Diamond,
        '^' => MarkerShape::TriangleUp,
        'v' => MarkerShape::TriangleDown,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_color_marker_and_line() {
        let spec = FormatSpec::parse("ro--").expect("valid format");
        assert_eq!(spec.color, base_color('r'));
        assert_eq!(spec.marker, Some(MarkerShape::Circle));
        assert_eq!(spec.line(), Some(LineDash::Dashed));
    }

    #[test]
    fn order_does_not_matter() {
        let a = FormatSpec::parse("--og").expect("valid format");
        let b = FormatSpec::parse("go--").expect("valid format");
        assert_eq!(a, b);
    }

    #[test]
    fn marker_alone_hides_the_line() {
        let spec = FormatSpec::parse("o").expect("valid format");
        assert_eq!(spec.line(), None);
        assert_eq!(FormatSpec::parse("").expect("empty").line(), Some(LineDash::Solid));
        assert_eq!(
            FormatSpec::parse("b-.").expect("valid format").line(),
            Some(LineDash::DashDot)
        );
        assert_eq!(FormatSpec::parse("g:").expect("valid").line(), Some(LineDash::Dotted));
    }

    #[test]
    fn rejects_unknown_and_repeated_parts() {
        for bad in ["q", "rr", "o.", "---", "r-:"] {
            assert!(
                matches!(FormatSpec::parse(bad), Err(VisualizerError::InvalidFormat(_))),
                "{bad}"
            );
        }
    }
}
