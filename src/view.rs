//! View models and data ranges.

use serde::{Deserialize, Serialize};

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Smallest range containing every finite value, if any.
    pub fn of_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut range: Option<Range> = None;
        for value in values {
            if !value.is_finite() {
                continue;
            }
            match range.as_mut() {
                None => range = Some(Range::new(value, value)),
                Some(existing) => existing.expand_to_include(value),
            }
        }
        range
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the range.
    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether the range has positive span and finite bounds.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.span() > 0.0
    }

    /// Expand the range to include a value.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Union two ranges if both are finite.
    pub fn union(a: Self, b: Self) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        Some(Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        })
    }

    /// Add padding around the range.
    pub fn padded(&self, frac: f64, min_padding: f64) -> Self {
        let span = self.span().abs();
        let padding = (span * frac).max(min_padding);
        Self {
            min: self.min - padding,
            max: self.max + padding,
        }
    }

    /// Ensure the range has at least the given span.
    pub fn with_min_span(&self, min_span: f64) -> Self {
        let span = self.span();
        if span >= min_span {
            return *self;
        }
        let center = self.center();
        let half = min_span * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Range of the given half-width centered on `center`.
    pub fn centered(center: f64, half_width: f64) -> Self {
        Self::new(center - half_width, center + half_width)
    }
}

/// Aspect ratio mode of a figure's axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    /// Axes stretch to fill the plot area.
    #[default]
    Auto,
    /// One data unit has the same on-screen length on every axis.
    Equal,
}

/// Visible data ranges on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// X axis range.
    pub x: Range,
    /// Y axis range.
    pub y: Range,
}

impl Viewport {
    /// Create a viewport from X and Y ranges.
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Check whether both axes are valid.
    pub fn is_valid(&self) -> bool {
        self.x.is_valid() && self.y.is_valid()
    }

    /// Apply padding to both axes.
    pub fn padded(&self, frac: f64, min_padding: f64) -> Self {
        Self {
            x: self.x.padded(frac, min_padding),
            y: self.y.padded(frac, min_padding),
        }
    }

    /// Widen the shorter axis so both axes share one data-per-pixel ratio.
    pub fn with_equal_aspect(&self, width_px: f32, height_px: f32) -> Self {
        if width_px <= 0.0 || height_px <= 0.0 || !self.is_valid() {
            return *self;
        }
        let per_px_x = self.x.span() / f64::from(width_px);
        let per_px_y = self.y.span() / f64::from(height_px);
        let per_px = per_px_x.max(per_px_y);
        Self {
            x: Range::centered(self.x.center(), per_px * f64::from(width_px) * 0.5),
            y: Range::centered(self.y.center(), per_px * f64::from(height_px) * 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_min_span_expands() {
        let range = Range::new(2.0, 2.0);
        let expanded = range.with_min_span(1.0);
        assert!(expanded.span() >= 1.0);
        assert!((expanded.min + expanded.max) * 0.5 - 2.0 < 1e-9);
    }

    #[test]
    fn of_values_skips_non_finite() {
        let range = Range::of_values([3.0, f64::NAN, -1.0, f64::INFINITY]).expect("finite values");
        assert_eq!(range, Range::new(-1.0, 3.0));
        assert!(Range::of_values([f64::NAN]).is_none());
    }

    #[test]
    fn equal_aspect_widens_shorter_axis() {
        let viewport = Viewport::new(Range::new(0.0, 10.0), Range::new(0.0, 1.0));
        let equal = viewport.with_equal_aspect(200.0, 100.0);
        assert!((equal.x.span() - 10.0).abs() < 1e-9);
        assert!((equal.y.span() - 5.0).abs() < 1e-9);
        assert!((equal.y.center() - 0.5).abs() < 1e-9);
    }
}
