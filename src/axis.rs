//! Axis configuration, scaling, tick placement and formatting.

use std::sync::Arc;

use crate::view::Range;

const NICE_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];

/// Axis scale type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    /// Linear scaling.
    #[default]
    Linear,
    /// Base-10 logarithmic scaling.
    Log10,
}

impl AxisScale {
    /// Map a value into axis space.
    pub fn map_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Linear => Some(value),
            Self::Log10 => {
                if value <= 0.0 {
                    None
                } else {
                    Some(value.log10())
                }
            }
        }
    }

    /// Invert a value from axis space back into data space.
    pub fn invert_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Linear => Some(value),
            Self::Log10 => Some(10_f64.powf(value)),
        }
    }

    /// Check whether a data range is valid for this scale.
    pub fn is_range_valid(self, range: Range) -> bool {
        if !range.is_finite() {
            return false;
        }
        match self {
            Self::Linear => true,
            Self::Log10 => range.min > 0.0 && range.max > 0.0,
        }
    }

    /// Tick positions inside `range`, aiming for at most `max_ticks` ticks.
    pub fn ticks(self, range: Range, max_ticks: usize) -> Vec<f64> {
        match self {
            Self::Linear => linear_ticks(range, max_ticks),
            Self::Log10 => {
                let decades = log_ticks(range);
                if decades.len() >= 2 {
                    decades
                } else {
                    linear_ticks(range, max_ticks)
                }
            }
        }
    }
}

/// Formatter for axis tick labels.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Compact numeric formatter.
    #[default]
    Default,
    /// Custom formatter callback.
    Custom(Arc<dyn Fn(f64) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Format a value for display.
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Default => format_compact(value),
            Self::Custom(formatter) => formatter(value),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "AxisFormatter::Default"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

/// Axis configuration shared across all series drawn on one axes.
#[derive(Debug, Clone, Default)]
pub struct AxisConfig {
    scale: AxisScale,
    label: Option<String>,
    limits: Option<Range>,
    formatter: AxisFormatter,
}

impl AxisConfig {
    /// Create a new axis configuration.
    pub fn new(scale: AxisScale) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Create a linear axis configuration.
    pub fn linear() -> Self {
        Self::new(AxisScale::Linear)
    }

    /// Create a log10 axis configuration.
    pub fn log10() -> Self {
        Self::new(AxisScale::Log10)
    }

    /// Access the axis scale.
    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    /// Set the axis scale.
    pub fn with_scale(mut self, scale: AxisScale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the axis label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Fix the axis limits instead of fitting them to the data.
    pub fn with_limits(mut self, limits: Range) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set the axis formatter.
    pub fn with_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Access the axis label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Access the fixed limits, if any.
    pub fn limits(&self) -> Option<Range> {
        self.limits
    }

    /// Access the formatter.
    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }
}

/// Format a number with at most three decimals and no trailing zeros.
pub(crate) fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e5).contains(&magnitude) {
        return format!("{value:.0e}");
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn nice_step(span: f64, max_ticks: usize) -> f64 {
    let raw = span / max_ticks.max(1) as f64;
    let magnitude = 10_f64.powf(raw.log10().floor());
    NICE_STEPS
        .iter()
        .map(|step| step * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude)
}

fn linear_ticks(range: Range, max_ticks: usize) -> Vec<f64> {
    if !range.is_valid() {
        return if range.is_finite() {
            vec![range.min]
        } else {
            Vec::new()
        };
    }
    let step = nice_step(range.span(), max_ticks);
    let first = (range.min / step).ceil() as i64;
    let last = (range.max / step).floor() as i64;
    (first..=last)
        .map(|index| index as f64 * step)
        .map(|tick| if tick.abs() < step * 1e-9 { 0.0 } else { tick })
        .collect()
}

fn log_ticks(range: Range) -> Vec<f64> {
    if range.min <= 0.0 || !range.is_valid() {
        return Vec::new();
    }
    let first = range.min.log10().ceil() as i32;
    let last = range.max.log10().floor() as i32;
    (first..=last).map(|exp| 10_f64.powi(exp)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_scale_rejects_non_positive() {
        let scale = AxisScale::Log10;
        assert!(scale.map_value(0.0).is_none());
        assert!(scale.map_value(-1.0).is_none());
        assert!(scale.map_value(1.0).is_some());
    }

    #[test]
    fn log_scale_roundtrip() {
        let scale = AxisScale::Log10;
        let value = 1000.0;
        let mapped = scale.map_value(value).expect("positive value");
        let roundtrip = scale.invert_value(mapped).expect("finite value");
        assert!((roundtrip - value).abs() < 1e-9);
    }

    #[test]
    fn linear_ticks_use_nice_steps() {
        let ticks = AxisScale::Linear.ticks(Range::new(0.0, 5.0), 6);
        assert_eq!(ticks, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let ticks = AxisScale::Linear.ticks(Range::new(-0.93, 0.87), 5);
        assert_eq!(ticks, vec![-0.5, 0.0, 0.5]);
    }

    #[test]
    fn log_ticks_land_on_decades() {
        let ticks = AxisScale::Log10.ticks(Range::new(0.5, 2000.0), 6);
        assert_eq!(ticks, vec![1.0, 10.0, 100.0, 1000.0]);
    }

    #[test]
    fn compact_format_trims_zeros() {
        assert_eq!(format_compact(1.0), "1");
        assert_eq!(format_compact(0.25), "0.25");
        assert_eq!(format_compact(-0.0001), "-1e-4");
        assert_eq!(format_compact(0.1234567), "0.123");
        assert_eq!(format_compact(-0.0), "0");
    }
}
