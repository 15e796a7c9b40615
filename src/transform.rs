//! Coordinate transforms between data and screen space.

use crate::axis::AxisScale;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::view::{Range, Viewport};

const MIN_SPAN: f64 = 1e-12;

/// Transform from data coordinates into screen coordinates.
#[derive(Debug, Clone)]
pub(crate) struct Transform {
    screen: ScreenRect,
    x_scale: AxisScale,
    y_scale: AxisScale,
    x_axis: Range,
    y_axis: Range,
}

impl Transform {
    /// Create a transform for the given viewport and screen rectangle.
    pub(crate) fn new(
        viewport: Viewport,
        screen: ScreenRect,
        x_scale: AxisScale,
        y_scale: AxisScale,
    ) -> Option<Self> {
        if !screen.is_valid() {
            return None;
        }
        let x_axis = map_range(viewport.x, x_scale)?.with_min_span(MIN_SPAN);
        let y_axis = map_range(viewport.y, y_scale)?.with_min_span(MIN_SPAN);
        Some(Self {
            screen,
            x_scale,
            y_scale,
            x_axis,
            y_axis,
        })
    }

    /// Linear transform on both axes.
    pub(crate) fn linear(viewport: Viewport, screen: ScreenRect) -> Option<Self> {
        Self::new(viewport, screen, AxisScale::Linear, AxisScale::Linear)
    }

    /// Access the screen rectangle.
    pub(crate) fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// Map a data point into screen space.
    pub(crate) fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        let sx = self.x_to_screen(point.x)?;
        let sy = self.y_to_screen(point.y)?;
        Some(ScreenPoint::new(sx, sy))
    }

    /// Map a data X value into a screen column.
    pub(crate) fn x_to_screen(&self, x: f64) -> Option<f32> {
        let x = self.x_scale.map_value(x)?;
        let x_norm = (x - self.x_axis.min) / self.x_axis.span();
        Some((f64::from(self.screen.min.x) + x_norm * f64::from(self.screen.width())) as f32)
    }

    /// Map a data Y value into a screen row.
    pub(crate) fn y_to_screen(&self, y: f64) -> Option<f32> {
        let y = self.y_scale.map_value(y)?;
        let y_norm = (y - self.y_axis.min) / self.y_axis.span();
        Some((f64::from(self.screen.max.y) - y_norm * f64::from(self.screen.height())) as f32)
    }

    /// Map a screen point into data space.
    #[cfg(test)]
    pub(crate) fn screen_to_data(&self, point: ScreenPoint) -> Option<Point> {
        let x_norm = (f64::from(point.x) - f64::from(self.screen.min.x))
            / f64::from(self.screen.width());
        let y_norm = (f64::from(self.screen.max.y) - f64::from(point.y))
            / f64::from(self.screen.height());
        let x_axis = self.x_axis.min + x_norm * self.x_axis.span();
        let y_axis = self.y_axis.min + y_norm * self.y_axis.span();
        let x = self.x_scale.invert_value(x_axis)?;
        let y = self.y_scale.invert_value(y_axis)?;
        Some(Point::new(x, y))
    }
}

fn map_range(range: Range, scale: AxisScale) -> Option<Range> {
    let min = scale.map_value(range.min)?;
    let max = scale.map_value(range.max)?;
    Some(Range::new(min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisScale;

    #[test]
    fn linear_roundtrip() {
        let viewport = Viewport::new(Range::new(0.0, 10.0), Range::new(0.0, 10.0));
        let screen = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 100.0));
        let transform = Transform::linear(viewport, screen).expect("valid transform");
        let point = Point::new(5.0, 7.5);
        let screen_point = transform.data_to_screen(point).expect("valid transform");
        let roundtrip = transform.screen_to_data(screen_point).expect("valid transform");
        assert!((roundtrip.x - point.x).abs() < 1e-4);
        assert!((roundtrip.y - point.y).abs() < 1e-4);
    }

    #[test]
    fn y_axis_points_up() {
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        let screen = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0));
        let transform = Transform::linear(viewport, screen).expect("valid transform");
        assert_eq!(transform.y_to_screen(0.0), Some(10.0));
        assert_eq!(transform.y_to_screen(1.0), Some(0.0));
    }

    #[test]
    fn log_rejects_non_positive_range() {
        let viewport = Viewport::new(Range::new(-1.0, 10.0), Range::new(1.0, 10.0));
        let screen = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(100.0, 100.0));
        let transform = Transform::new(viewport, screen, AxisScale::Log10, AxisScale::Linear);
        assert!(transform.is_none());
    }
}
