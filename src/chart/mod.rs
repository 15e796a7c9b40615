//! Plot kinds and the axes they are drawn into.
//!
//! Every plot kind builds artists in data space on an [`Axes2d`] or
//! [`Axes3d`]; the axes lay out a frame with ticks, turn the artists into a
//! render list and rasterize it at the figure's pixel size.

mod axes3d;
mod fmt;
mod kinds;

use std::fmt as std_fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axis::{AxisConfig, AxisFormatter, AxisScale, format_compact};
use crate::color::{cycle_color, parse_color, viridis};
use crate::error::{Result, VisualizerError};
use crate::figure::FigureOptions;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::image::Image;
use crate::render::{
    Canvas, Color, HAlign, LineDash, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle,
    RenderCommand, RenderList, TextStyle, VAlign, build_line_segments, build_scatter_points,
    clip_segment,
};
use crate::transform::Transform;
use crate::view::{Aspect, Range, Viewport};

pub use axes3d::SurfaceGrid;
pub use fmt::FormatSpec;
pub use kinds::PlotRequest;

pub(crate) use axes3d::Axes3d;

const BAR_WIDTH: f64 = 0.8;
const DEFAULT_BINS: usize = 10;
const MARGIN: f64 = 0.05;

/// 2D plot kinds drawn by [`Figure`](crate::figure::Figure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    Plot,
    Scatter,
    Bar,
    Barh,
    Hist,
    Step,
    Stem,
    FillBetween,
    Hlines,
    Vlines,
    Errorbar,
    Loglog,
    Semilogx,
    Semilogy,
    Stackplot,
    Pie,
    Matshow,
}

impl PlotKind {
    /// Every 2D plot kind.
    pub const ALL: [PlotKind; 17] = [
        Self::Plot,
        Self::Scatter,
        Self::Bar,
        Self::Barh,
        Self::Hist,
        Self::Step,
        Self::Stem,
        Self::FillBetween,
        Self::Hlines,
        Self::Vlines,
        Self::Errorbar,
        Self::Loglog,
        Self::Semilogx,
        Self::Semilogy,
        Self::Stackplot,
        Self::Pie,
        Self::Matshow,
    ];

    /// Name used by the plotting call surface.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            Self::Scatter => "scatter",
            Self::Bar => "bar",
            Self::Barh => "barh",
            Self::Hist => "hist",
            Self::Step => "step",
            Self::Stem => "stem",
            Self::FillBetween => "fill_between",
            Self::Hlines => "hlines",
            Self::Vlines => "vlines",
            Self::Errorbar => "errorbar",
            Self::Loglog => "loglog",
            Self::Semilogx => "semilogx",
            Self::Semilogy => "semilogy",
            Self::Stackplot => "stackplot",
            Self::Pie => "pie",
            Self::Matshow => "matshow",
        }
    }
}

impl FromStr for PlotKind {
    type Err = VisualizerError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| VisualizerError::UnknownPlotKind(name.to_string()))
    }
}

impl std_fmt::Display for PlotKind {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.write_str(self.name())
    }
}

/// 3D plot kinds drawn by [`Figure3D`](crate::figure::Figure3D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind3D {
    Plot,
    Scatter,
    PlotWireframe,
    PlotSurface,
}

impl PlotKind3D {
    /// Every 3D plot kind.
    pub const ALL: [PlotKind3D; 4] = [
        Self::Plot,
        Self::Scatter,
        Self::PlotWireframe,
        Self::PlotSurface,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            Self::Scatter => "scatter",
            Self::PlotWireframe => "plot_wireframe",
            Self::PlotSurface => "plot_surface",
        }
    }
}

impl FromStr for PlotKind3D {
    type Err = VisualizerError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| VisualizerError::UnknownPlotKind(name.to_string()))
    }
}

impl std_fmt::Display for PlotKind3D {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.write_str(self.name())
    }
}

/// Styling shared by every plot kind.
///
/// Unset fields fall back to the plotting defaults: the next color of the
/// tab10 cycle, 1.5 px lines, 6 px markers, 10 histogram bins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Color name or hex literal. Overrides the color of a format string.
    pub color: Option<String>,
    pub linewidth: Option<f32>,
    pub markersize: Option<f32>,
    /// Opacity in `0.0..=1.0`.
    pub alpha: Option<f32>,
    /// Histogram bin count.
    pub bins: Option<usize>,
    pub aspect: Aspect,
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    /// Per-point scatter marker areas in points squared, like `s=` in matplotlib.
    #[serde(alias = "s")]
    pub sizes: Option<Vec<f64>>,
    /// Per-point scatter values mapped through viridis, like `c=` in matplotlib.
    #[serde(alias = "c")]
    pub color_values: Option<Vec<f64>>,
}

impl PlotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_linewidth(mut self, width: f32) -> Self {
        self.linewidth = Some(width);
        self
    }

    pub fn with_markersize(mut self, size: f32) -> Self {
        self.markersize = Some(size);
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    pub fn with_aspect(mut self, aspect: Aspect) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_xlabel(mut self, label: impl Into<String>) -> Self {
        self.xlabel = Some(label.into());
        self
    }

    pub fn with_ylabel(mut self, label: impl Into<String>) -> Self {
        self.ylabel = Some(label.into());
        self
    }

    pub fn with_sizes(mut self, sizes: impl Into<Vec<f64>>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    pub fn with_color_values(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.color_values = Some(values.into());
        self
    }

    /// Series color: explicit option, then format string, then the cycle.
    pub(crate) fn resolve_color(&self, fmt: Option<&FormatSpec>, cycle: usize) -> Result<Color> {
        let rgba = match (&self.color, fmt.and_then(|spec| spec.color)) {
            (Some(name), _) => parse_color(name)?,
            (None, Some(color)) => color,
            (None, None) => cycle_color(cycle),
        };
        let color = Color::from(rgba);
        Ok(match self.alpha {
            Some(alpha) => color.with_alpha(alpha.clamp(0.0, 1.0)),
            None => color,
        })
    }
}

pub(crate) fn check_lengths(kind: impl std_fmt::Display, a: usize, b: usize) -> Result<()> {
    if a == b {
        Ok(())
    } else {
        Err(VisualizerError::invalid_argument(format!(
            "{kind}: inputs must have the same length, got {a} and {b}"
        )))
    }
}

pub(crate) fn check_not_empty(kind: impl std_fmt::Display, len: usize) -> Result<()> {
    if len == 0 {
        Err(VisualizerError::invalid_argument(format!("{kind}: no data")))
    } else {
        Ok(())
    }
}

/// Something drawn on 2D axes, in data coordinates.
#[derive(Debug, Clone)]
enum Artist {
    Line {
        points: Vec<Point>,
        color: Color,
        dash: Option<LineDash>,
        width: f32,
        marker: Option<(MarkerShape, f32)>,
    },
    Rects {
        rects: Vec<(Point, Point, Color)>,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Segments {
        segments: Vec<(Point, Point)>,
        color: Color,
        width: f32,
    },
    /// Markers styled one by one.
    Markers {
        markers: Vec<(Point, Color, f32)>,
        shape: MarkerShape,
    },
}

impl Artist {
    fn for_each_point(&self, mut f: impl FnMut(Point)) {
        match self {
            Self::Line { points, .. } | Self::Polygon { points, .. } => {
                points.iter().copied().for_each(f);
            }
            Self::Rects { rects } => {
                for (a, b, _) in rects {
                    f(*a);
                    f(*b);
                }
            }
            Self::Segments { segments, .. } => {
                for (a, b) in segments {
                    f(*a);
                    f(*b);
                }
            }
            Self::Markers { markers, .. } => {
                markers.iter().for_each(|(point, _, _)| f(*point));
            }
        }
    }
}

/// Matplotlib-style 2D axes rasterized at a fixed pixel size.
#[derive(Debug, Clone)]
pub(crate) struct Axes2d {
    width: usize,
    height: usize,
    scale: f32,
    x_axis: AxisConfig,
    y_axis: AxisConfig,
    aspect: Aspect,
    show_axes: bool,
    ticks_on_top: bool,
    margins: bool,
    title: Option<String>,
    artists: Vec<Artist>,
    next_color: usize,
}

impl Axes2d {
    pub(crate) fn new(figure: FigureOptions, options: &PlotOptions) -> Self {
        let (width, height) = figure.pixel_size();
        let mut x_axis = AxisConfig::linear();
        let mut y_axis = AxisConfig::linear();
        if let Some(label) = &options.xlabel {
            x_axis = x_axis.with_label(label.clone());
        }
        if let Some(label) = &options.ylabel {
            y_axis = y_axis.with_label(label.clone());
        }
        Self {
            width: width as usize,
            height: height as usize,
            scale: (figure.ppu / 100.0).max(0.1) as f32,
            x_axis,
            y_axis,
            aspect: options.aspect,
            show_axes: true,
            ticks_on_top: false,
            margins: true,
            title: options.title.clone(),
            artists: Vec::new(),
            next_color: 0,
        }
    }

    fn next_cycle(&mut self) -> usize {
        let index = self.next_color;
        self.next_color += 1;
        index
    }

    fn line_width(&self, options: &PlotOptions) -> f32 {
        options.linewidth.unwrap_or(1.5) * self.scale
    }

    fn marker_size(&self, options: &PlotOptions) -> f32 {
        options.markersize.unwrap_or(6.0) * self.scale
    }

    pub(crate) fn set_scales(&mut self, x: AxisScale, y: AxisScale) {
        self.x_axis = self.x_axis.clone().with_scale(x);
        self.y_axis = self.y_axis.clone().with_scale(y);
    }

    /// Line and/or markers through `(x, y)` styled by a format string.
    pub(crate) fn line(
        &mut self,
        kind: PlotKind,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<()> {
        check_lengths(kind, x.len(), y.len())?;
        let spec = FormatSpec::parse(fmt)?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(Some(&spec), cycle)?;
        let marker_size = self.marker_size(options);
        self.artists.push(Artist::Line {
            points: zip_points(x, y),
            color,
            dash: spec.line(),
            width: self.line_width(options),
            marker: spec.marker.map(|shape| (shape, marker_size)),
        });
        Ok(())
    }

    /// Markers at `(x, y)`, optionally sized and colored per point.
    ///
    /// `sizes` are marker areas, so a size of 36 draws a 6 px marker at scale 1.
    /// `color_values` are normalized over their finite range; points with a
    /// non-finite value are not drawn.
    pub(crate) fn scatter(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<()> {
        check_lengths(PlotKind::Scatter, x.len(), y.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let marker_size = self.marker_size(options);
        if options.sizes.is_none() && options.color_values.is_none() {
            self.artists.push(Artist::Line {
                points: zip_points(x, y),
                color,
                dash: None,
                width: 0.0,
                marker: Some((MarkerShape::Circle, marker_size)),
            });
            return Ok(());
        }
        if let Some(sizes) = &options.sizes {
            check_lengths(PlotKind::Scatter, x.len(), sizes.len())?;
            if sizes.iter().any(|size| !size.is_finite() || *size < 0.0) {
                return Err(VisualizerError::invalid_argument(
                    "scatter: marker sizes must be finite and non-negative",
                ));
            }
        }
        if let Some(values) = &options.color_values {
            check_lengths(PlotKind::Scatter, x.len(), values.len())?;
        }
        let range = options
            .color_values
            .as_ref()
            .and_then(|values| Range::of_values(values.iter().copied()));
        let alpha = options.alpha.unwrap_or(1.0).clamp(0.0, 1.0);
        let mut markers = Vec::with_capacity(x.len());
        for (index, point) in zip_points(x, y).into_iter().enumerate() {
            let size = match &options.sizes {
                Some(sizes) => sizes[index].sqrt() as f32 * self.scale,
                None => marker_size,
            };
            let color = match (&options.color_values, range) {
                (Some(values), _) if !values[index].is_finite() => continue,
                (Some(values), Some(range)) if range.is_valid() => {
                    let t = (values[index] - range.min) / range.span();
                    Color::from(viridis(t)).with_alpha(alpha)
                }
                (Some(_), _) => Color::from(viridis(0.0)).with_alpha(alpha),
                (None, _) => color,
            };
            markers.push((point, color, size));
        }
        self.artists.push(Artist::Markers {
            markers,
            shape: MarkerShape::Circle,
        });
        Ok(())
    }

    pub(crate) fn bar(&mut self, x: &[f64], heights: &[f64], options: &PlotOptions) -> Result<()> {
        check_lengths(PlotKind::Bar, x.len(), heights.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let half = BAR_WIDTH * 0.5;
        let rects = x
            .iter()
            .zip(heights)
            .map(|(&x, &h)| (Point::new(x - half, 0.0), Point::new(x + half, h), color))
            .collect();
        self.artists.push(Artist::Rects { rects });
        Ok(())
    }

    pub(crate) fn barh(&mut self, y: &[f64], widths: &[f64], options: &PlotOptions) -> Result<()> {
        check_lengths(PlotKind::Barh, y.len(), widths.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let half = BAR_WIDTH * 0.5;
        let rects = y
            .iter()
            .zip(widths)
            .map(|(&y, &w)| (Point::new(0.0, y - half), Point::new(w, y + half), color))
            .collect();
        self.artists.push(Artist::Rects { rects });
        Ok(())
    }

    pub(crate) fn hist(&mut self, values: &[f64], options: &PlotOptions) -> Result<Vec<usize>> {
        let bins = options.bins.unwrap_or(DEFAULT_BINS);
        if bins == 0 {
            return Err(VisualizerError::invalid_argument("hist: bins must be positive"));
        }
        let range = Range::of_values(values.iter().copied())
            .ok_or_else(|| VisualizerError::invalid_argument("hist: no finite data"))?;
        let range = if range.is_valid() {
            range
        } else {
            Range::centered(range.min, 0.5)
        };
        let step = range.span() / bins as f64;
        let mut counts = vec![0_usize; bins];
        for value in values.iter().copied().filter(|v| v.is_finite()) {
            let index = (((value - range.min) / step) as usize).min(bins - 1);
            counts[index] += 1;
        }
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let rects = counts
            .iter()
            .enumerate()
            .map(|(index, &count)| {
                let left = range.min + step * index as f64;
                (
                    Point::new(left, 0.0),
                    Point::new(left + step, count as f64),
                    color,
                )
            })
            .collect();
        self.artists.push(Artist::Rects { rects });
        Ok(counts)
    }

    /// Staircase through `(x, y)`; each step rises at its left edge.
    pub(crate) fn step(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<()> {
        check_lengths(PlotKind::Step, x.len(), y.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let mut points = Vec::with_capacity(x.len() * 2);
        for (index, (&xi, &yi)) in x.iter().zip(y).enumerate() {
            if index > 0 {
                points.push(Point::new(x[index - 1], yi));
            }
            points.push(Point::new(xi, yi));
        }
        self.artists.push(Artist::Line {
            points,
            color,
            dash: Some(LineDash::Solid),
            width: self.line_width(options),
            marker: None,
        });
        Ok(())
    }

    pub(crate) fn stem(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<()> {
        check_lengths(PlotKind::Stem, x.len(), y.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let width = self.line_width(options);
        let segments = x
            .iter()
            .zip(y)
            .map(|(&x, &y)| (Point::new(x, 0.0), Point::new(x, y)))
            .collect();
        self.artists.push(Artist::Segments {
            segments,
            color,
            width,
        });
        self.artists.push(Artist::Line {
            points: zip_points(x, y),
            color,
            dash: None,
            width,
            marker: Some((MarkerShape::Circle, self.marker_size(options))),
        });
        if let Some(range) = Range::of_values(x.iter().copied()) {
            self.artists.push(Artist::Line {
                points: vec![Point::new(range.min, 0.0), Point::new(range.max, 0.0)],
                color: cycle_color(3).into(),
                dash: Some(LineDash::Solid),
                width,
                marker: None,
            });
        }
        Ok(())
    }

    pub(crate) fn fill_between(
        &mut self,
        x: &[f64],
        y1: &[f64],
        y2: &[f64],
        options: &PlotOptions,
    ) -> Result<()> {
        check_lengths(PlotKind::FillBetween, x.len(), y1.len())?;
        check_lengths(PlotKind::FillBetween, x.len(), y2.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let mut points = zip_points(x, y1);
        points.extend(zip_points(x, y2).into_iter().rev());
        self.artists.push(Artist::Polygon { points, color });
        Ok(())
    }

    pub(crate) fn hlines(
        &mut self,
        y: &[f64],
        xmin: f64,
        xmax: f64,
        options: &PlotOptions,
    ) -> Result<()> {
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let segments = y
            .iter()
            .map(|&y| (Point::new(xmin, y), Point::new(xmax, y)))
            .collect();
        self.artists.push(Artist::Segments {
            segments,
            color,
            width: self.line_width(options),
        });
        Ok(())
    }

    pub(crate) fn vlines(
        &mut self,
        x: &[f64],
        ymin: f64,
        ymax: f64,
        options: &PlotOptions,
    ) -> Result<()> {
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let segments = x
            .iter()
            .map(|&x| (Point::new(x, ymin), Point::new(x, ymax)))
            .collect();
        self.artists.push(Artist::Segments {
            segments,
            color,
            width: self.line_width(options),
        });
        Ok(())
    }

    /// Line through `(x, y)` with vertical error bars; a single `yerr` applies to every point.
    pub(crate) fn errorbar(
        &mut self,
        x: &[f64],
        y: &[f64],
        yerr: &[f64],
        options: &PlotOptions,
    ) -> Result<()> {
        check_lengths(PlotKind::Errorbar, x.len(), y.len())?;
        if yerr.len() != 1 {
            check_lengths(PlotKind::Errorbar, y.len(), yerr.len())?;
        }
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        let width = self.line_width(options);
        let segments = x
            .iter()
            .zip(y)
            .enumerate()
            .map(|(index, (&x, &y))| {
                let err = yerr.get(index).or(yerr.first()).copied().unwrap_or(0.0).abs();
                (Point::new(x, y - err), Point::new(x, y + err))
            })
            .collect();
        self.artists.push(Artist::Line {
            points: zip_points(x, y),
            color,
            dash: Some(LineDash::Solid),
            width,
            marker: None,
        });
        self.artists.push(Artist::Segments {
            segments,
            color,
            width,
        });
        Ok(())
    }

    /// Stacked areas; `ys[k]` is drawn on top of the cumulative sum of `ys[..k]`.
    pub(crate) fn stackplot(
        &mut self,
        x: &[f64],
        ys: &[Vec<f64>],
        options: &PlotOptions,
    ) -> Result<()> {
        check_not_empty(PlotKind::Stackplot, ys.len())?;
        let mut base = vec![0.0; x.len()];
        for layer in ys {
            check_lengths(PlotKind::Stackplot, x.len(), layer.len())?;
            let top: Vec<f64> = base.iter().zip(layer).map(|(b, v)| b + v).collect();
            let cycle = self.next_cycle();
            let color = options.resolve_color(None, cycle)?;
            let mut points = zip_points(x, &top);
            points.extend(zip_points(x, &base).into_iter().rev());
            self.artists.push(Artist::Polygon { points, color });
            base = top;
        }
        Ok(())
    }

    /// Counter-clockwise wedges starting at three o'clock.
    pub(crate) fn pie(&mut self, sizes: &[f64], options: &PlotOptions) -> Result<()> {
        check_not_empty(PlotKind::Pie, sizes.len())?;
        if sizes.iter().any(|size| !size.is_finite() || *size < 0.0) {
            return Err(VisualizerError::invalid_argument(
                "pie: wedge sizes must be finite and non-negative",
            ));
        }
        let total: f64 = sizes.iter().sum();
        if total <= 0.0 {
            return Err(VisualizerError::invalid_argument("pie: sizes sum to zero"));
        }
        let mut start = 0.0_f64;
        for &size in sizes {
            let sweep = size / total * std::f64::consts::TAU;
            let cycle = self.next_cycle();
            let color = options.resolve_color(None, cycle)?;
            let steps = ((sweep / std::f64::consts::TAU * 96.0).ceil() as usize).max(2);
            let mut points = vec![Point::new(0.0, 0.0)];
            points.extend((0..=steps).map(|step| {
                let angle = start + sweep * step as f64 / steps as f64;
                Point::new(angle.cos(), angle.sin())
            }));
            self.artists.push(Artist::Polygon { points, color });
            start += sweep;
        }
        self.aspect = Aspect::Equal;
        self.show_axes = false;
        self.margins = false;
        let limits = Range::new(-1.1, 1.1);
        self.x_axis = self.x_axis.clone().with_limits(limits);
        self.y_axis = self.y_axis.clone().with_limits(limits);
        Ok(())
    }

    /// Matrix cells colored by value, row 0 at the top.
    pub(crate) fn matshow(&mut self, matrix: &[Vec<f64>], options: &PlotOptions) -> Result<()> {
        check_not_empty(PlotKind::Matshow, matrix.len())?;
        let cols = matrix[0].len();
        check_not_empty(PlotKind::Matshow, cols)?;
        for row in matrix {
            check_lengths(PlotKind::Matshow, cols, row.len())?;
        }
        let range = Range::of_values(matrix.iter().flatten().copied())
            .unwrap_or(Range::new(0.0, 1.0));
        let alpha = options.alpha.unwrap_or(1.0).clamp(0.0, 1.0);
        let mut rects = Vec::with_capacity(matrix.len() * cols);
        for (r, row) in matrix.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                let t = if range.is_valid() {
                    (value - range.min) / range.span()
                } else {
                    0.0
                };
                let y = -(r as f64);
                let x = c as f64;
                rects.push((
                    Point::new(x - 0.5, y - 0.5),
                    Point::new(x + 0.5, y + 0.5),
                    Color::from(viridis(t)).with_alpha(alpha),
                ));
            }
        }
        self.artists.push(Artist::Rects { rects });
        self.aspect = Aspect::Equal;
        self.ticks_on_top = true;
        self.margins = false;
        let rows = matrix.len() as f64;
        self.x_axis = self
            .x_axis
            .clone()
            .with_limits(Range::new(-0.5, cols as f64 - 0.5));
        self.y_axis = self
            .y_axis
            .clone()
            .with_limits(Range::new(-(rows - 0.5), 0.5))
            .with_formatter(AxisFormatter::Custom(Arc::new(|v| format_compact(-v))));
        Ok(())
    }

    /// Screen rectangle of the plotting area.
    fn plot_rect(&self) -> ScreenRect {
        let (w, h) = (self.width as f32, self.height as f32);
        ScreenRect::new(
            ScreenPoint::new(w * 0.125, h * 0.12),
            ScreenPoint::new(w * 0.9, h * 0.89),
        )
    }

    /// Visible data ranges for a plotting area of the given size.
    pub(crate) fn viewport(&self, plot: ScreenRect) -> Viewport {
        let x_scale = self.x_axis.scale();
        let y_scale = self.y_axis.scale();
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for artist in &self.artists {
            artist.for_each_point(|point| {
                if x_scale.map_value(point.x).is_some() {
                    xs.push(point.x);
                }
                if y_scale.map_value(point.y).is_some() {
                    ys.push(point.y);
                }
            });
        }
        let x = self.x_axis.limits().unwrap_or_else(|| {
            auto_limits(Range::of_values(xs), x_scale, self.margins)
        });
        let y = self.y_axis.limits().unwrap_or_else(|| {
            auto_limits(Range::of_values(ys), y_scale, self.margins)
        });
        let viewport = Viewport::new(x, y);
        let linear = x_scale == AxisScale::Linear && y_scale == AxisScale::Linear;
        if self.aspect == Aspect::Equal && linear {
            viewport.with_equal_aspect(plot.width(), plot.height())
        } else {
            viewport
        }
    }

    fn text_style(&self) -> TextStyle {
        TextStyle {
            size: 10.0 * self.scale,
            ..TextStyle::default()
        }
    }

    pub(crate) fn render_list(&self) -> RenderList {
        let mut list = RenderList::new();
        let plot = self.plot_rect();
        let viewport = self.viewport(plot);
        let transform = Transform::new(
            viewport,
            plot,
            self.x_axis.scale(),
            self.y_axis.scale(),
        )
        .or_else(|| Transform::linear(viewport, plot));
        let Some(transform) = transform else {
            return list;
        };

        list.push(RenderCommand::ClipRect(plot));
        for artist in &self.artists {
            push_artist(&mut list, artist, &transform, plot);
        }
        list.push(RenderCommand::ClipEnd);

        let text = self.text_style();
        if self.show_axes {
            list.push(RenderCommand::Rect {
                rect: plot,
                style: RectStyle {
                    fill: Color::TRANSPARENT,
                    stroke: Color::BLACK,
                    stroke_width: self.scale.max(1.0),
                },
            });
            self.push_ticks(&mut list, &transform, viewport, &text);
        }
        if let Some(title) = &self.title {
            let position = ScreenPoint::new(
                plot.min.x + plot.width() * 0.5,
                plot.min.y - 6.0 * self.scale,
            );
            let style = text.clone().anchored(HAlign::Center, VAlign::Bottom);
            list.text(position, title.clone(), style);
        }
        if let Some(label) = self.x_axis.label() {
            let position = ScreenPoint::new(
                plot.min.x + plot.width() * 0.5,
                self.height as f32 - 4.0 * self.scale,
            );
            list.text(position, label, text.clone().anchored(HAlign::Center, VAlign::Bottom));
        }
        if let Some(label) = self.y_axis.label() {
            let position = ScreenPoint::new(4.0 * self.scale, plot.min.y - 6.0 * self.scale);
            list.text(position, label, text.anchored(HAlign::Left, VAlign::Bottom));
        }
        list
    }

    fn push_ticks(
        &self,
        list: &mut RenderList,
        transform: &Transform,
        viewport: Viewport,
        text: &TextStyle,
    ) {
        let plot = transform.screen();
        let tick_len = 3.5 * self.scale;
        let gap = 5.0 * self.scale;
        let style = LineStyle {
            color: Color::BLACK,
            width: self.scale.max(1.0),
            dash: LineDash::Solid,
        };
        let max_x = ((plot.width() / (80.0 * self.scale)) as usize).clamp(3, 9);
        let max_y = ((plot.height() / (50.0 * self.scale)) as usize).clamp(3, 9);

        for tick in self.x_axis.scale().ticks(viewport.x, max_x) {
            let Some(sx) = transform.x_to_screen(tick) else {
                continue;
            };
            if sx < plot.min.x - 0.5 || sx > plot.max.x + 0.5 {
                continue;
            }
            let label = self.x_axis.formatter().format(tick);
            if self.ticks_on_top {
                list.segment(
                    ScreenPoint::new(sx, plot.min.y),
                    ScreenPoint::new(sx, plot.min.y - tick_len),
                    style,
                );
                list.text(
                    ScreenPoint::new(sx, plot.min.y - gap),
                    label,
                    text.clone().anchored(HAlign::Center, VAlign::Bottom),
                );
            } else {
                list.segment(
                    ScreenPoint::new(sx, plot.max.y),
                    ScreenPoint::new(sx, plot.max.y + tick_len),
                    style,
                );
                list.text(
                    ScreenPoint::new(sx, plot.max.y + gap),
                    label,
                    text.clone().anchored(HAlign::Center, VAlign::Top),
                );
            }
        }

        for tick in self.y_axis.scale().ticks(viewport.y, max_y) {
            let Some(sy) = transform.y_to_screen(tick) else {
                continue;
            };
            if sy < plot.min.y - 0.5 || sy > plot.max.y + 0.5 {
                continue;
            }
            list.segment(
                ScreenPoint::new(plot.min.x - tick_len, sy),
                ScreenPoint::new(plot.min.x, sy),
                style,
            );
            list.text(
                ScreenPoint::new(plot.min.x - gap, sy),
                self.y_axis.formatter().format(tick),
                text.clone().anchored(HAlign::Right, VAlign::Middle),
            );
        }
    }

    /// Draw onto a white canvas of the figure's pixel size.
    pub(crate) fn rasterize(&self) -> Image {
        let mut canvas = Canvas::new(self.width, self.height, Color::WHITE);
        canvas.execute(&self.render_list());
        canvas.into_image()
    }
}

fn zip_points(x: &[f64], y: &[f64]) -> Vec<Point> {
    x.iter().zip(y).map(|(&x, &y)| Point::new(x, y)).collect()
}

/// Fit limits to data, widening degenerate ranges and adding margins.
fn auto_limits(range: Option<Range>, scale: AxisScale, margins: bool) -> Range {
    let frac = if margins { MARGIN } else { 0.0 };
    match scale {
        AxisScale::Linear => {
            let range = range.unwrap_or(Range::new(0.0, 1.0));
            let range = if range.is_valid() {
                range
            } else {
                Range::centered(range.min, (range.min.abs() * MARGIN).max(MARGIN))
            };
            range.padded(frac, 0.0)
        }
        AxisScale::Log10 => {
            let range = range.unwrap_or(Range::new(1.0, 10.0));
            let decades = Range::new(range.min.log10(), range.max.log10());
            let decades = if decades.is_valid() {
                decades
            } else {
                Range::centered(decades.min, 0.5)
            };
            let padded = decades.padded(frac, 0.0);
            Range::new(10_f64.powf(padded.min), 10_f64.powf(padded.max))
        }
    }
}

fn push_artist(list: &mut RenderList, artist: &Artist, transform: &Transform, clip: ScreenRect) {
    match artist {
        Artist::Line {
            points,
            color,
            dash,
            width,
            marker,
        } => {
            if let Some(dash) = dash {
                let mut segments = Vec::new();
                build_line_segments(points, transform, clip, &mut segments);
                if !segments.is_empty() {
                    list.push(RenderCommand::LineSegments {
                        segments,
                        style: LineStyle {
                            color: *color,
                            width: *width,
                            dash: *dash,
                        },
                    });
                }
            }
            if let Some((shape, size)) = marker {
                let mut screen = Vec::new();
                build_scatter_points(points, transform, clip, &mut screen);
                if !screen.is_empty() {
                    list.push(RenderCommand::Points {
                        points: screen,
                        style: MarkerStyle {
                            color: *color,
                            size: *size,
                            shape: *shape,
                        },
                    });
                }
            }
        }
        Artist::Rects { rects } => {
            for (a, b, color) in rects {
                let corners = (transform.data_to_screen(*a), transform.data_to_screen(*b));
                let (Some(sa), Some(sb)) = corners else {
                    continue;
                };
                list.push(RenderCommand::Rect {
                    rect: ScreenRect::from_corners(sa, sb),
                    style: RectStyle::filled(*color),
                });
            }
        }
        Artist::Polygon { points, color } => {
            let screen: Option<Vec<ScreenPoint>> = points
                .iter()
                .map(|point| transform.data_to_screen(*point))
                .collect();
            if let Some(points) = screen {
                list.push(RenderCommand::Polygon {
                    points,
                    fill: *color,
                });
            }
        }
        Artist::Segments {
            segments,
            color,
            width,
        } => {
            let segments: Vec<_> = segments
                .iter()
                .filter_map(|(a, b)| {
                    let start = transform.data_to_screen(*a)?;
                    let end = transform.data_to_screen(*b)?;
                    clip_segment(start, end, clip)
                })
                .map(|(start, end)| LineSegment::new(start, end))
                .collect();
            if !segments.is_empty() {
                list.push(RenderCommand::LineSegments {
                    segments,
                    style: LineStyle {
                        color: *color,
                        width: *width,
                        dash: LineDash::Solid,
                    },
                });
            }
        }
        Artist::Markers { markers, shape } => {
            for (point, color, size) in markers {
                let Some(screen) = transform.data_to_screen(*point) else {
                    continue;
                };
                if !clip.contains(screen) || *size <= 0.0 {
                    continue;
                }
                list.push(RenderCommand::Points {
                    points: vec![screen],
                    style: MarkerStyle {
                        color: *color,
                        size: *size,
                        shape: *shape,
                    },
                });
            }
        }
    }
}
