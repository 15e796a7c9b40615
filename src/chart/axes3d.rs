//! Orthographic 3D axes.

use crate::axis::{AxisScale, format_compact};
use crate::chart::{FormatSpec, PlotKind3D, PlotOptions, check_lengths, check_not_empty};
use crate::color::viridis;
use crate::error::{Result, VisualizerError};
use crate::figure::FigureOptions;
use crate::geom::{Point3, ScreenPoint, ScreenRect};
use crate::image::Image;
use crate::render::{
    Canvas, Color, HAlign, LineDash, LineSegment, LineStyle, MarkerShape, MarkerStyle,
    RenderCommand, RenderList, TextStyle, VAlign, clip_segment,
};
use crate::view::{Aspect, Range};

const AZIMUTH_DEG: f64 = -60.0;
const ELEVATION_DEG: f64 = 30.0;
const PANE_EDGE: Color = Color::new(0.6, 0.6, 0.6, 1.0);

/// Surface samples `z[j][i]` at `(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<Vec<f64>>,
}

impl SurfaceGrid {
    /// Build a grid, checking that `z` has one row per `y` and one column per `x`.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<Vec<f64>>) -> Result<Self> {
        if x.len() < 2 || y.len() < 2 {
            return Err(VisualizerError::invalid_argument(
                "surface grids need at least two samples per axis",
            ));
        }
        if z.len() != y.len() || z.iter().any(|row| row.len() != x.len()) {
            return Err(VisualizerError::invalid_argument(format!(
                "surface grid z must be {}x{}",
                y.len(),
                x.len()
            )));
        }
        Ok(Self { x, y, z })
    }

    /// Sample `f(x, y)` over the cartesian product of `x` and `y`.
    pub fn from_fn(x: Vec<f64>, y: Vec<f64>, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        let z = y
            .iter()
            .map(|&yj| x.iter().map(|&xi| f(xi, yj)).collect())
            .collect();
        Self::new(x, y, z)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[Vec<f64>] {
        &self.z
    }

    fn point(&self, i: usize, j: usize) -> Point3 {
        Point3::new(self.x[i], self.y[j], self.z[j][i])
    }

    fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        (0..self.y.len()).flat_map(move |j| (0..self.x.len()).map(move |i| self.point(i, j)))
    }
}

/// Cube-shaped limits around the data: every axis gets the largest half-span.
fn cube_limits(ranges: [Range; 3]) -> [Range; 3] {
    let half = ranges
        .iter()
        .map(|range| range.span() * 0.5)
        .fold(0.0_f64, f64::max);
    ranges.map(|range| Range::centered(range.center(), half))
}

#[derive(Debug, Clone)]
enum Artist3 {
    Line {
        points: Vec<Point3>,
        color: Color,
        dash: Option<LineDash>,
        width: f32,
        marker: Option<(MarkerShape, f32)>,
    },
    Wireframe {
        grid: SurfaceGrid,
        color: Color,
        width: f32,
    },
    Surface {
        grid: SurfaceGrid,
        alpha: f32,
    },
}

impl Artist3 {
    fn points(&self) -> Box<dyn Iterator<Item = Point3> + '_> {
        match self {
            Self::Line { points, .. } => Box::new(points.iter().copied()),
            Self::Wireframe { grid, .. } | Self::Surface { grid, .. } => Box::new(grid.points()),
        }
    }
}

/// Orthographic projection of the limit cube onto a screen rectangle.
struct Projection {
    limits: [Range; 3],
    center: ScreenPoint,
    scale: f64,
    sin_az: f64,
    cos_az: f64,
    sin_el: f64,
    cos_el: f64,
}

impl Projection {
    fn new(limits: [Range; 3], rect: ScreenRect) -> Self {
        let (sin_az, cos_az) = AZIMUTH_DEG.to_radians().sin_cos();
        let (sin_el, cos_el) = ELEVATION_DEG.to_radians().sin_cos();
        let mut projection = Self {
            limits,
            center: ScreenPoint::new(
                rect.min.x + rect.width() * 0.5,
                rect.min.y + rect.height() * 0.5,
            ),
            scale: 1.0,
            sin_az,
            cos_az,
            sin_el,
            cos_el,
        };
        let (mut max_u, mut max_v) = (0.0_f64, 0.0_f64);
        for corner in 0..8 {
            let n = [
                if corner & 1 == 0 { -0.5 } else { 0.5 },
                if corner & 2 == 0 { -0.5 } else { 0.5 },
                if corner & 4 == 0 { -0.5 } else { 0.5 },
            ];
            let (u, v, _) = projection.view(n);
            max_u = max_u.max(u.abs());
            max_v = max_v.max(v.abs());
        }
        projection.scale = (f64::from(rect.width()) / (2.0 * max_u))
            .min(f64::from(rect.height()) / (2.0 * max_v));
        projection
    }

    fn normalize(&self, p: Point3) -> Option<[f64; 3]> {
        let coords = [p.x, p.y, p.z];
        let mut out = [0.0; 3];
        for axis in 0..3 {
            let range = self.limits[axis];
            let value = (coords[axis] - range.min) / range.span() - 0.5;
            if !value.is_finite() {
                return None;
            }
            out[axis] = value;
        }
        Some(out)
    }

    /// Camera-space coordinates: right, up and depth toward the viewer.
    fn view(&self, n: [f64; 3]) -> (f64, f64, f64) {
        let [x, y, z] = n;
        let along = x * self.cos_az + y * self.sin_az;
        let u = -x * self.sin_az + y * self.cos_az;
        let v = -self.sin_el * along + z * self.cos_el;
        let depth = self.cos_el * along + z * self.sin_el;
        (u, v, depth)
    }

    fn project(&self, p: Point3) -> Option<(ScreenPoint, f64)> {
        let (u, v, depth) = self.view(self.normalize(p)?);
        let screen = ScreenPoint::new(
            self.center.x + (u * self.scale) as f32,
            self.center.y - (v * self.scale) as f32,
        );
        Some((screen, depth))
    }

    fn to_screen(&self, p: Point3) -> Option<ScreenPoint> {
        self.project(p).map(|(screen, _)| screen)
    }
}

/// 3D axes viewed from azimuth -60° and elevation 30°.
#[derive(Debug, Clone)]
pub(crate) struct Axes3d {
    width: usize,
    height: usize,
    scale: f32,
    aspect: Aspect,
    title: Option<String>,
    labels: [Option<String>; 2],
    artists: Vec<Artist3>,
    next_color: usize,
}

impl Axes3d {
    pub(crate) fn new(figure: FigureOptions, options: &PlotOptions) -> Self {
        let (width, height) = figure.pixel_size();
        Self {
            width: width as usize,
            height: height as usize,
            scale: (figure.ppu / 100.0).max(0.1) as f32,
            aspect: options.aspect,
            title: options.title.clone(),
            labels: [options.xlabel.clone(), options.ylabel.clone()],
            artists: Vec::new(),
            next_color: 0,
        }
    }

    fn next_cycle(&mut self) -> usize {
        let index = self.next_color;
        self.next_color += 1;
        index
    }

    pub(crate) fn line(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<()> {
        check_lengths(PlotKind3D::Plot, x.len(), y.len())?;
        check_lengths(PlotKind3D::Plot, x.len(), z.len())?;
        let spec = FormatSpec::parse(fmt)?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(Some(&spec), cycle)?;
        let size = options.markersize.unwrap_or(6.0) * self.scale;
        self.artists.push(Artist3::Line {
            points: zip_points(x, y, z),
            color,
            dash: spec.line(),
            width: options.linewidth.unwrap_or(1.5) * self.scale,
            marker: spec.marker.map(|shape| (shape, size)),
        });
        Ok(())
    }

    pub(crate) fn scatter(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        options: &PlotOptions,
    ) -> Result<()> {
        check_lengths(PlotKind3D::Scatter, x.len(), y.len())?;
        check_lengths(PlotKind3D::Scatter, x.len(), z.len())?;
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        self.artists.push(Artist3::Line {
            points: zip_points(x, y, z),
            color,
            dash: None,
            width: 0.0,
            marker: Some((
                MarkerShape::Circle,
                options.markersize.unwrap_or(6.0) * self.scale,
            )),
        });
        Ok(())
    }

    pub(crate) fn wireframe(&mut self, grid: &SurfaceGrid, options: &PlotOptions) -> Result<()> {
        let cycle = self.next_cycle();
        let color = options.resolve_color(None, cycle)?;
        self.artists.push(Artist3::Wireframe {
            grid: grid.clone(),
            color,
            width: options.linewidth.unwrap_or(1.0) * self.scale,
        });
        Ok(())
    }

    pub(crate) fn surface(&mut self, grid: &SurfaceGrid, options: &PlotOptions) -> Result<()> {
        check_not_empty(PlotKind3D::PlotSurface, grid.z.len())?;
        self.artists.push(Artist3::Surface {
            grid: grid.clone(),
            alpha: options.alpha.unwrap_or(1.0).clamp(0.0, 1.0),
        });
        Ok(())
    }

    /// Axis limits; equal aspect turns them into a cube.
    pub(crate) fn limits(&self) -> [Range; 3] {
        let mut ranges: [Option<Range>; 3] = [None; 3];
        for artist in &self.artists {
            for point in artist.points() {
                for (axis, value) in [point.x, point.y, point.z].into_iter().enumerate() {
                    if !value.is_finite() {
                        continue;
                    }
                    match ranges[axis].as_mut() {
                        Some(range) => range.expand_to_include(value),
                        None => ranges[axis] = Some(Range::new(value, value)),
                    }
                }
            }
        }
        let ranges = ranges.map(|range| {
            let range = range.unwrap_or(Range::new(0.0, 1.0));
            if range.is_valid() {
                range
            } else {
                Range::centered(range.min, 0.5)
            }
        });
        match self.aspect {
            Aspect::Equal => cube_limits(ranges),
            Aspect::Auto => ranges,
        }
    }

    fn plot_rect(&self) -> ScreenRect {
        let (w, h) = (self.width as f32, self.height as f32);
        ScreenRect::new(
            ScreenPoint::new(w * 0.125, h * 0.12),
            ScreenPoint::new(w * 0.9, h * 0.89),
        )
    }

    pub(crate) fn render_list(&self) -> RenderList {
        let mut list = RenderList::new();
        let rect = self.plot_rect();
        if !rect.is_valid() {
            return list;
        }
        let limits = self.limits();
        let projection = Projection::new(limits, rect);
        let canvas = ScreenRect::new(
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(self.width as f32, self.height as f32),
        );

        self.push_box(&mut list, &projection, limits);
        for artist in &self.artists {
            push_artist(&mut list, artist, &projection, limits, canvas);
        }
        if let Some(title) = &self.title {
            let text = TextStyle {
                size: 10.0 * self.scale,
                ..TextStyle::default()
            };
            list.text(
                ScreenPoint::new(self.width as f32 * 0.5, 6.0 * self.scale),
                title.clone(),
                text.anchored(HAlign::Center, VAlign::Top),
            );
        }
        list
    }

    /// Limit-cube edges plus ticks along three of them.
    fn push_box(&self, list: &mut RenderList, projection: &Projection, limits: [Range; 3]) {
        let [x, y, z] = limits;
        let corner = |i: usize| {
            Point3::new(
                if i & 1 == 0 { x.min } else { x.max },
                if i & 2 == 0 { y.min } else { y.max },
                if i & 4 == 0 { z.min } else { z.max },
            )
        };
        let style = LineStyle {
            color: PANE_EDGE,
            width: self.scale.max(1.0),
            dash: LineDash::Solid,
        };
        let mut edges = Vec::with_capacity(12);
        for a in 0..8_usize {
            for bit in [1_usize, 2, 4] {
                let b = a | bit;
                if b == a {
                    continue;
                }
                if let (Some(start), Some(end)) = (
                    projection.to_screen(corner(a)),
                    projection.to_screen(corner(b)),
                ) {
                    edges.push(LineSegment::new(start, end));
                }
            }
        }
        list.push(RenderCommand::LineSegments {
            segments: edges,
            style,
        });

        let text = TextStyle {
            size: 8.0 * self.scale,
            ..TextStyle::default()
        };
        let offset = 8.0 * self.scale;
        let axes: [(Range, Box<dyn Fn(f64) -> Point3>, HAlign, (f32, f32)); 3] = [
            (
                x,
                Box::new(move |t| Point3::new(t, y.min, z.min)),
                HAlign::Center,
                (0.0, offset),
            ),
            (
                y,
                Box::new(move |t| Point3::new(x.max, t, z.min)),
                HAlign::Left,
                (offset * 0.5, offset * 0.5),
            ),
            (
                z,
                Box::new(move |t| Point3::new(x.min, y.max, t)),
                HAlign::Right,
                (-offset, 0.0),
            ),
        ];
        for (index, (range, at, h_align, (dx, dy))) in axes.into_iter().enumerate() {
            for tick in AxisScale::Linear.ticks(range, 5) {
                let Some(screen) = projection.to_screen(at(tick)) else {
                    continue;
                };
                list.text(
                    ScreenPoint::new(screen.x + dx, screen.y + dy),
                    format_compact(tick),
                    text.clone().anchored(h_align, VAlign::Middle),
                );
            }
            if let Some(label) = self.labels.get(index).and_then(Option::as_ref) {
                let mid = at(range.center());
                if let Some(screen) = projection.to_screen(mid) {
                    list.text(
                        ScreenPoint::new(screen.x + dx * 3.0, screen.y + dy * 3.0),
                        label.clone(),
                        text.clone().anchored(h_align, VAlign::Middle),
                    );
                }
            }
        }
    }

    pub(crate) fn rasterize(&self) -> Image {
        let mut canvas = Canvas::new(self.width, self.height, Color::WHITE);
        canvas.execute(&self.render_list());
        canvas.into_image()
    }
}

fn zip_points(x: &[f64], y: &[f64], z: &[f64]) -> Vec<Point3> {
    x.iter()
        .zip(y)
        .zip(z)
        .map(|((&x, &y), &z)| Point3::new(x, y, z))
        .collect()
}

fn push_artist(
    list: &mut RenderList,
    artist: &Artist3,
    projection: &Projection,
    limits: [Range; 3],
    clip: ScreenRect,
) {
    match artist {
        Artist3::Line {
            points,
            color,
            dash,
            width,
            marker,
        } => {
            let screen: Vec<Option<ScreenPoint>> =
                points.iter().map(|p| projection.to_screen(*p)).collect();
            if let Some(dash) = dash {
                let segments = screen
                    .windows(2)
                    .filter_map(|pair| clip_segment(pair[0]?, pair[1]?, clip))
                    .map(|(start, end)| LineSegment::new(start, end))
                    .collect();
                list.push(RenderCommand::LineSegments {
                    segments,
                    style: LineStyle {
                        color: *color,
                        width: *width,
                        dash: *dash,
                    },
                });
            }
            if let Some((shape, size)) = marker {
                list.push(RenderCommand::Points {
                    points: screen.into_iter().flatten().collect(),
                    style: MarkerStyle {
                        color: *color,
                        size: *size,
                        shape: *shape,
                    },
                });
            }
        }
        Artist3::Wireframe { grid, color, width } => {
            let mut segments = Vec::new();
            let (nx, ny) = (grid.x.len(), grid.y.len());
            for j in 0..ny {
                for i in 0..nx {
                    let here = projection.to_screen(grid.point(i, j));
                    let right = (i + 1 < nx).then(|| projection.to_screen(grid.point(i + 1, j)));
                    let down = (j + 1 < ny).then(|| projection.to_screen(grid.point(i, j + 1)));
                    for next in [right, down].into_iter().flatten() {
                        if let (Some(a), Some(b)) = (here, next) {
                            if let Some((a, b)) = clip_segment(a, b, clip) {
                                segments.push(LineSegment::new(a, b));
                            }
                        }
                    }
                }
            }
            list.push(RenderCommand::LineSegments {
                segments,
                style: LineStyle {
                    color: *color,
                    width: *width,
                    dash: LineDash::Solid,
                },
            });
        }
        Artist3::Surface { grid, alpha } => {
            let z_range = limits[2];
            let mut quads: Vec<(f64, Vec<ScreenPoint>, Color)> = Vec::new();
            for j in 0..grid.y.len() - 1 {
                for i in 0..grid.x.len() - 1 {
                    let corners = [
                        grid.point(i, j),
                        grid.point(i + 1, j),
                        grid.point(i + 1, j + 1),
                        grid.point(i, j + 1),
                    ];
                    let projected: Option<Vec<(ScreenPoint, f64)>> =
                        corners.iter().map(|p| projection.project(*p)).collect();
                    let Some(projected) = projected else {
                        continue;
                    };
                    let depth = projected.iter().map(|(_, d)| d).sum::<f64>() / 4.0;
                    let mean_z = corners.iter().map(|p| p.z).sum::<f64>() / 4.0;
                    let t = (mean_z - z_range.min) / z_range.span();
                    let color = Color::from(viridis(t)).with_alpha(*alpha);
                    quads.push((depth, projected.into_iter().map(|(s, _)| s).collect(), color));
                }
            }
            quads.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (_, points, fill) in quads {
                list.push(RenderCommand::Polygon { points, fill });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_limits_share_the_largest_half_span() {
        let limits = cube_limits([
            Range::new(0.0, 2.0),
            Range::new(10.0, 11.0),
            Range::new(-4.0, 4.0),
        ]);
        assert_eq!(limits[0], Range::new(-3.0, 5.0));
        assert_eq!(limits[1], Range::new(6.5, 14.5));
        assert_eq!(limits[2], Range::new(-4.0, 4.0));
    }

    #[test]
    fn equal_aspect_makes_a_cube() {
        let options = PlotOptions::new().with_aspect(Aspect::Equal);
        let mut axes = Axes3d::new(FigureOptions::new((2.0, 2.0), 100.0), &options);
        axes.line(&[0.0, 1.0], &[0.0, 4.0], &[0.0, 2.0], "o--", &options)
            .expect("valid line");
        let limits = axes.limits();
        assert!(limits.iter().all(|range| (range.span() - 4.0).abs() < 1e-12));
        assert!((limits[0].center() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn grid_shape_is_checked() {
        assert!(SurfaceGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![vec![0.0; 2]]).is_err());
        let grid = SurfaceGrid::from_fn(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], |x, y| x + y)
            .expect("valid grid");
        assert_eq!(grid.z()[1], vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn projection_keeps_the_cube_inside_the_rect() {
        let rect = ScreenRect::new(ScreenPoint::new(10.0, 10.0), ScreenPoint::new(110.0, 90.0));
        let limits = [Range::new(0.0, 1.0); 3];
        let projection = Projection::new(limits, rect);
        for corner in 0..8 {
            let p = Point3::new(
                (corner & 1) as f64,
                ((corner >> 1) & 1) as f64,
                ((corner >> 2) & 1) as f64,
            );
            let screen = projection.to_screen(p).expect("finite corner");
            assert!(screen.x >= 9.99 && screen.x <= 110.01, "{screen:?}");
            assert!(screen.y >= 9.99 && screen.y <= 90.01, "{screen:?}");
        }
        let (top, _) = projection.project(Point3::new(0.5, 0.5, 1.0)).expect("finite");
        let (bottom, _) = projection.project(Point3::new(0.5, 0.5, 0.0)).expect("finite");
        assert!(top.y < bottom.y);
    }

    #[test]
    fn surface_is_painted_with_viridis() {
        let options = PlotOptions::new();
        let mut axes = Axes3d::new(FigureOptions::new((2.0, 2.0), 100.0), &options);
        let grid = SurfaceGrid::from_fn(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0], |x, y| x * y)
            .expect("valid grid");
        axes.surface(&grid, &options).expect("valid surface");
        let polygons = axes
            .render_list()
            .commands()
            .iter()
            .filter(|command| matches!(command, RenderCommand::Polygon { .. }))
            .count();
        assert_eq!(polygons, 4);
        let image = axes.rasterize();
        assert_eq!((image.width(), image.height()), (200, 200));
    }
}
