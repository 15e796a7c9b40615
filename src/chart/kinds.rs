//! Plot kind wrappers on figures.
//!
//! Every wrapper draws a fresh set of axes at the figure's pixel size and
//! renders the result into the figure window.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::axis::AxisScale;
use crate::chart::{Axes2d, Axes3d, PlotKind, PlotKind3D, PlotOptions, SurfaceGrid};
use crate::error::Result;
use crate::figure::{Figure, Figure3D};
use crate::host::WindowHost;

/// Arguments of a plot call addressed by kind name.
///
/// Each kind reads the fields it needs:
///
/// | kind | fields |
/// |------|--------|
/// | `plot`, `loglog`, `semilogx`, `semilogy` | `x`, `y`, `fmt` |
/// | `scatter`, `step`, `stem`, `bar` | `x`, `y` |
/// | `barh` | `y` positions, `x` widths |
/// | `hist`, `pie` | `values` |
/// | `fill_between` | `x`, `y`, `y2` |
/// | `hlines` | `y`, `xmin`, `xmax` |
/// | `vlines` | `x`, `ymin`, `ymax` |
/// | `errorbar` | `x`, `y`, `yerr` |
/// | `stackplot` | `x`, `ys` |
/// | `matshow` | `matrix` |
/// | 3D `plot`, `scatter` | `x`, `y`, `z`, `fmt` |
/// | 3D `plot_wireframe`, `plot_surface` | `x`, `y`, `matrix` as z rows |
///
/// `scatter` also takes per-point `s` (sizes) and `c` (color values) options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotRequest {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub y2: Vec<f64>,
    pub ys: Vec<Vec<f64>>,
    pub yerr: Vec<f64>,
    pub values: Vec<f64>,
    pub matrix: Vec<Vec<f64>>,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub fmt: String,
    #[serde(flatten)]
    pub options: PlotOptions,
}

impl<H: WindowHost> Figure<H> {
    fn axes(&self, options: &PlotOptions) -> Axes2d {
        Axes2d::new(self.options(), options)
    }

    fn show(&mut self, kind: PlotKind, axes: &Axes2d) {
        debug!("drawing {kind} into figure `{}`", self.id());
        self.render(&axes.rasterize());
    }

    fn draw_line(
        &mut self,
        kind: PlotKind,
        scales: (AxisScale, AxisScale),
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<()> {
        let mut axes = self.axes(options);
        axes.set_scales(scales.0, scales.1);
        axes.line(kind, x, y, fmt, options)?;
        self.show(kind, &axes);
        Ok(())
    }

    /// Line and/or markers styled by a `[color][marker][line]` format string.
    pub fn plot(&mut self, x: &[f64], y: &[f64], fmt: &str, options: &PlotOptions) -> Result<()> {
        let linear = (AxisScale::Linear, AxisScale::Linear);
        self.draw_line(PlotKind::Plot, linear, x, y, fmt, options)
    }

    pub fn loglog(&mut self, x: &[f64], y: &[f64], fmt: &str, options: &PlotOptions) -> Result<()> {
        let scales = (AxisScale::Log10, AxisScale::Log10);
        self.draw_line(PlotKind::Loglog, scales, x, y, fmt, options)
    }

    pub fn semilogx(
        &mut self,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<()> {
        let scales = (AxisScale::Log10, AxisScale::Linear);
        self.draw_line(PlotKind::Semilogx, scales, x, y, fmt, options)
    }

    pub fn semilogy(
        &mut self,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<()> {
        let scales = (AxisScale::Linear, AxisScale::Log10);
        self.draw_line(PlotKind::Semilogy, scales, x, y, fmt, options)
    }

    pub fn scatter(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.scatter(x, y, options)?;
        self.show(PlotKind::Scatter, &axes);
        Ok(())
    }

    /// Vertical bars of width 0.8 centered on `x`.
    pub fn bar(&mut self, x: &[f64], heights: &[f64], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.bar(x, heights, options)?;
        self.show(PlotKind::Bar, &axes);
        Ok(())
    }

    /// Horizontal bars of height 0.8 centered on `y`.
    pub fn barh(&mut self, y: &[f64], widths: &[f64], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.barh(y, widths, options)?;
        self.show(PlotKind::Barh, &axes);
        Ok(())
    }

    /// Histogram of the finite values; returns the count of each bin.
    pub fn hist(&mut self, values: &[f64], options: &PlotOptions) -> Result<Vec<usize>> {
        let mut axes = self.axes(options);
        let counts = axes.hist(values, options)?;
        self.show(PlotKind::Hist, &axes);
        Ok(counts)
    }

    pub fn step(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.step(x, y, options)?;
        self.show(PlotKind::Step, &axes);
        Ok(())
    }

    pub fn stem(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.stem(x, y, options)?;
        self.show(PlotKind::Stem, &axes);
        Ok(())
    }

    pub fn fill_between(
        &mut self,
        x: &[f64],
        y1: &[f64],
        y2: &[f64],
        options: &PlotOptions,
    ) -> Result<()> {
        let mut axes = self.axes(options);
        axes.fill_between(x, y1, y2, options)?;
        self.show(PlotKind::FillBetween, &axes);
        Ok(())
    }

    pub fn hlines(&mut self, y: &[f64], xmin: f64, xmax: f64, options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.hlines(y, xmin, xmax, options)?;
        self.show(PlotKind::Hlines, &axes);
        Ok(())
    }

    pub fn vlines(&mut self, x: &[f64], ymin: f64, ymax: f64, options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.vlines(x, ymin, ymax, options)?;
        self.show(PlotKind::Vlines, &axes);
        Ok(())
    }

    /// `yerr` holds one error per point, or a single error for all of them.
    pub fn errorbar(
        &mut self,
        x: &[f64],
        y: &[f64],
        yerr: &[f64],
        options: &PlotOptions,
    ) -> Result<()> {
        let mut axes = self.axes(options);
        axes.errorbar(x, y, yerr, options)?;
        self.show(PlotKind::Errorbar, &axes);
        Ok(())
    }

    pub fn stackplot(&mut self, x: &[f64], ys: &[Vec<f64>], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.stackplot(x, ys, options)?;
        self.show(PlotKind::Stackplot, &axes);
        Ok(())
    }

    pub fn pie(&mut self, sizes: &[f64], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.pie(sizes, options)?;
        self.show(PlotKind::Pie, &axes);
        Ok(())
    }

    /// Matrix as a grid of viridis cells, first row at the top.
    pub fn matshow(&mut self, matrix: &[Vec<f64>], options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.matshow(matrix, options)?;
        self.show(PlotKind::Matshow, &axes);
        Ok(())
    }

    /// Run the plot kind `kind` with the arguments in `request`.
    pub fn draw(&mut self, kind: PlotKind, request: &PlotRequest) -> Result<()> {
        let PlotRequest {
            x,
            y,
            options,
            fmt,
            ..
        } = request;
        match kind {
            PlotKind::Plot => self.plot(x, y, fmt, options),
            PlotKind::Loglog => self.loglog(x, y, fmt, options),
            PlotKind::Semilogx => self.semilogx(x, y, fmt, options),
            PlotKind::Semilogy => self.semilogy(x, y, fmt, options),
            PlotKind::Scatter => self.scatter(x, y, options),
            PlotKind::Bar => self.bar(x, y, options),
            PlotKind::Barh => self.barh(y, x, options),
            PlotKind::Hist => self.hist(&request.values, options).map(drop),
            PlotKind::Step => self.step(x, y, options),
            PlotKind::Stem => self.stem(x, y, options),
            PlotKind::FillBetween => self.fill_between(x, y, &request.y2, options),
            PlotKind::Hlines => self.hlines(y, request.xmin, request.xmax, options),
            PlotKind::Vlines => self.vlines(x, request.ymin, request.ymax, options),
            PlotKind::Errorbar => self.errorbar(x, y, &request.yerr, options),
            PlotKind::Stackplot => self.stackplot(x, &request.ys, options),
            PlotKind::Pie => self.pie(&request.values, options),
            PlotKind::Matshow => self.matshow(&request.matrix, options),
        }
    }
}

impl<H: WindowHost> Figure3D<H> {
    fn axes(&self, options: &PlotOptions) -> Axes3d {
        Axes3d::new(self.options(), options)
    }

    fn show(&mut self, kind: PlotKind3D, axes: &Axes3d) {
        debug!("drawing 3D {kind} into figure `{}`", self.id());
        self.render(&axes.rasterize());
    }

    pub fn plot(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<()> {
        let mut axes = self.axes(options);
        axes.line(x, y, z, fmt, options)?;
        self.show(PlotKind3D::Plot, &axes);
        Ok(())
    }

    pub fn scatter(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        options: &PlotOptions,
    ) -> Result<()> {
        let mut axes = self.axes(options);
        axes.scatter(x, y, z, options)?;
        self.show(PlotKind3D::Scatter, &axes);
        Ok(())
    }

    pub fn plot_wireframe(&mut self, grid: &SurfaceGrid, options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.wireframe(grid, options)?;
        self.show(PlotKind3D::PlotWireframe, &axes);
        Ok(())
    }

    /// Surface patches colored by height with viridis.
    pub fn plot_surface(&mut self, grid: &SurfaceGrid, options: &PlotOptions) -> Result<()> {
        let mut axes = self.axes(options);
        axes.surface(grid, options)?;
        self.show(PlotKind3D::PlotSurface, &axes);
        Ok(())
    }

    /// Run the 3D plot kind `kind` with the arguments in `request`.
    pub fn draw(&mut self, kind: PlotKind3D, request: &PlotRequest) -> Result<()> {
        let PlotRequest {
            x, y, z, options, ..
        } = request;
        match kind {
            PlotKind3D::Plot => self.plot(x, y, z, &request.fmt, options),
            PlotKind3D::Scatter => self.scatter(x, y, z, options),
            PlotKind3D::PlotWireframe | PlotKind3D::PlotSurface => {
                let grid = SurfaceGrid::new(x.clone(), y.clone(), request.matrix.clone())?;
                if kind == PlotKind3D::PlotWireframe {
                    self.plot_wireframe(&grid, options)
                } else {
                    self.plot_surface(&grid, options)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{FigureId, FigureOptions};
    use crate::host::HeadlessHost;

    fn figure(host: &HeadlessHost) -> Figure<HeadlessHost> {
        Figure::new(host, FigureId::from("kinds"), FigureOptions::new((3.0, 2.0), 50.0))
    }

    #[test]
    fn each_kind_renders_at_figure_size() {
        let host = HeadlessHost::new();
        let mut figure = figure(&host);
        let request = PlotRequest {
            x: vec![1.0, 2.0, 3.0],
            y: vec![1.0, 4.0, 9.0],
            y2: vec![0.0, 0.0, 0.0],
            ys: vec![vec![1.0, 1.0, 1.0], vec![2.0, 1.0, 0.5]],
            yerr: vec![0.5],
            values: vec![1.0, 2.0, 2.0, 3.0],
            matrix: vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            xmin: 0.0,
            xmax: 1.0,
            ymin: 0.0,
            ymax: 1.0,
            ..PlotRequest::default()
        };
        for kind in PlotKind::ALL {
            figure.draw(kind, &request).unwrap_or_else(|err| panic!("{kind}: {err}"));
        }
        let provider = &host.providers()[0];
        assert_eq!(provider.updates, PlotKind::ALL.len());
        assert_eq!(provider.size, [150, 100]);
        assert_eq!(provider.bytes.len(), 150 * 100 * 4);
    }

    #[test]
    fn failed_draw_leaves_figure_untouched() {
        let host = HeadlessHost::new();
        let mut figure = figure(&host);
        let result = figure.plot(&[1.0, 2.0], &[1.0], "", &PlotOptions::new());
        assert!(result.is_err());
        assert!(host.providers().is_empty());
    }

    #[test]
    fn request_parses_from_json_with_flattened_options() {
        let request: PlotRequest = serde_json::from_str(
            r#"{"x": [1, 2], "y": [3, 4], "fmt": "ro--", "color": "orange", "aspect": "equal"}"#,
        )
        .expect("valid request");
        assert_eq!(request.fmt, "ro--");
        assert_eq!(request.options.color.as_deref(), Some("orange"));
        assert_eq!(request.options.aspect, crate::view::Aspect::Equal);
    }

    #[test]
    fn surface_request_needs_matching_grid() {
        let host = HeadlessHost::new();
        let mut figure = Figure3D::new(&host, FigureId::from("3d"), FigureOptions::default());
        let request = PlotRequest {
            x: vec![0.0, 1.0],
            y: vec![0.0, 1.0],
            matrix: vec![vec![0.0, 1.0]],
            ..PlotRequest::default()
        };
        assert!(figure.draw(PlotKind3D::PlotSurface, &request).is_err());
        let request = PlotRequest {
            matrix: vec![vec![0.0, 1.0], vec![1.0, 2.0]],
            ..request
        };
        figure
            .draw(PlotKind3D::PlotWireframe, &request)
            .expect("valid wireframe");
        assert_eq!(host.providers()[0].size, [640, 480]);
    }
}
