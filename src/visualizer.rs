//! The plotting call surface.

use log::debug;
use serde::Deserialize;

use crate::chart::{PlotKind, PlotKind3D, PlotOptions, PlotRequest, SurfaceGrid};
use crate::config::VisualizerConfig;
use crate::error::Result;
use crate::figure::{Figure, Figure3D, FigureId, FigureOptions};
use crate::host::WindowHost;
use crate::image::Image;
use crate::native::NativeFigure;
use crate::registry::FigureRegistry;

/// Owns every figure created through the plotting functions.
///
/// 2D, 3D and native figures live in separate registries, so the same id
/// may name one figure of each kind. Plot functions without a figure
/// argument draw into a new figure each call and return its id.
pub struct Visualizer<H: WindowHost> {
    host: H,
    config: VisualizerConfig,
    figures: FigureRegistry<Figure<H>>,
    figures3d: FigureRegistry<Figure3D<H>>,
    native: FigureRegistry<NativeFigure<H>>,
}

impl<H: WindowHost> Visualizer<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, VisualizerConfig::default())
    }

    pub fn with_config(host: H, config: VisualizerConfig) -> Self {
        Self {
            host,
            config,
            figures: FigureRegistry::new(),
            figures3d: FigureRegistry::new(),
            native: FigureRegistry::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    fn default_options(&self) -> FigureOptions {
        FigureOptions::from(&self.config)
    }

    /// The 2D figure named `id`, created with the configured size if absent.
    pub fn figure(&mut self, id: Option<FigureId>) -> &mut Figure<H> {
        let options = self.default_options();
        self.figure_with(id, options)
    }

    /// Like [`figure`](Self::figure); `options` only applies when the figure is created.
    pub fn figure_with(&mut self, id: Option<FigureId>, options: FigureOptions) -> &mut Figure<H> {
        let host = &self.host;
        self.figures
            .get_or_create(id, |id| Figure::new(host, id, options))
    }

    pub fn figure3d(&mut self, id: Option<FigureId>) -> &mut Figure3D<H> {
        let options = self.default_options();
        self.figure3d_with(id, options)
    }

    pub fn figure3d_with(
        &mut self,
        id: Option<FigureId>,
        options: FigureOptions,
    ) -> &mut Figure3D<H> {
        let host = &self.host;
        self.figures3d
            .get_or_create(id, |id| Figure3D::new(host, id, options))
    }

    pub fn native_figure(&mut self, id: Option<FigureId>) -> &mut NativeFigure<H> {
        let options = self.default_options();
        self.native_figure_with(id, options)
    }

    pub fn native_figure_with(
        &mut self,
        id: Option<FigureId>,
        options: FigureOptions,
    ) -> &mut NativeFigure<H> {
        let host = &self.host;
        self.native
            .get_or_create(id, |id| NativeFigure::new(host, id, options))
    }

    pub fn figures(&self) -> &FigureRegistry<Figure<H>> {
        &self.figures
    }

    pub fn figures3d(&self) -> &FigureRegistry<Figure3D<H>> {
        &self.figures3d
    }

    pub fn native_figures(&self) -> &FigureRegistry<NativeFigure<H>> {
        &self.native
    }

    /// Show `image` in the 2D figure named `winname`.
    pub fn imshow(&mut self, winname: impl Into<FigureId>, image: &Image) {
        self.figure(Some(winname.into())).render(image);
    }

    /// Draw into a new 2D figure; the figure is closed again if drawing fails.
    fn draw_new(&mut self, draw: impl FnOnce(&mut Figure<H>) -> Result<()>) -> Result<FigureId> {
        let figure = self.figure(None);
        let id = figure.id().clone();
        match draw(figure) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.figures.close(&id);
                Err(err)
            }
        }
    }

    fn draw_new_3d(
        &mut self,
        draw: impl FnOnce(&mut Figure3D<H>) -> Result<()>,
    ) -> Result<FigureId> {
        let figure = self.figure3d(None);
        let id = figure.id().clone();
        match draw(figure) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.figures3d.close(&id);
                Err(err)
            }
        }
    }

    pub fn plot(
        &mut self,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.plot(x, y, fmt, options))
    }

    pub fn scatter(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.scatter(x, y, options))
    }

    pub fn bar(&mut self, x: &[f64], heights: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.bar(x, heights, options))
    }

    pub fn barh(&mut self, y: &[f64], widths: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.barh(y, widths, options))
    }

    pub fn hist(&mut self, values: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.hist(values, options).map(drop))
    }

    pub fn step(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.step(x, y, options))
    }

    pub fn stem(&mut self, x: &[f64], y: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.stem(x, y, options))
    }

    pub fn fill_between(
        &mut self,
        x: &[f64],
        y1: &[f64],
        y2: &[f64],
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.fill_between(x, y1, y2, options))
    }

    pub fn hlines(
        &mut self,
        y: &[f64],
        xmin: f64,
        xmax: f64,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.hlines(y, xmin, xmax, options))
    }

    pub fn vlines(
        &mut self,
        x: &[f64],
        ymin: f64,
        ymax: f64,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.vlines(x, ymin, ymax, options))
    }

    pub fn errorbar(
        &mut self,
        x: &[f64],
        y: &[f64],
        yerr: &[f64],
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.errorbar(x, y, yerr, options))
    }

    pub fn loglog(
        &mut self,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.loglog(x, y, fmt, options))
    }

    pub fn semilogx(
        &mut self,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.semilogx(x, y, fmt, options))
    }

    pub fn semilogy(
        &mut self,
        x: &[f64],
        y: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.semilogy(x, y, fmt, options))
    }

    pub fn stackplot(
        &mut self,
        x: &[f64],
        ys: &[Vec<f64>],
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new(|figure| figure.stackplot(x, ys, options))
    }

    pub fn pie(&mut self, sizes: &[f64], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.pie(sizes, options))
    }

    pub fn matshow(&mut self, matrix: &[Vec<f64>], options: &PlotOptions) -> Result<FigureId> {
        self.draw_new(|figure| figure.matshow(matrix, options))
    }

    pub fn plot3d(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        fmt: &str,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new_3d(|figure| figure.plot(x, y, z, fmt, options))
    }

    pub fn scatter3d(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new_3d(|figure| figure.scatter(x, y, z, options))
    }

    pub fn plot_wireframe(
        &mut self,
        grid: &SurfaceGrid,
        options: &PlotOptions,
    ) -> Result<FigureId> {
        self.draw_new_3d(|figure| figure.plot_wireframe(grid, options))
    }

    pub fn plot_surface(&mut self, grid: &SurfaceGrid, options: &PlotOptions) -> Result<FigureId> {
        self.draw_new_3d(|figure| figure.plot_surface(grid, options))
    }

    /// Run the 2D plot kind called `kind` with JSON arguments (see [`PlotRequest`]).
    pub fn call(&mut self, kind: &str, args: &serde_json::Value) -> Result<FigureId> {
        let kind: PlotKind = kind.parse()?;
        let request = PlotRequest::deserialize(args)?;
        debug!("dispatching {kind}");
        self.draw_new(|figure| figure.draw(kind, &request))
    }

    /// Run the 3D plot kind called `kind` with JSON arguments.
    pub fn call3d(&mut self, kind: &str, args: &serde_json::Value) -> Result<FigureId> {
        let kind: PlotKind3D = kind.parse()?;
        let request = PlotRequest::deserialize(args)?;
        debug!("dispatching 3D {kind}");
        self.draw_new_3d(|figure| figure.draw(kind, &request))
    }

    /// Close the figure named `id` in every registry holding one.
    pub fn close(&mut self, id: &FigureId) -> bool {
        let closed_2d = self.figures.close(id);
        let closed_3d = self.figures3d.close(id);
        let closed_native = self.native.close(id);
        closed_2d || closed_3d || closed_native
    }

    /// Close every figure.
    pub fn close_all(&mut self) {
        self.figures.close_all();
        self.figures3d.close_all();
        self.native.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use serde_json::json;

    #[test]
    fn imshow_reuses_the_named_figure() {
        let host = HeadlessHost::new();
        let mut visualizer = Visualizer::new(host.clone());
        let image = Image::zeros(10, 10, 3).expect("valid shape");
        visualizer.imshow("camera", &image);
        visualizer.imshow("camera", &image);
        assert_eq!(visualizer.figures().len(), 1);
        assert_eq!(host.providers()[0].updates, 2);
    }

    #[test]
    fn failed_plots_leave_no_figure_behind() {
        let mut visualizer = Visualizer::new(HeadlessHost::new());
        assert!(visualizer.plot(&[1.0], &[], "", &PlotOptions::new()).is_err());
        assert!(visualizer.figures().is_empty());
        assert_eq!(visualizer.host().live_windows(), 0);
    }

    #[test]
    fn call_dispatches_by_name() {
        let mut visualizer = Visualizer::new(HeadlessHost::new());
        let id = visualizer
            .call("bar", &json!({"x": [1, 2, 3], "y": [3, 1, 2], "color": "tab:green"}))
            .expect("valid call");
        assert!(visualizer.figures().contains(&id));
        assert!(matches!(
            visualizer.call("boxplot", &json!({})),
            Err(crate::error::VisualizerError::UnknownPlotKind(_))
        ));
        assert!(matches!(
            visualizer.call("plot", &json!({"x": "nope"})),
            Err(crate::error::VisualizerError::Config(_))
        ));
        visualizer
            .call3d("scatter", &json!({"x": [0], "y": [1], "z": [2]}))
            .expect("valid call");
        assert_eq!(visualizer.figures3d().len(), 1);
    }

    #[test]
    fn close_reaches_every_registry() {
        let host = HeadlessHost::new();
        let mut visualizer = Visualizer::new(host.clone());
        let id = FigureId::from("shared");
        visualizer.figure(Some(id.clone()));
        visualizer.figure3d(Some(id.clone()));
        visualizer.native_figure(Some(id.clone()));
        assert_eq!(host.live_windows(), 3);
        assert!(visualizer.close(&id));
        assert!(!visualizer.close(&id));
        assert_eq!(host.live_windows(), 0);

        visualizer.figure(None);
        visualizer.native_figure(None);
        visualizer.close_all();
        assert_eq!(host.live_windows(), 0);
    }
}
