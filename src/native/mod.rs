//! Native line plots with sliding-window buffers.
//!
//! A [`NativeFigure`] hands its plots to the host window as a vertical
//! stack. Data updates go through [`PlotHandle`]s and never rebuild the
//! window; adding a plot does.

mod plot;

pub use plot::{NativePlotState, PLOT_HEIGHT, PlotHandle};

use log::info;
use serde::{Deserialize, Serialize};

use crate::color::line_colors;
use crate::config::VisualizerConfig;
use crate::error::{Result, VisualizerError};
use crate::figure::{FigureId, FigureOptions, FigureWindow, Identified};
use crate::geom::{ScreenPoint, ScreenRect};
use crate::host::{HostWindow, WindowHost};
use crate::image::Image;
use crate::render::{Canvas, Color, RenderList};
use crate::style::Theme;

const PLOT_GAP: f32 = 15.0;

/// Settings of a new native plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativePlotConfig {
    /// Title label; empty for none.
    pub title: String,
    /// Number of parallel lines, at least one.
    pub lines: usize,
    /// One color per line. Any other count selects the default palette.
    pub colors: Vec<String>,
    /// Fixed y scale. Without it the scale follows the data.
    pub ylim: Option<(f64, f64)>,
    /// Sliding window length. `None` or `0` keeps every sample.
    pub window_size: Option<usize>,
    pub theme: Theme,
    /// Plot identifier; generated from the time of day when absent.
    pub uid: Option<String>,
}

impl Default for NativePlotConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            lines: 1,
            colors: Vec::new(),
            ylim: None,
            window_size: Some(250),
            theme: Theme::default(),
            uid: None,
        }
    }
}

impl From<&VisualizerConfig> for NativePlotConfig {
    fn from(config: &VisualizerConfig) -> Self {
        Self {
            window_size: Some(config.native_window_size),
            theme: config.native_theme,
            ..Self::default()
        }
    }
}

impl NativePlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_lines(mut self, lines: usize) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ylim(mut self, min: f64, max: f64) -> Self {
        self.ylim = Some((min, max));
        self
    }

    pub fn with_window_size(mut self, window_size: Option<usize>) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}

/// A window holding a stack of native line plots.
pub struct NativeFigure<H: WindowHost> {
    base: FigureWindow<H>,
    plots: Vec<PlotHandle>,
}

impl<H: WindowHost> NativeFigure<H> {
    pub(crate) const PREFIX: &'static str = "Native figure";

    pub fn new(host: &H, id: FigureId, options: FigureOptions) -> Self {
        Self {
            base: FigureWindow::open(host, Self::PREFIX, id, options),
            plots: Vec::new(),
        }
    }

    pub fn id(&self) -> &FigureId {
        self.base.id()
    }

    pub fn options(&self) -> FigureOptions {
        self.base.options()
    }

    pub fn window(&self) -> &H::Window {
        self.base.window()
    }

    /// Append a plot and rebuild the window.
    ///
    /// Uids are not required to be unique; [`plot`](Self::plot) finds the first match.
    pub fn add_plot(&mut self, config: NativePlotConfig) -> Result<PlotHandle> {
        if config.lines == 0 {
            return Err(VisualizerError::invalid_argument(
                "native plots need at least one line",
            ));
        }
        let colors = line_colors(config.lines, &config.colors)?;
        let uid = match config.uid {
            Some(uid) => uid,
            None => FigureId::generate(|candidate| self.position(candidate.as_str()).is_some())
                .to_string(),
        };
        let handle = PlotHandle::new(NativePlotState::new(
            uid.clone(),
            config.title,
            config.theme,
            colors,
            config.ylim,
            config.window_size,
        ));
        self.plots.push(handle.clone());
        info!(
            "figure `{}`: native plot `{uid}` with {} lines",
            self.id(),
            config.lines
        );
        self.base.window_mut().show_native_plots(&self.plots);
        Ok(handle)
    }

    /// First plot added with the given uid.
    pub fn plot(&self, uid: &str) -> Option<PlotHandle> {
        self.position(uid).map(|index| self.plots[index].clone())
    }

    /// Plots in display order.
    pub fn plots(&self) -> &[PlotHandle] {
        &self.plots
    }

    /// Rasterize the plot stack as the window shows it.
    pub fn snapshot(&self) -> Image {
        let (width, height) = self.options().pixel_size();
        let mut canvas = Canvas::new(width as usize, height as usize, Color::WHITE);
        canvas.execute(&render_stack(&self.plots, width as f32));
        canvas.into_image()
    }

    fn position(&self, uid: &str) -> Option<usize> {
        self.plots.iter().position(|plot| plot.read(|state| state.uid() == uid))
    }
}

/// Plots stacked top to bottom, `PLOT_GAP` apart, in a frame `width` pixels wide.
pub(crate) fn render_stack(plots: &[PlotHandle], width: f32) -> RenderList {
    let mut list = RenderList::new();
    let mut y = PLOT_GAP;
    for plot in plots {
        plot.read(|state| {
            let bounds = ScreenRect::new(
                ScreenPoint::new(PLOT_GAP, y),
                ScreenPoint::new(width - PLOT_GAP, y + state.preferred_height()),
            );
            list.append(state.render_list(bounds));
            y += state.preferred_height() + PLOT_GAP;
        });
    }
    list
}

impl<H: WindowHost> Identified for NativeFigure<H> {
    fn id(&self) -> &FigureId {
        NativeFigure::id(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FrameContent, HeadlessHost};

    fn native(host: &HeadlessHost) -> NativeFigure<HeadlessHost> {
        NativeFigure::new(host, FigureId::from("n"), FigureOptions::new((4.0, 4.0), 100.0))
    }

    #[test]
    fn add_plot_rebuilds_the_frame() {
        let host = HeadlessHost::new();
        let mut figure = native(&host);
        assert_eq!(host.windows()[0].title, "Native figure: n");
        figure
            .add_plot(NativePlotConfig::new().with_uid("a"))
            .expect("valid plot");
        figure
            .add_plot(NativePlotConfig::new().with_uid("b").with_lines(2))
            .expect("valid plot");
        let window = &host.windows()[0];
        assert_eq!(window.frame, FrameContent::NativePlots(2));
        assert_eq!(window.rebuilds, 2);
        assert_eq!(host.native_plots(0).len(), 2);
    }

    #[test]
    fn data_updates_do_not_rebuild() {
        let host = HeadlessHost::new();
        let mut figure = native(&host);
        let plot = figure.add_plot(NativePlotConfig::new()).expect("valid plot");
        plot.add_value(1.0).expect("one line");
        plot.add_value(2.0).expect("one line");
        assert_eq!(host.windows()[0].rebuilds, 1);
        let shown = &host.native_plots(0)[0];
        assert!(shown.ptr_eq(&plot));
        assert_eq!(shown.generation(), 2);
    }

    #[test]
    fn same_uid_appends_and_lookup_finds_the_first() {
        let host = HeadlessHost::new();
        let mut figure = native(&host);
        let first = figure
            .add_plot(NativePlotConfig::new().with_uid("x"))
            .expect("valid plot");
        let second = figure
            .add_plot(NativePlotConfig::new().with_uid("x").with_lines(3))
            .expect("valid plot");
        assert_eq!(figure.plots().len(), 2);
        assert_eq!(host.windows()[0].frame, FrameContent::NativePlots(2));
        let found = figure.plot("x").expect("plot exists");
        assert!(found.ptr_eq(&first));
        assert!(!found.ptr_eq(&second));
        assert!(figure.plots()[1].ptr_eq(&second));
        second.add_data(&[1.0, 2.0, 3.0]).expect("three lines");
        assert!(figure.plot("missing").is_none());
    }

    #[test]
    fn colors_fall_back_to_the_palette() {
        let host = HeadlessHost::new();
        let mut figure = native(&host);
        let plot = figure
            .add_plot(NativePlotConfig::new().with_lines(2).with_colors(["red"]))
            .expect("valid plot");
        assert_eq!(plot.colors(), vec![0xFF00_00FF, 0xFF00_8000]);
        let plot = figure
            .add_plot(NativePlotConfig::new().with_lines(1).with_colors(["#00ff00"]))
            .expect("valid plot");
        assert_eq!(plot.colors(), vec![0xFF00_FF00]);
        let err = figure
            .add_plot(NativePlotConfig::new().with_colors(["nope"]))
            .expect_err("unknown color");
        assert!(matches!(err, VisualizerError::InvalidColor(_)));
        assert!(figure.add_plot(NativePlotConfig::new().with_lines(0)).is_err());
    }

    #[test]
    fn generated_uids_are_distinct() {
        let host = HeadlessHost::new();
        let mut figure = native(&host);
        let a = figure.add_plot(NativePlotConfig::new()).expect("valid plot");
        let b = figure.add_plot(NativePlotConfig::new()).expect("valid plot");
        assert_ne!(a.uid(), b.uid());
        assert_eq!(figure.plots().len(), 2);
    }

    #[test]
    fn snapshot_paints_the_theme_background() {
        let host = HeadlessHost::new();
        let mut figure = native(&host);
        figure
            .add_plot(NativePlotConfig::new().with_theme(Theme::Dark))
            .expect("valid plot");
        let image = figure.snapshot();
        assert_eq!(image.size(), [400, 400]);
        let dark = image
            .data()
            .chunks_exact(4)
            .filter(|px| px[..3] == [0x55, 0x55, 0x55])
            .count();
        assert!(dark > 1000);
    }
}
