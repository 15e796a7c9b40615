//! gpui_visualizer shows plots and images in native windows.
//!
//! A [`Visualizer`] keeps registries of 2D, 3D and native figures keyed by
//! [`FigureId`]. Plot kinds are rasterized by a software renderer and handed
//! to the window host as RGBA bytes; native plots are sliding-window line
//! plots updated in place through a [`PlotHandle`]. A [`BackendSession`]
//! redirects the plotting backend and image display hooks into native
//! windows for its lifetime.
//!
//! Windows are created through a [`WindowHost`]. [`HeadlessHost`] records
//! everything in memory; the `gpui` feature adds `GpuiHost`.

#![forbid(unsafe_code)]

pub mod axis;
pub mod backend;
pub mod chart;
pub mod color;
pub mod config;
pub mod error;
pub mod figure;
pub mod geom;
#[cfg(feature = "gpui")]
pub mod gpui_backend;
pub mod host;
pub mod image;
pub mod native;
pub mod registry;
pub mod render;
pub mod style;
mod transform;
pub mod view;
pub mod visualizer;

pub use backend::{BackendSession, Backends, FigureNum, HeadlessDisplay, ImageDisplay};
pub use chart::{FormatSpec, PlotKind, PlotKind3D, PlotOptions, PlotRequest, SurfaceGrid};
pub use config::VisualizerConfig;
pub use error::{Result, VisualizerError};
pub use figure::{Figure, Figure3D, FigureId, FigureOptions};
pub use geom::{Point, Point3};
#[cfg(feature = "gpui")]
pub use gpui_backend::GpuiHost;
pub use host::{HeadlessHost, HostWindow, ImageProvider, WindowDesc, WindowHost};
pub use crate::image::Image;
pub use native::{NativeFigure, NativePlotConfig, PlotHandle};
pub use registry::FigureRegistry;
pub use style::Theme;
pub use view::{Aspect, Range};
pub use visualizer::Visualizer;
