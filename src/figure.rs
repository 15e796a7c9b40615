//! Figure identity and the windows that figures render into.

use std::fmt;

use chrono::Local;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::VisualizerConfig;
use crate::error::{Result, VisualizerError};
use crate::host::{HostWindow, ImageProvider, WindowDesc, WindowHost, pixel_size};
use crate::image::Image;

/// Identifier of a figure.
///
/// Integers and floats are normalized to their string form, so `1`, `"1"`
/// and `1_i64` all name the same figure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FigureId(String);

impl FigureId {
    /// Create an identifier from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier derived from the current local time of day.
    ///
    /// When the time stamp is already taken, a `#n` suffix keeps it unique.
    pub fn generate(taken: impl Fn(&FigureId) -> bool) -> Self {
        let stamp = Local::now().format("%H:%M:%S%.6f").to_string();
        let candidate = Self(stamp.clone());
        if !taken(&candidate) {
            return candidate;
        }
        (2..)
            .map(|n| Self(format!("{stamp}#{n}")))
            .find(|id| !taken(id))
            .unwrap_or(candidate)
    }

    /// Access the normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_float(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(VisualizerError::InvalidIdentifier(format!(
                "non-finite float {value}"
            )));
        }
        if value.fract() == 0.0 && value.abs() < 1e16 {
            Ok(Self(format!("{value:.1}")))
        } else {
            Ok(Self(value.to_string()))
        }
    }
}

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FigureId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FigureId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&FigureId> for FigureId {
    fn from(value: &FigureId) -> Self {
        value.clone()
    }
}

macro_rules! figure_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FigureId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

figure_id_from_int!(i32, i64, u32, u64, usize);

impl TryFrom<f64> for FigureId {
    type Error = VisualizerError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_float(value)
    }
}

impl TryFrom<&serde_json::Value> for FigureId {
    type Error = VisualizerError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;
        match value {
            Value::String(text) => Ok(Self(text.clone())),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Ok(Self::from(int))
                } else if let Some(int) = number.as_u64() {
                    Ok(Self::from(int))
                } else {
                    number
                        .as_f64()
                        .ok_or_else(|| VisualizerError::InvalidIdentifier(number.to_string()))
                        .and_then(Self::from_float)
                }
            }
            Value::Null => Err(VisualizerError::InvalidIdentifier("null".to_string())),
            Value::Bool(_) => Err(VisualizerError::InvalidIdentifier("bool".to_string())),
            Value::Array(_) => Err(VisualizerError::InvalidIdentifier("array".to_string())),
            Value::Object(_) => Err(VisualizerError::InvalidIdentifier("object".to_string())),
        }
    }
}

/// Window geometry of a new figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureOptions {
    /// Width and height in arbitrary units.
    pub figsize: (f64, f64),
    /// Pixels per unit.
    pub ppu: f64,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            figsize: (6.4, 4.8),
            ppu: 100.0,
        }
    }
}

impl FigureOptions {
    pub fn new(figsize: (f64, f64), ppu: f64) -> Self {
        Self { figsize, ppu }
    }

    /// Pixel dimensions `(int(w·ppu), int(h·ppu))`.
    pub fn pixel_size(&self) -> (u32, u32) {
        pixel_size(self.figsize, self.ppu)
    }
}

impl From<&VisualizerConfig> for FigureOptions {
    fn from(config: &VisualizerConfig) -> Self {
        Self {
            figsize: (config.figsize[0], config.figsize[1]),
            ppu: config.ppu,
        }
    }
}

/// Anything a [`FigureRegistry`](crate::registry::FigureRegistry) can hold.
pub trait Identified {
    fn id(&self) -> &FigureId;
}

/// The native window shared by every figure kind.
///
/// The window is created eagerly and destroyed when this value is dropped.
pub(crate) struct FigureWindow<H: WindowHost> {
    id: FigureId,
    options: FigureOptions,
    window: H::Window,
}

impl<H: WindowHost> FigureWindow<H> {
    pub(crate) fn open(host: &H, prefix: &str, id: FigureId, options: FigureOptions) -> Self {
        let title = format!("{prefix}: {id}");
        let desc = WindowDesc::from_figsize(&title, options.figsize, options.ppu);
        info!("creating window `{title}` ({}x{})", desc.width, desc.height);
        let window = host.create_window(&desc);
        Self {
            id,
            options,
            window,
        }
    }

    pub(crate) fn id(&self) -> &FigureId {
        &self.id
    }

    pub(crate) fn options(&self) -> FigureOptions {
        self.options
    }

    pub(crate) fn window(&self) -> &H::Window {
        &self.window
    }

    pub(crate) fn window_mut(&mut self) -> &mut H::Window {
        &mut self.window
    }

    pub(crate) fn ensure_visible(&mut self) {
        if !self.window.is_visible() {
            self.window.set_visible(true);
        }
    }
}

impl<H: WindowHost> Drop for FigureWindow<H> {
    fn drop(&mut self) {
        debug!("destroying window of figure `{}`", self.id);
        self.window.destroy();
    }
}

/// A window that displays raster images.
///
/// The image provider is created on the first render and reused afterwards.
pub(crate) struct ImageSurface<H: WindowHost> {
    host: H,
    base: FigureWindow<H>,
    provider: Option<H::Provider>,
}

impl<H: WindowHost> ImageSurface<H> {
    pub(crate) fn open(host: &H, prefix: &str, id: FigureId, options: FigureOptions) -> Self {
        Self {
            host: host.clone(),
            base: FigureWindow::open(host, prefix, id, options),
            provider: None,
        }
    }

    pub(crate) fn base(&self) -> &FigureWindow<H> {
        &self.base
    }

    pub(crate) fn provider(&self) -> Option<&H::Provider> {
        self.provider.as_ref()
    }

    pub(crate) fn render(&mut self, image: &Image) {
        self.base.ensure_visible();
        let rgba = image.to_rgba();
        let size = image.size();
        match self.provider.as_mut() {
            Some(provider) => provider.set_bytes_data(&rgba, size),
            None => {
                let mut provider = self.host.create_image_provider();
                provider.set_bytes_data(&rgba, size);
                self.base.window_mut().show_image(&provider);
                self.provider = Some(provider);
            }
        }
    }
}

/// A 2D figure: one native window showing rendered plots and images.
pub struct Figure<H: WindowHost> {
    surface: ImageSurface<H>,
}

impl<H: WindowHost> Figure<H> {
    pub(crate) const PREFIX: &'static str = "Figure";

    /// Create a figure and its visible window.
    pub fn new(host: &H, id: FigureId, options: FigureOptions) -> Self {
        Self {
            surface: ImageSurface::open(host, Self::PREFIX, id, options),
        }
    }

    pub fn id(&self) -> &FigureId {
        self.surface.base().id()
    }

    pub fn options(&self) -> FigureOptions {
        self.surface.base().options()
    }

    pub fn window(&self) -> &H::Window {
        self.surface.base().window()
    }

    /// The image provider, once something has been rendered.
    pub fn provider(&self) -> Option<&H::Provider> {
        self.surface.provider()
    }

    /// Display a raster image, widening it to RGBA.
    pub fn render(&mut self, image: &Image) {
        self.surface.render(image);
    }
}

impl<H: WindowHost> Identified for Figure<H> {
    fn id(&self) -> &FigureId {
        Figure::id(self)
    }
}

/// A 3D figure: like [`Figure`], with 3D plot kinds.
pub struct Figure3D<H: WindowHost> {
    surface: ImageSurface<H>,
}

impl<H: WindowHost> Figure3D<H> {
    pub(crate) const PREFIX: &'static str = "Figure3D";

    /// Create a 3D figure and its visible window.
    pub fn new(host: &H, id: FigureId, options: FigureOptions) -> Self {
        Self {
            surface: ImageSurface::open(host, Self::PREFIX, id, options),
        }
    }

    pub fn id(&self) -> &FigureId {
        self.surface.base().id()
    }

    pub fn options(&self) -> FigureOptions {
        self.surface.base().options()
    }

    pub fn window(&self) -> &H::Window {
        self.surface.base().window()
    }

    pub fn provider(&self) -> Option<&H::Provider> {
        self.surface.provider()
    }

    /// Display a raster image, widening it to RGBA.
    pub fn render(&mut self, image: &Image) {
        self.surface.render(image);
    }
}

impl<H: WindowHost> Identified for Figure3D<H> {
    fn id(&self) -> &FigureId {
        Figure3D::id(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FrameContent, HeadlessHost};

    #[test]
    fn numeric_ids_normalize_to_strings() {
        assert_eq!(FigureId::from(1), FigureId::from("1"));
        assert_eq!(FigureId::try_from(2.5).expect("finite").as_str(), "2.5");
        assert_eq!(FigureId::try_from(3.0).expect("finite").as_str(), "3.0");
        assert!(matches!(
            FigureId::try_from(f64::NAN),
            Err(VisualizerError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn json_ids_accept_scalars_only() {
        let id = FigureId::try_from(&serde_json::json!(7)).expect("integer id");
        assert_eq!(id.as_str(), "7");
        let id = FigureId::try_from(&serde_json::json!("w1")).expect("string id");
        assert_eq!(id.as_str(), "w1");
        for bad in [
            serde_json::json!(true),
            serde_json::json!([1, 2]),
            serde_json::json!({"a": 1}),
            serde_json::Value::Null,
        ] {
            assert!(matches!(
                FigureId::try_from(&bad),
                Err(VisualizerError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn generated_ids_avoid_collisions() {
        let first = FigureId::generate(|_| false);
        let second = FigureId::generate(|id| id.as_str().len() == first.as_str().len());
        assert!(second.as_str().contains('#'));
    }

    #[test]
    fn figure_window_uses_prefix_and_size() {
        let host = HeadlessHost::new();
        let figure = Figure::new(&host, FigureId::from("w1"), FigureOptions::default());
        let windows = host.windows();
        assert_eq!(windows[0].title, "Figure: w1");
        assert_eq!((windows[0].width, windows[0].height), (640, 480));
        assert!(windows[0].visible);
        assert!(figure.provider().is_none());
    }

    #[test]
    fn render_creates_provider_once() {
        let host = HeadlessHost::new();
        let mut figure = Figure::new(&host, FigureId::from("w1"), FigureOptions::default());
        let image = Image::zeros(100, 100, 3).expect("valid shape");
        figure.render(&image);
        figure.render(&image);
        let providers = host.providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].updates, 2);
        assert_eq!(providers[0].size, [100, 100]);
        assert_eq!(providers[0].bytes.len(), 100 * 100 * 4);
        assert_eq!(host.windows()[0].frame, FrameContent::Image(0));
    }

    #[test]
    fn render_reshows_hidden_window() {
        let host = HeadlessHost::new();
        let mut figure = Figure3D::new(&host, FigureId::from(3), FigureOptions::default());
        assert_eq!(host.windows()[0].title, "Figure3D: 3");
        {
            use crate::host::HostWindow;
            figure.surface.base.window_mut().set_visible(false);
        }
        figure.render(&Image::zeros(2, 2, 1).expect("valid shape"));
        assert!(host.windows()[0].visible);
    }

    #[test]
    fn dropping_a_figure_destroys_its_window() {
        let host = HeadlessHost::new();
        drop(Figure::new(&host, FigureId::from("gone"), FigureOptions::default()));
        assert!(host.windows()[0].destroyed);
    }
}
