//! Host windowing toolkit seam.
//!
//! Figures never talk to a GUI toolkit directly. They create windows and
//! image providers through a [`WindowHost`] and drive them through
//! [`HostWindow`] and [`ImageProvider`]. The crate ships a recording
//! [`HeadlessHost`] and, behind the `gpui` feature, a GPUI host.

mod headless;

pub use headless::{
    FrameContent, HeadlessHost, HeadlessProvider, HeadlessWindow, ProviderRecord, WindowRecord,
};

use crate::native::PlotHandle;

/// Parameters for a new native window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDesc {
    /// Window title.
    pub title: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether the window starts visible.
    pub visible: bool,
}

impl WindowDesc {
    /// Visible window with the given title and pixel size.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            visible: true,
        }
    }

    /// Pixel size derived from a figure size and pixels-per-unit.
    ///
    /// Fractional pixels are truncated.
    pub fn from_figsize(title: impl Into<String>, figsize: (f64, f64), ppu: f64) -> Self {
        let (width, height) = pixel_size(figsize, ppu);
        Self::new(title, width, height)
    }
}

/// Truncated pixel dimensions of `figsize × ppu`.
pub(crate) fn pixel_size(figsize: (f64, f64), ppu: f64) -> (u32, u32) {
    let dim = |units: f64| {
        let px = units * ppu;
        if px.is_finite() && px > 0.0 {
            px.min(f64::from(u32::MAX)) as u32
        } else {
            0
        }
    };
    (dim(figsize.0), dim(figsize.1))
}

/// Factory for native windows and image providers.
pub trait WindowHost: Clone {
    /// Window handle type.
    type Window: HostWindow<Provider = Self::Provider>;
    /// Image provider type.
    type Provider: ImageProvider;

    /// Create a native window.
    fn create_window(&self, desc: &WindowDesc) -> Self::Window;

    /// Create an empty image provider.
    fn create_image_provider(&self) -> Self::Provider;
}

/// A native window owned by exactly one figure.
pub trait HostWindow {
    /// Provider type this window can display.
    type Provider;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    fn set_title(&mut self, title: &str);

    /// Replace the window frame with an image view bound to `provider`.
    fn show_image(&mut self, provider: &Self::Provider);

    /// Tear down the frame and rebuild it as a vertical stack of native plots.
    fn show_native_plots(&mut self, plots: &[PlotHandle]);

    /// Destroy the native window. Calling it twice is a no-op.
    fn destroy(&mut self);
}

/// A mutable RGBA byte sink displayed by an image view.
pub trait ImageProvider {
    /// Replace the backing bytes and the declared `[width, height]`.
    fn set_bytes_data(&mut self, rgba: &[u8], size: [u32; 2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_truncates() {
        assert_eq!(pixel_size((6.4, 4.8), 100.0), (640, 480));
        assert_eq!(pixel_size((1.005, 2.0), 100.0), (100, 200));
        assert_eq!(pixel_size((-1.0, f64::NAN), 100.0), (0, 0));
    }
}
