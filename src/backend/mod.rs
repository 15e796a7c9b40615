//! Plotting backend and image display hooks that a [`BackendSession`] redirects.

mod manager;
mod session;

pub use manager::{FigureManager, WindowDisplay};
pub use session::BackendSession;

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::error::{Result, VisualizerError};
use crate::figure::FigureOptions;
use crate::image::Image;

/// Backend name activated for the lifetime of a session.
pub const NATIVE_BACKEND: &str = "module://visualizer";
/// Backend used when restoring an invalid name.
pub const FALLBACK_BACKEND: &str = "agg";

const BUILTIN_BACKENDS: &[&str] = &[
    "agg", "cairo", "gtk3agg", "gtk3cairo", "gtk4agg", "gtk4cairo", "macosx", "nbagg", "pdf",
    "pgf", "ps", "qt5agg", "qt5cairo", "qtagg", "qtcairo", "svg", "template", "tkagg",
    "tkcairo", "webagg", "wx", "wxagg", "wxcairo",
];

/// Whether `name` is a builtin backend or a `module://` backend.
pub fn is_valid_backend(name: &str) -> bool {
    name.strip_prefix("module://")
        .map(|module| !module.is_empty())
        .unwrap_or_else(|| {
            BUILTIN_BACKENDS
                .iter()
                .any(|builtin| builtin.eq_ignore_ascii_case(name))
        })
}

/// Number or name of a figure shown through [`ImageDisplay::show_figure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureNum {
    Number(i64),
    Name(String),
}

impl FigureNum {
    /// `"Figure <n>"` for numbers, the name itself otherwise.
    pub fn title(&self) -> String {
        match self {
            Self::Number(num) => format!("Figure {num}"),
            Self::Name(name) => name.clone(),
        }
    }
}

impl From<i64> for FigureNum {
    fn from(num: i64) -> Self {
        Self::Number(num)
    }
}

impl From<&str> for FigureNum {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Image display hooks: `imshow`, `wait_key` and figure display.
pub trait ImageDisplay {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Show `image` in the window called `winname`.
    fn imshow(&mut self, winname: &str, image: &Image) -> Result<()>;

    /// Wait for a key press; `-1` when none arrived.
    fn wait_key(&mut self, delay_ms: i32) -> i32;

    /// Show a rasterized figure.
    fn show_figure(&mut self, num: &FigureNum, image: &Image, options: FigureOptions)
    -> Result<()>;

    /// Close every window opened through these hooks.
    fn destroy_all(&mut self);
}

/// Hooks that only log what they are asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessDisplay {
    name: String,
}

impl HeadlessDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new("headless")
    }
}

impl ImageDisplay for HeadlessDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn imshow(&mut self, winname: &str, image: &Image) -> Result<()> {
        debug!(
            "{}: imshow `{winname}` {}x{}",
            self.name,
            image.width(),
            image.height()
        );
        Ok(())
    }

    fn wait_key(&mut self, _delay_ms: i32) -> i32 {
        -1
    }

    fn show_figure(
        &mut self,
        num: &FigureNum,
        image: &Image,
        _options: FigureOptions,
    ) -> Result<()> {
        debug!(
            "{}: show `{}` {}x{}",
            self.name,
            num.title(),
            image.width(),
            image.height()
        );
        Ok(())
    }

    fn destroy_all(&mut self) {}
}

/// The active plotting backend, its style parameters and the display hooks.
pub struct Backends {
    plotting_backend: String,
    style: BTreeMap<String, String>,
    display: Box<dyn ImageDisplay>,
}

impl Backends {
    /// Backends with the given active backend and logging-only hooks.
    pub fn new(plotting_backend: impl Into<String>) -> Self {
        Self::with_display(plotting_backend, Box::new(HeadlessDisplay::default()))
    }

    pub fn with_display(
        plotting_backend: impl Into<String>,
        display: Box<dyn ImageDisplay>,
    ) -> Self {
        Self {
            plotting_backend: plotting_backend.into(),
            style: BTreeMap::new(),
            display,
        }
    }

    /// Name of the active plotting backend.
    pub fn plotting_backend(&self) -> &str {
        &self.plotting_backend
    }

    /// Switch the plotting backend.
    pub fn use_backend(&mut self, name: &str) -> Result<()> {
        if !is_valid_backend(name) {
            return Err(VisualizerError::invalid_argument(format!(
                "unknown plotting backend `{name}`"
            )));
        }
        debug!("plotting backend `{}` -> `{name}`", self.plotting_backend);
        self.plotting_backend = name.to_string();
        Ok(())
    }

    pub fn set_style_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.style.insert(key.into(), value.into());
    }

    pub fn style_param(&self, key: &str) -> Option<&str> {
        self.style.get(key).map(String::as_str)
    }

    /// Reset every style parameter to its default.
    pub fn reset_style(&mut self) {
        self.style.clear();
    }

    /// The installed display hooks.
    pub fn display(&self) -> &dyn ImageDisplay {
        self.display.as_ref()
    }

    pub fn imshow(&mut self, winname: &str, image: &Image) -> Result<()> {
        self.display.imshow(winname, image)
    }

    pub fn wait_key(&mut self, delay_ms: i32) -> i32 {
        self.display.wait_key(delay_ms)
    }

    pub fn show_figure(
        &mut self,
        num: impl Into<FigureNum>,
        image: &Image,
        options: FigureOptions,
    ) -> Result<()> {
        self.display.show_figure(&num.into(), image, options)
    }

    fn swap_display(&mut self, display: Box<dyn ImageDisplay>) -> Box<dyn ImageDisplay> {
        std::mem::replace(&mut self.display, display)
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("plotting_backend", &self.plotting_backend)
            .field("style", &self.style)
            .field("display", &self.display.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_are_validated() {
        assert!(is_valid_backend("TkAgg"));
        assert!(is_valid_backend("agg"));
        assert!(is_valid_backend(NATIVE_BACKEND));
        assert!(!is_valid_backend("module://"));
        assert!(!is_valid_backend("not-a-backend"));

        let mut backends = Backends::new("agg");
        assert!(backends.use_backend("bogus").is_err());
        assert_eq!(backends.plotting_backend(), "agg");
        backends.use_backend("QtAgg").expect("builtin backend");
        assert_eq!(backends.plotting_backend(), "QtAgg");
    }

    #[test]
    fn figure_titles() {
        assert_eq!(FigureNum::from(3).title(), "Figure 3");
        assert_eq!(FigureNum::from("camera").title(), "camera");
    }

    #[test]
    fn style_params_reset() {
        let mut backends = Backends::new("agg");
        backends.set_style_param("lines.linewidth", "3");
        assert_eq!(backends.style_param("lines.linewidth"), Some("3"));
        backends.reset_style();
        assert_eq!(backends.style_param("lines.linewidth"), None);
    }

    #[test]
    fn headless_hooks_never_see_keys() {
        let mut backends = Backends::new("agg");
        let image = Image::zeros(2, 2, 3).expect("valid shape");
        backends.imshow("w", &image).expect("logged");
        assert_eq!(backends.wait_key(10), -1);
        assert_eq!(backends.display().name(), "headless");
    }
}
