use log::{debug, warn};

use crate::backend::{FigureNum, ImageDisplay};
use crate::error::Result;
use crate::figure::FigureOptions;
use crate::host::{HostWindow, ImageProvider, WindowDesc, WindowHost};
use crate::image::Image;

/// A titled window created on its first render.
pub struct FigureManager<H: WindowHost> {
    host: H,
    title: String,
    window: Option<H::Window>,
    provider: Option<H::Provider>,
}

impl<H: WindowHost> FigureManager<H> {
    pub fn new(host: &H, title: impl Into<String>) -> Self {
        Self {
            host: host.clone(),
            title: title.into(),
            window: None,
            provider: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn window(&self) -> Option<&H::Window> {
        self.window.as_ref()
    }

    pub fn set_window_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        if let Some(window) = self.window.as_mut() {
            window.set_title(&self.title);
        }
    }

    /// Windows keep the size they were created with.
    pub fn resize(&mut self, width: u32, height: u32) {
        warn!("`{}`: resize to {width}x{height} is not supported", self.title);
    }

    /// Show `image`, creating the window sized `figsize × ppu` on first use.
    pub fn render_image(&mut self, image: &Image, options: FigureOptions) {
        let rgba = image.to_rgba();
        let size = image.size();
        if let Some(window) = self.window.as_mut() {
            if !window.is_visible() {
                window.set_visible(true);
            }
        }
        let provider = self
            .provider
            .get_or_insert_with(|| self.host.create_image_provider());
        provider.set_bytes_data(&rgba, size);
        if self.window.is_none() {
            let desc = WindowDesc::from_figsize(&self.title, options.figsize, options.ppu);
            debug!("creating window `{}` ({}x{})", desc.title, desc.width, desc.height);
            let mut window = self.host.create_window(&desc);
            window.show_image(provider);
            self.window = Some(window);
        }
    }

    /// Drop the provider and destroy the window.
    pub fn destroy(&mut self) {
        self.provider = None;
        if let Some(mut window) = self.window.take() {
            window.destroy();
        }
    }
}

impl<H: WindowHost> Drop for FigureManager<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Display hooks that open one native window per window name.
pub struct WindowDisplay<H: WindowHost> {
    host: H,
    options: FigureOptions,
    managers: Vec<(String, FigureManager<H>)>,
}

impl<H: WindowHost> WindowDisplay<H> {
    /// `options` sizes the windows opened by `imshow`.
    pub fn new(host: &H, options: FigureOptions) -> Self {
        Self {
            host: host.clone(),
            options,
            managers: Vec::new(),
        }
    }

    fn manager(&mut self, key: &str, title: impl FnOnce() -> String) -> &mut FigureManager<H> {
        let index = match self.managers.iter().position(|(name, _)| name == key) {
            Some(index) => index,
            None => {
                let manager = FigureManager::new(&self.host, title());
                self.managers.push((key.to_string(), manager));
                self.managers.len() - 1
            }
        };
        &mut self.managers[index].1
    }
}

impl<H: WindowHost> ImageDisplay for WindowDisplay<H> {
    fn name(&self) -> &str {
        "native windows"
    }

    fn imshow(&mut self, winname: &str, image: &Image) -> Result<()> {
        let options = self.options;
        self.manager(winname, || winname.to_string())
            .render_image(image, options);
        Ok(())
    }

    fn wait_key(&mut self, _delay_ms: i32) -> i32 {
        -1
    }

    fn show_figure(
        &mut self,
        num: &FigureNum,
        image: &Image,
        options: FigureOptions,
    ) -> Result<()> {
        let title = num.title();
        self.manager(&format!("figure:{title}"), || title.clone())
            .render_image(image, options);
        Ok(())
    }

    fn destroy_all(&mut self) {
        if !self.managers.is_empty() {
            debug!("destroying {} display windows", self.managers.len());
        }
        self.managers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FrameContent, HeadlessHost};

    #[test]
    fn window_is_created_on_first_render() {
        let host = HeadlessHost::new();
        let mut manager = FigureManager::new(&host, "Figure 1");
        assert!(host.windows().is_empty());
        let image = Image::zeros(4, 8, 1).expect("valid shape");
        manager.render_image(&image, FigureOptions::new((2.0, 1.0), 10.0));
        manager.render_image(&image, FigureOptions::default());
        let windows = host.windows();
        assert_eq!(windows.len(), 1);
        assert_eq!((windows[0].width, windows[0].height), (20, 10));
        assert_eq!(windows[0].frame, FrameContent::Image(0));
        assert_eq!(host.providers()[0].updates, 2);
        assert_eq!(host.providers()[0].size, [8, 4]);
    }

    #[test]
    fn title_follows_the_window() {
        let host = HeadlessHost::new();
        let mut manager = FigureManager::new(&host, "a");
        manager.set_window_title("b");
        manager.render_image(&Image::zeros(1, 1, 3).expect("valid"), FigureOptions::default());
        manager.set_window_title("c");
        manager.resize(10, 10);
        assert_eq!(manager.title(), "c");
        assert_eq!(host.windows()[0].title, "c");
        manager.destroy();
        assert!(manager.window().is_none());
        assert_eq!(host.live_windows(), 0);
    }

    #[test]
    fn one_window_per_name() {
        let host = HeadlessHost::new();
        let mut display = WindowDisplay::new(&host, FigureOptions::default());
        let image = Image::zeros(2, 2, 3).expect("valid shape");
        display.imshow("left", &image).expect("shown");
        display.imshow("right", &image).expect("shown");
        display.imshow("left", &image).expect("shown");
        display
            .show_figure(&FigureNum::Number(1), &image, FigureOptions::default())
            .expect("shown");
        let titles: Vec<_> = host.windows().into_iter().map(|w| w.title).collect();
        assert_eq!(titles, vec!["left", "right", "Figure 1"]);
        assert_eq!(display.wait_key(0), -1);
        display.destroy_all();
        assert_eq!(host.live_windows(), 0);
    }
}
