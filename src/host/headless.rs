use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{HostWindow, ImageProvider, WindowDesc, WindowHost};
use crate::native::PlotHandle;

/// What a headless window's frame currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameContent {
    /// Nothing has been bound to the frame yet.
    #[default]
    Empty,
    /// An image view bound to the provider with this index.
    Image(usize),
    /// A stack of this many native plots.
    NativePlots(usize),
}

/// Recorded state of one headless window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub destroyed: bool,
    pub frame: FrameContent,
    /// Number of times the frame was rebuilt.
    pub rebuilds: usize,
}

/// Recorded state of one headless image provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderRecord {
    pub bytes: Vec<u8>,
    pub size: [u32; 2],
    /// Number of `set_bytes_data` calls.
    pub updates: usize,
}

#[derive(Debug, Default)]
struct HeadlessState {
    windows: Vec<WindowRecord>,
    providers: Vec<ProviderRecord>,
    plots: Vec<Vec<PlotHandle>>,
}

/// A host that records every window and provider operation in memory.
///
/// Clones share the same record, so a test can keep one clone and inspect
/// what the figures did with the other.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every window ever created, in creation order.
    pub fn windows(&self) -> Vec<WindowRecord> {
        self.state.borrow().windows.clone()
    }

    /// Snapshot of every provider ever created, in creation order.
    pub fn providers(&self) -> Vec<ProviderRecord> {
        self.state.borrow().providers.clone()
    }

    /// Number of windows that have not been destroyed.
    pub fn live_windows(&self) -> usize {
        self.state
            .borrow()
            .windows
            .iter()
            .filter(|window| !window.destroyed)
            .count()
    }

    /// Native plots currently bound to the window with this index.
    pub fn native_plots(&self, window: usize) -> Vec<PlotHandle> {
        self.state
            .borrow()
            .plots
            .get(window)
            .cloned()
            .unwrap_or_default()
    }
}

impl WindowHost for HeadlessHost {
    type Window = HeadlessWindow;
    type Provider = HeadlessProvider;

    fn create_window(&self, desc: &WindowDesc) -> HeadlessWindow {
        let mut state = self.state.borrow_mut();
        state.windows.push(WindowRecord {
            title: desc.title.clone(),
            width: desc.width,
            height: desc.height,
            visible: desc.visible,
            destroyed: false,
            frame: FrameContent::Empty,
            rebuilds: 0,
        });
        state.plots.push(Vec::new());
        HeadlessWindow {
            state: Rc::clone(&self.state),
            index: state.windows.len() - 1,
        }
    }

    fn create_image_provider(&self) -> HeadlessProvider {
        let mut state = self.state.borrow_mut();
        state.providers.push(ProviderRecord::default());
        HeadlessProvider {
            state: Rc::clone(&self.state),
            index: state.providers.len() - 1,
        }
    }
}

/// Window handle of the [`HeadlessHost`].
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Rc<RefCell<HeadlessState>>,
    index: usize,
}

impl HeadlessWindow {
    /// Index of this window in [`HeadlessHost::windows`].
    pub fn index(&self) -> usize {
        self.index
    }

    fn with_record<R>(&self, f: impl FnOnce(&mut WindowRecord) -> R) -> R {
        let mut state = self.state.borrow_mut();
        f(&mut state.windows[self.index])
    }
}

impl HostWindow for HeadlessWindow {
    type Provider = HeadlessProvider;

    fn is_visible(&self) -> bool {
        self.with_record(|record| record.visible && !record.destroyed)
    }

    fn set_visible(&mut self, visible: bool) {
        self.with_record(|record| record.visible = visible);
    }

    fn set_title(&mut self, title: &str) {
        self.with_record(|record| record.title = title.to_string());
    }

    fn show_image(&mut self, provider: &HeadlessProvider) {
        self.with_record(|record| {
            record.frame = FrameContent::Image(provider.index);
            record.rebuilds += 1;
        });
    }

    fn show_native_plots(&mut self, plots: &[PlotHandle]) {
        self.with_record(|record| {
            record.frame = FrameContent::NativePlots(plots.len());
            record.rebuilds += 1;
        });
        self.state.borrow_mut().plots[self.index] = plots.to_vec();
    }

    fn destroy(&mut self) {
        let mut state = self.state.borrow_mut();
        let record = &mut state.windows[self.index];
        if record.destroyed {
            return;
        }
        record.destroyed = true;
        record.visible = false;
        record.frame = FrameContent::Empty;
        state.plots[self.index].clear();
    }
}

/// Image provider of the [`HeadlessHost`].
#[derive(Debug)]
pub struct HeadlessProvider {
    state: Rc<RefCell<HeadlessState>>,
    index: usize,
}

impl HeadlessProvider {
    /// Index of this provider in [`HeadlessHost::providers`].
    pub fn index(&self) -> usize {
        self.index
    }
}

impl ImageProvider for HeadlessProvider {
    fn set_bytes_data(&mut self, rgba: &[u8], size: [u32; 2]) {
        let mut state = self.state.borrow_mut();
        let record = &mut state.providers[self.index];
        record.bytes.clear();
        record.bytes.extend_from_slice(rgba);
        record.size = size;
        record.updates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_records() {
        let host = HeadlessHost::new();
        let observer = host.clone();
        let mut window = host.create_window(&WindowDesc::new("Figure: a", 10, 20));
        let mut provider = host.create_image_provider();
        provider.set_bytes_data(&[1, 2, 3, 4], [1, 1]);
        window.show_image(&provider);

        let windows = observer.windows();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].frame, FrameContent::Image(0));
        assert_eq!(observer.providers()[0].bytes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn destroy_is_idempotent() {
        let host = HeadlessHost::new();
        let mut window = host.create_window(&WindowDesc::new("w", 1, 1));
        window.destroy();
        window.destroy();
        assert_eq!(host.live_windows(), 0);
        assert!(!window.is_visible());
    }
}
