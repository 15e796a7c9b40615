//! GPUI window host.
//!
//! [`WindowHost`] calls arrive without access to the GPUI application, so
//! [`GpuiHost`] records them and applies them on [`GpuiHost::open_pending`]
//! or [`GpuiHost::refresh`], which also repaints live views so native plot
//! updates show up. [`GpuiHost::start`] runs the refresh on a timer.

mod paint;
mod view;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gpui::{
    App, AppContext, AsyncApp, Bounds, Timer, TitlebarOptions, WindowBounds, WindowHandle,
    WindowOptions, px, size,
};
use log::{debug, warn};

use crate::host::{HostWindow, ImageProvider, WindowDesc, WindowHost};
use crate::native::PlotHandle;

use view::{FigureView, Frame, ProviderImage, WindowContent};

struct Slot {
    desc: WindowDesc,
    content: Rc<RefCell<WindowContent>>,
    handle: Option<WindowHandle<FigureView>>,
    destroyed: bool,
}

/// A [`WindowHost`] that shows figures in GPUI windows.
///
/// Clones share the same window list.
#[derive(Clone, Default)]
pub struct GpuiHost {
    slots: Rc<RefCell<Vec<Slot>>>,
}

impl GpuiHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open windows created since the last call and remove destroyed ones.
    pub fn open_pending(&self, cx: &mut App) {
        self.sync(cx, false);
    }

    /// Like [`open_pending`](Self::open_pending), then repaint every live window.
    pub fn refresh(&self, cx: &mut App) {
        self.sync(cx, true);
    }

    fn sync(&self, cx: &mut App, repaint: bool) {
        self.slots.borrow_mut().retain_mut(|slot| {
            if slot.destroyed {
                if let Some(handle) = slot.handle.take() {
                    let _ = handle.update(cx, |_, window, _| window.remove_window());
                }
                return false;
            }
            match slot.handle {
                Some(handle) if repaint => {
                    let title = slot.content.borrow().title.clone();
                    if handle
                        .update(cx, |_, window, cx| {
                            window.set_window_title(&title);
                            cx.notify();
                        })
                        .is_err()
                    {
                        debug!("window `{title}` was closed by the user");
                        slot.handle = None;
                    }
                }
                Some(_) => {}
                None => slot.handle = open(cx, &slot.desc, &slot.content),
            }
            true
        });
    }

    /// Refresh every `interval` for as long as the application runs.
    pub fn start(&self, cx: &mut App, interval: Duration) {
        self.refresh(cx);
        let host = self.clone();
        cx.spawn(move |cx: &mut AsyncApp| {
            let cx = cx.clone();
            async move {
                loop {
                    Timer::after(interval).await;
                    if cx.update(|cx| host.refresh(cx)).is_err() {
                        break;
                    }
                }
            }
        })
        .detach();
    }

    /// Number of windows that have not been destroyed.
    pub fn live_windows(&self) -> usize {
        self.slots.borrow().iter().filter(|slot| !slot.destroyed).count()
    }
}

fn open(
    cx: &mut App,
    desc: &WindowDesc,
    content: &Rc<RefCell<WindowContent>>,
) -> Option<WindowHandle<FigureView>> {
    let options = WindowOptions {
        window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
            None,
            size(px(desc.width as f32), px(desc.height as f32)),
            cx,
        ))),
        titlebar: Some(TitlebarOptions {
            title: Some(desc.title.clone().into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let content = Rc::clone(content);
    match cx.open_window(options, |_, cx| cx.new(|_| FigureView::new(content))) {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("cannot open window `{}`: {err}", desc.title);
            None
        }
    }
}

impl WindowHost for GpuiHost {
    type Window = GpuiWindow;
    type Provider = GpuiProvider;

    fn create_window(&self, desc: &WindowDesc) -> GpuiWindow {
        let content = Rc::new(RefCell::new(WindowContent {
            title: desc.title.clone(),
            visible: desc.visible,
            frame: Frame::Empty,
        }));
        let mut slots = self.slots.borrow_mut();
        slots.push(Slot {
            desc: desc.clone(),
            content: Rc::clone(&content),
            handle: None,
            destroyed: false,
        });
        GpuiWindow {
            slots: Rc::clone(&self.slots),
            content,
            destroyed: false,
        }
    }

    fn create_image_provider(&self) -> GpuiProvider {
        GpuiProvider {
            image: Rc::new(RefCell::new(ProviderImage::default())),
        }
    }
}

/// Window handle of the [`GpuiHost`].
pub struct GpuiWindow {
    slots: Rc<RefCell<Vec<Slot>>>,
    content: Rc<RefCell<WindowContent>>,
    destroyed: bool,
}

impl HostWindow for GpuiWindow {
    type Provider = GpuiProvider;

    fn is_visible(&self) -> bool {
        !self.destroyed && self.content.borrow().visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.content.borrow_mut().visible = visible;
    }

    fn set_title(&mut self, title: &str) {
        self.content.borrow_mut().title = title.to_string();
    }

    fn show_image(&mut self, provider: &GpuiProvider) {
        self.content.borrow_mut().frame = Frame::Image(Rc::clone(&provider.image));
    }

    fn show_native_plots(&mut self, plots: &[PlotHandle]) {
        self.content.borrow_mut().frame = Frame::NativePlots(plots.to_vec());
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let mut content = self.content.borrow_mut();
        content.visible = false;
        content.frame = Frame::Empty;
        for slot in self.slots.borrow_mut().iter_mut() {
            if Rc::ptr_eq(&slot.content, &self.content) {
                slot.destroyed = true;
            }
        }
    }
}

/// Image provider of the [`GpuiHost`].
pub struct GpuiProvider {
    image: Rc<RefCell<ProviderImage>>,
}

impl ImageProvider for GpuiProvider {
    fn set_bytes_data(&mut self, rgba: &[u8], size: [u32; 2]) {
        self.image.borrow_mut().set(rgba, size);
    }
}
