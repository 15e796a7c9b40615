use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gpui::prelude::*;
use gpui::{ImageFormat, ImageSource, ObjectFit, Window, canvas, div, img};
use log::warn;

use crate::image::encode_png;
use crate::native::{PlotHandle, render_stack};
use crate::render::Color;

use super::paint::{Painter, to_hsla};

/// Bytes behind a [`GpuiProvider`](super::GpuiProvider), encoded lazily for display.
#[derive(Debug, Default)]
pub(crate) struct ProviderImage {
    rgba: Vec<u8>,
    size: [u32; 2],
    encoded: Option<Arc<gpui::Image>>,
}

impl ProviderImage {
    pub(crate) fn set(&mut self, rgba: &[u8], size: [u32; 2]) {
        self.rgba.clear();
        self.rgba.extend_from_slice(rgba);
        self.size = size;
        self.encoded = None;
    }

    fn encoded(&mut self) -> Option<Arc<gpui::Image>> {
        if self.size[0] == 0 || self.size[1] == 0 {
            return None;
        }
        if self.encoded.is_none() {
            match encode_png(&self.rgba, self.size) {
                Ok(png) => {
                    self.encoded = Some(Arc::new(gpui::Image::from_bytes(ImageFormat::Png, png)));
                }
                Err(err) => {
                    warn!("cannot display {}x{} image: {err}", self.size[0], self.size[1]);
                    return None;
                }
            }
        }
        self.encoded.clone()
    }
}

/// What a window frame is bound to.
#[derive(Default)]
pub(crate) enum Frame {
    #[default]
    Empty,
    Image(Rc<RefCell<ProviderImage>>),
    NativePlots(Vec<PlotHandle>),
}

/// Window state shared between the host handles and the view.
#[derive(Default)]
pub(crate) struct WindowContent {
    pub(crate) title: String,
    pub(crate) visible: bool,
    pub(crate) frame: Frame,
}

/// The root view of every host window.
pub(crate) struct FigureView {
    content: Rc<RefCell<WindowContent>>,
}

impl FigureView {
    pub(crate) fn new(content: Rc<RefCell<WindowContent>>) -> Self {
        Self { content }
    }
}

impl Render for FigureView {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        let content = self.content.borrow();
        let root = div().size_full().bg(to_hsla(Color::WHITE));
        if !content.visible {
            return root;
        }
        match &content.frame {
            Frame::Empty => root,
            Frame::Image(image) => match image.borrow_mut().encoded() {
                Some(image) => root.child(
                    img(ImageSource::Image(image))
                        .size_full()
                        .object_fit(ObjectFit::Contain),
                ),
                None => root,
            },
            Frame::NativePlots(plots) => {
                let plots = plots.clone();
                root.child(
                    canvas(
                        move |bounds, _, _| {
                            (
                                Painter::new(bounds),
                                render_stack(&plots, f32::from(bounds.size.width)),
                            )
                        },
                        move |_, (painter, list), window, cx| {
                            painter.paint(&list, window, cx);
                        },
                    )
                    .size_full(),
                )
            }
        }
    }
}
