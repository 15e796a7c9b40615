use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, TextRun, Window,
    font, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::raster::dash_runs;
use crate::render::{
    Color, HAlign, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, RenderCommand,
    RenderList, TextStyle, VAlign,
};

/// Paints render lists with their origin moved to the top-left of a GPUI element.
pub(crate) struct Painter {
    origin: gpui::Point<Pixels>,
}

impl Painter {
    pub(crate) fn new(bounds: Bounds<Pixels>) -> Self {
        Self {
            origin: bounds.origin,
        }
    }

    pub(crate) fn paint(&self, list: &RenderList, window: &mut Window, cx: &mut App) {
        let mut clip_stack: Vec<ContentMask<Pixels>> = Vec::new();
        for command in list.commands() {
            match command {
                RenderCommand::ClipRect(rect) => {
                    clip_stack.push(ContentMask {
                        bounds: self.bounds(*rect),
                    });
                }
                RenderCommand::ClipEnd => {
                    clip_stack.pop();
                }
                RenderCommand::LineSegments { segments, style } => {
                    with_clip(window, &clip_stack, |window| {
                        self.paint_lines(window, segments, *style);
                    });
                }
                RenderCommand::Points { points, style } => {
                    with_clip(window, &clip_stack, |window| {
                        for pt in points {
                            self.paint_marker(window, *pt, *style);
                        }
                    });
                }
                RenderCommand::Rect { rect, style } => {
                    with_clip(window, &clip_stack, |window| {
                        self.paint_rect(window, *rect, *style);
                    });
                }
                RenderCommand::Polygon { points, fill } => {
                    with_clip(window, &clip_stack, |window| {
                        self.fill_polygon(window, points, *fill);
                    });
                }
                RenderCommand::Text {
                    position,
                    text,
                    style,
                } => {
                    with_clip(window, &clip_stack, |window| {
                        self.paint_text(window, cx, *position, text, style);
                    });
                }
            }
        }
    }

    fn paint_lines(&self, window: &mut Window, segments: &[LineSegment], style: LineStyle) {
        if segments.is_empty() {
            return;
        }
        let width = style.width.max(0.5);
        let mut builder = PathBuilder::stroke(px(width));
        match style.dash.pattern() {
            None => {
                for segment in segments {
                    builder.move_to(self.point(segment.start));
                    builder.line_to(self.point(segment.end));
                }
            }
            Some(pattern) => {
                let pattern: Vec<f32> = pattern.iter().map(|run| run * width.max(1.0)).collect();
                for (start, end) in dash_runs(segments, &pattern) {
                    builder.move_to(self.point(start));
                    builder.line_to(self.point(end));
                }
            }
        }
        if let Ok(path) = builder.build() {
            window.paint_path(path, to_rgba(style.color));
        }
    }

    fn paint_marker(&self, window: &mut Window, center: ScreenPoint, style: MarkerStyle) {
        let half = style.size.max(2.0) * 0.5;
        let at = |dx: f32, dy: f32| ScreenPoint::new(center.x + dx, center.y + dy);
        match style.shape {
            MarkerShape::Circle | MarkerShape::Dot | MarkerShape::Square => {
                let (radius, corner) = match style.shape {
                    MarkerShape::Circle => (half, half),
                    MarkerShape::Dot => ((half * 0.5).max(1.0), (half * 0.5).max(1.0)),
                    _ => (half, 0.0),
                };
                let rect = ScreenRect::new(at(-radius, -radius), at(radius, radius));
                window.paint_quad(quad(
                    self.bounds(rect),
                    Corners::all(px(corner)),
                    to_rgba(style.color),
                    Edges::all(px(0.0)),
                    to_rgba(style.color),
                    BorderStyle::default(),
                ));
            }
            MarkerShape::Diamond => self.fill_polygon(
                window,
                &[at(0.0, -half), at(half, 0.0), at(0.0, half), at(-half, 0.0)],
                style.color,
            ),
            MarkerShape::TriangleUp => self.fill_polygon(
                window,
                &[at(0.0, -half), at(half, half), at(-half, half)],
                style.color,
            ),
            MarkerShape::TriangleDown => self.fill_polygon(
                window,
                &[at(-half, -half), at(half, -half), at(0.0, half)],
                style.color,
            ),
            MarkerShape::Cross | MarkerShape::Plus | MarkerShape::Star => {
                let diag = half * std::f32::consts::FRAC_1_SQRT_2;
                let mut strokes = Vec::with_capacity(4);
                if style.shape != MarkerShape::Cross {
                    strokes.push((at(-half, 0.0), at(half, 0.0)));
                    strokes.push((at(0.0, -half), at(0.0, half)));
                }
                if style.shape != MarkerShape::Plus {
                    let reach = if style.shape == MarkerShape::Star { diag } else { half };
                    strokes.push((at(-reach, -reach), at(reach, reach)));
                    strokes.push((at(-reach, reach), at(reach, -reach)));
                }
                let mut builder = PathBuilder::stroke(px((style.size / 5.0).max(1.0)));
                for (start, end) in strokes {
                    builder.move_to(self.point(start));
                    builder.line_to(self.point(end));
                }
                if let Ok(path) = builder.build() {
                    window.paint_path(path, to_rgba(style.color));
                }
            }
        }
    }

    fn fill_polygon(&self, window: &mut Window, points: &[ScreenPoint], fill: Color) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.len() < 2 {
            return;
        }
        let mut builder = PathBuilder::fill();
        builder.move_to(self.point(*first));
        for pt in rest {
            builder.line_to(self.point(*pt));
        }
        builder.close();
        if let Ok(path) = builder.build() {
            window.paint_path(path, to_rgba(fill));
        }
    }

    fn paint_rect(&self, window: &mut Window, rect: ScreenRect, style: RectStyle) {
        window.paint_quad(quad(
            self.bounds(rect),
            Corners::all(px(0.0)),
            to_rgba(style.fill),
            Edges::all(px(style.stroke_width)),
            to_rgba(style.stroke),
            BorderStyle::default(),
        ));
    }

    fn paint_text(
        &self,
        window: &mut Window,
        cx: &mut App,
        position: ScreenPoint,
        text: &str,
        style: &TextStyle,
    ) {
        if text.is_empty() {
            return;
        }
        let run = TextRun {
            len: text.len(),
            font: font(".SystemUIFont"),
            color: to_hsla(style.color),
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        let shaped =
            window
                .text_system()
                .shape_line(text.to_string().into(), px(style.size), &[run], None);
        let width = f32::from(shaped.width);
        let line_height = shaped.ascent + shaped.descent;
        let height = f32::from(line_height);
        let x = match style.h_align {
            HAlign::Left => position.x,
            HAlign::Center => position.x - width * 0.5,
            HAlign::Right => position.x - width,
        };
        let y = match style.v_align {
            VAlign::Top => position.y,
            VAlign::Middle => position.y - height * 0.5,
            VAlign::Bottom => position.y - height,
        };
        let _ = shaped.paint(self.point(ScreenPoint::new(x, y)), line_height, window, cx);
    }

    fn point(&self, pt: ScreenPoint) -> gpui::Point<Pixels> {
        point(self.origin.x + px(pt.x), self.origin.y + px(pt.y))
    }

    fn bounds(&self, rect: ScreenRect) -> Bounds<Pixels> {
        Bounds::from_corners(self.point(rect.min), self.point(rect.max))
    }
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}
