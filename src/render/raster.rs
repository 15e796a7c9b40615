//! Software rasterizer for render lists.

use crate::geom::{ScreenPoint, ScreenRect};
use crate::image::Image;
use crate::render::font::{self, GlyphCache};
use crate::render::{
    Color, HAlign, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, RenderCommand,
    RenderList, TextStyle, VAlign,
};

/// An RGBA8 pixel buffer that render commands are drawn into.
#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    clips: Vec<ScreenRect>,
    glyphs: GlyphCache,
}

impl Canvas {
    /// Create a canvas filled with `background`.
    pub(crate) fn new(width: usize, height: usize, background: Color) -> Self {
        let fill = background.to_rgba8();
        let mut pixels = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            pixels.extend_from_slice(&fill);
        }
        Self {
            width,
            height,
            pixels,
            clips: Vec::new(),
            glyphs: GlyphCache::default(),
        }
    }

    /// Pixel at `(x, y)`, if inside the canvas.
    #[cfg(test)]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y * self.width + x) * 4;
        let px = &self.pixels[index..index + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert into an RGBA image.
    pub(crate) fn into_image(self) -> Image {
        let Self {
            width,
            height,
            pixels,
            ..
        } = self;
        Image::from_rgba_pixels(height, width, pixels)
    }

    /// Draw every command of a render list.
    pub(crate) fn execute(&mut self, list: &RenderList) {
        for command in list.commands() {
            match command {
                RenderCommand::ClipRect(rect) => self.clips.push(*rect),
                RenderCommand::ClipEnd => {
                    self.clips.pop();
                }
                RenderCommand::LineSegments { segments, style } => {
                    self.stroke_segments(segments, *style);
                }
                RenderCommand::Points { points, style } => {
                    for point in points {
                        self.draw_marker(*point, *style);
                    }
                }
                RenderCommand::Rect { rect, style } => self.draw_rect(*rect, *style),
                RenderCommand::Polygon { points, fill } => self.fill_polygon(points, *fill),
                RenderCommand::Text {
                    position,
                    text,
                    style,
                } => self.draw_text(*position, text, style),
            }
        }
        self.clips.clear();
    }

    fn clip_bounds(&self) -> (f32, f32, f32, f32) {
        let mut bounds = (0.0_f32, 0.0_f32, self.width as f32, self.height as f32);
        if let Some(clip) = self.clips.last() {
            bounds.0 = bounds.0.max(clip.min.x);
            bounds.1 = bounds.1.max(clip.min.y);
            bounds.2 = bounds.2.min(clip.max.x + 1.0);
            bounds.3 = bounds.3.min(clip.max.y + 1.0);
        }
        bounds
    }

    /// Intersect a pixel box `[x0, x1) × [y0, y1)` with the clip bounds.
    fn clamp_box(&self, x0: i64, y0: i64, x1: i64, y1: i64) -> (i64, i64, i64, i64) {
        let (cx0, cy0, cx1, cy1) = self.clip_bounds();
        (
            x0.max(cx0.floor() as i64),
            y0.max(cy0.floor() as i64),
            x1.min(cx1.ceil() as i64),
            y1.min(cy1.ceil() as i64),
        )
    }

    fn blend(&mut self, x: i64, y: i64, color: Color) {
        let (min_x, min_y, max_x, max_y) = self.clip_bounds();
        let (fx, fy) = (x as f32, y as f32);
        if fx < min_x || fy < min_y || fx >= max_x || fy >= max_y {
            return;
        }
        let index = (y as usize * self.width + x as usize) * 4;
        let src = color.to_rgba8();
        let alpha = u32::from(src[3]);
        if alpha == 0 {
            return;
        }
        let inv = 255 - alpha;
        let dst = &mut self.pixels[index..index + 4];
        for channel in 0..3 {
            dst[channel] =
                ((u32::from(src[channel]) * alpha + u32::from(dst[channel]) * inv) / 255) as u8;
        }
        dst[3] = (alpha + u32::from(dst[3]) * inv / 255).min(255) as u8;
    }

    /// Fill the pixels whose centers fall inside `rect`.
    pub(crate) fn fill_rect(&mut self, rect: ScreenRect, color: Color) {
        let x0 = rect.min.x.round() as i64;
        let x1 = rect.max.x.round() as i64;
        let y0 = rect.min.y.round() as i64;
        let y1 = rect.max.y.round() as i64;
        let (x0, y0, x1, y1) = self.clamp_box(x0, y0, x1.max(x0 + 1), y1.max(y0 + 1));
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn draw_rect(&mut self, rect: ScreenRect, style: RectStyle) {
        if style.fill.a > 0.0 {
            self.fill_rect(rect, style.fill);
        }
        if style.stroke.a > 0.0 && style.stroke_width > 0.0 {
            let line = LineStyle {
                color: style.stroke,
                width: style.stroke_width,
                ..LineStyle::default()
            };
            let corners = [
                rect.min,
                ScreenPoint::new(rect.max.x, rect.min.y),
                rect.max,
                ScreenPoint::new(rect.min.x, rect.max.y),
                rect.min,
            ];
            let segments: Vec<LineSegment> = corners
                .windows(2)
                .map(|pair| LineSegment::new(pair[0], pair[1]))
                .collect();
            self.stroke_segments(&segments, line);
        }
    }

    fn stroke_segments(&mut self, segments: &[LineSegment], style: LineStyle) {
        match style.dash.pattern() {
            None => {
                for segment in segments {
                    self.stroke_segment(segment.start, segment.end, style.width, style.color);
                }
            }
            Some(pattern) => {
                let scale = style.width.max(1.0);
                let pattern: Vec<f32> = pattern.iter().map(|run| run * scale).collect();
                for (start, end) in dash_runs(segments, &pattern) {
                    self.stroke_segment(start, end, style.width, style.color);
                }
            }
        }
    }

    /// Stroke one segment by coverage of the distance to its centerline.
    fn stroke_segment(&mut self, start: ScreenPoint, end: ScreenPoint, width: f32, color: Color) {
        let half = (width * 0.5).max(0.5);
        let min_x = (start.x.min(end.x) - half).floor() as i64;
        let max_x = (start.x.max(end.x) + half).ceil() as i64;
        let min_y = (start.y.min(end.y) - half).floor() as i64;
        let max_y = (start.y.max(end.y) + half).ceil() as i64;
        let (min_x, min_y, max_x, max_y) = self.clamp_box(min_x, min_y, max_x, max_y);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = ScreenPoint::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, start, end) <= half {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn fill_disc(&mut self, center: ScreenPoint, radius: f32, color: Color) {
        let radius = radius.max(0.5);
        let min_x = (center.x - radius).floor() as i64;
        let max_x = (center.x + radius).ceil() as i64;
        let min_y = (center.y - radius).floor() as i64;
        let max_y = (center.y + radius).ceil() as i64;
        let (min_x, min_y, max_x, max_y) = self.clamp_box(min_x, min_y, max_x, max_y);
        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Fill a polygon with the even-odd rule, sampling pixel centers.
    pub(crate) fn fill_polygon(&mut self, points: &[ScreenPoint], color: Color) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let y_start = (min_y.floor() as i64).max(0);
        let y_end = (max_y.ceil() as i64).min(self.height as i64);
        let mut crossings = Vec::new();
        for y in y_start..y_end {
            let sample = y as f32 + 0.5;
            crossings.clear();
            for (index, a) in points.iter().enumerate() {
                let b = points[(index + 1) % points.len()];
                if (a.y <= sample && b.y > sample) || (b.y <= sample && a.y > sample) {
                    let t = (sample - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x_start = (pair[0] - 0.5).ceil() as i64;
                let x_end = (pair[1] - 0.5).floor() as i64;
                for x in x_start..=x_end {
                    self.blend(x, y, color);
                }
            }
        }
    }

    fn draw_marker(&mut self, center: ScreenPoint, style: MarkerStyle) {
        let half = style.size * 0.5;
        let at = |dx: f32, dy: f32| ScreenPoint::new(center.x + dx, center.y + dy);
        let stroke = (style.size / 5.0).max(1.0);
        match style.shape {
            MarkerShape::Circle => self.fill_disc(center, half, style.color),
            MarkerShape::Dot => self.fill_disc(center, (half * 0.5).max(1.0), style.color),
            MarkerShape::Square => self.fill_rect(
                ScreenRect::new(at(-half, -half), at(half, half)),
                style.color,
            ),
            MarkerShape::Diamond => {
                self.fill_polygon(
                    &[at(0.0, -half), at(half, 0.0), at(0.0, half), at(-half, 0.0)],
                    style.color,
                );
            }
            MarkerShape::TriangleUp => {
                self.fill_polygon(
                    &[at(0.0, -half), at(half, half), at(-half, half)],
                    style.color,
                );
            }
            MarkerShape::TriangleDown => {
                self.fill_polygon(
                    &[at(-half, -half), at(half, -half), at(0.0, half)],
                    style.color,
                );
            }
            MarkerShape::Cross => {
                self.stroke_segment(at(-half, -half), at(half, half), stroke, style.color);
                self.stroke_segment(at(-half, half), at(half, -half), stroke, style.color);
            }
            MarkerShape::Plus => {
                self.stroke_segment(at(-half, 0.0), at(half, 0.0), stroke, style.color);
                self.stroke_segment(at(0.0, -half), at(0.0, half), stroke, style.color);
            }
            MarkerShape::Star => {
                let diag = half * std::f32::consts::FRAC_1_SQRT_2;
                self.stroke_segment(at(-half, 0.0), at(half, 0.0), stroke, style.color);
                self.stroke_segment(at(0.0, -half), at(0.0, half), stroke, style.color);
                self.stroke_segment(at(-diag, -diag), at(diag, diag), stroke, style.color);
                self.stroke_segment(at(-diag, diag), at(diag, -diag), stroke, style.color);
            }
        }
    }

    fn draw_text(&mut self, position: ScreenPoint, text: &str, style: &TextStyle) {
        let Some(font) = font::system_font() else {
            return;
        };
        let (width, height) = font::text_extent(font, text, style.size);
        let left = match style.h_align {
            HAlign::Left => position.x,
            HAlign::Center => position.x - width * 0.5,
            HAlign::Right => position.x - width,
        };
        let top = match style.v_align {
            VAlign::Top => position.y,
            VAlign::Middle => position.y - height * 0.5,
            VAlign::Bottom => position.y - height,
        };
        let baseline = (top + font::ascent(font, style.size)).round() as i64;
        let mut pen = left;
        for ch in text.chars() {
            let (metrics, coverage) = self.glyphs.glyph(font, ch, style.size).clone();
            let gx = pen.round() as i64 + i64::from(metrics.xmin);
            let gy = baseline - i64::from(metrics.ymin) - metrics.height as i64;
            pen += metrics.advance_width;
            let (x0, y0, x1, y1) = self.clamp_box(
                gx,
                gy,
                gx + metrics.width as i64,
                gy + metrics.height as i64,
            );
            for y in y0..y1 {
                for x in x0..x1 {
                    let index = (y - gy) as usize * metrics.width + (x - gx) as usize;
                    let alpha = coverage[index];
                    if alpha > 0 {
                        let shade = style.color.a * f32::from(alpha) / 255.0;
                        self.blend(x, y, style.color.with_alpha(shade));
                    }
                }
            }
        }
    }
}

fn distance_to_segment(point: ScreenPoint, start: ScreenPoint, end: ScreenPoint) -> f32 {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (px, py) = (start.x + t * dx, start.y + t * dy);
    ((point.x - px).powi(2) + (point.y - py).powi(2)).sqrt()
}

/// Split connected segments into the "on" runs of a dash pattern.
///
/// The pattern phase carries over from one segment to the next.
pub(crate) fn dash_runs(
    segments: &[LineSegment],
    pattern: &[f32],
) -> Vec<(ScreenPoint, ScreenPoint)> {
    let mut runs = Vec::new();
    if pattern.is_empty() || pattern.iter().any(|run| *run <= 0.0) {
        return runs;
    }
    let mut index = 0;
    let mut remaining = pattern[0];
    for segment in segments {
        let (dx, dy) = (segment.end.x - segment.start.x, segment.end.y - segment.start.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            continue;
        }
        let lerp = |t: f32| {
            ScreenPoint::new(segment.start.x + dx * t / len, segment.start.y + dy * t / len)
        };
        let mut travelled = 0.0;
        while len - travelled > 1e-4 {
            let step = remaining.min(len - travelled);
            if index % 2 == 0 {
                runs.push((lerp(travelled), lerp(travelled + step)));
            }
            travelled += step;
            remaining -= step;
            if remaining <= 1e-4 {
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::LineDash;

    const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn new_canvas_is_filled() {
        let canvas = Canvas::new(4, 3, Color::WHITE);
        assert_eq!(canvas.pixel(3, 2), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(4, 0), None);
        let image = canvas.into_image();
        assert_eq!((image.width(), image.height(), image.channels()), (4, 3, 4));
    }

    #[test]
    fn horizontal_line_covers_its_row() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        let mut list = RenderList::new();
        list.segment(
            ScreenPoint::new(1.0, 5.5),
            ScreenPoint::new(9.0, 5.5),
            LineStyle {
                color: RED,
                ..LineStyle::default()
            },
        );
        canvas.execute(&list);
        assert_eq!(canvas.pixel(4, 5), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(4, 8), Some([255, 255, 255, 255]));
    }

    #[test]
    fn clip_rect_limits_drawing() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        let mut list = RenderList::new();
        list.push(RenderCommand::ClipRect(ScreenRect::new(
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(4.0, 9.0),
        )));
        list.push(RenderCommand::Rect {
            rect: ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0)),
            style: RectStyle::filled(RED),
        });
        list.push(RenderCommand::ClipEnd);
        canvas.execute(&list);
        assert_eq!(canvas.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(7, 2), Some([255, 255, 255, 255]));
    }

    #[test]
    fn polygon_fill_is_even_odd() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        canvas.fill_polygon(
            &[
                ScreenPoint::new(1.0, 1.0),
                ScreenPoint::new(9.0, 1.0),
                ScreenPoint::new(9.0, 9.0),
                ScreenPoint::new(1.0, 9.0),
            ],
            RED,
        );
        assert_eq!(canvas.pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let segments = [LineSegment::new(
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(20.0, 0.0),
        )];
        let pattern = LineDash::Dashed.pattern().expect("dashed has a pattern");
        let runs = dash_runs(&segments, pattern);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].1, ScreenPoint::new(6.0, 0.0));
        assert_eq!(runs[1].0, ScreenPoint::new(10.0, 0.0));
    }

    #[test]
    fn alpha_blends_over_background() {
        let mut canvas = Canvas::new(2, 2, Color::WHITE);
        canvas.fill_rect(
            ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(2.0, 2.0)),
            Color::BLACK.with_alpha(0.5),
        );
        let [r, g, b, a] = canvas.pixel(0, 0).expect("inside canvas");
        assert!((126..=129).contains(&r));
        assert_eq!((r, g, b, a), (r, r, r, 255));
    }

    #[test]
    fn text_draws_foreground_pixels() {
        if font::system_font().is_none() {
            return;
        }
        let mut canvas = Canvas::new(40, 20, Color::WHITE);
        let style = TextStyle {
            size: 16.0,
            ..TextStyle::default()
        };
        canvas.draw_text(ScreenPoint::new(1.0, 1.0), "1d", &style);
        let dark = (0..40)
            .flat_map(|x| (0..20).map(move |y| (x, y)))
            .filter(|(x, y)| canvas.pixel(*x, *y).is_some_and(|px| px[0] < 128))
            .count();
        assert!(dark > 5);
    }

    #[test]
    fn text_outside_the_clip_is_discarded() {
        let mut canvas = Canvas::new(20, 20, Color::WHITE);
        canvas.clips.push(ScreenRect::new(
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(4.0, 4.0),
        ));
        canvas.draw_text(ScreenPoint::new(8.0, 8.0), "W", &TextStyle::default());
        assert!(canvas.pixels.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn huge_marker_fills_the_canvas_quickly() {
        let mut canvas = Canvas::new(64, 48, Color::WHITE);
        let style = MarkerStyle {
            shape: MarkerShape::Circle,
            size: 1.0e7,
            color: RED,
        };
        let started = std::time::Instant::now();
        canvas.draw_marker(ScreenPoint::new(32.0, 24.0), style);
        canvas.draw_marker(
            ScreenPoint::new(32.0, 24.0),
            MarkerStyle {
                shape: MarkerShape::Square,
                ..style
            },
        );
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(63, 47), Some([255, 0, 0, 255]));
    }
}
