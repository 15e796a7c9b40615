//! Shared state of one native line plot.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, VisualizerError};
use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{
    Color, HAlign, LineStyle, RectStyle, RenderCommand, RenderList, TextStyle, VAlign,
};
use crate::style::Theme;
use crate::view::Range;

const TITLE_SIZE: f32 = 12.0;
const LABEL_SIZE: f32 = 10.0;
const TITLE_GAP: f32 = 5.0;
const LABEL_HEIGHT: f32 = 14.0;
/// Height of the plotting box in pixels.
pub const PLOT_HEIGHT: f32 = 100.0;
const LABEL_COLOR: Color = Color::new(0.1, 0.1, 0.1, 1.0);
const DEFAULT_SCALE: (f64, f64) = (-1.0, 1.0);

/// Samples of one line.
///
/// A bounded line is a sliding window that evicts its oldest sample; an
/// unbounded line grows forever.
#[derive(Debug, Clone, PartialEq)]
struct LineBuffer {
    samples: VecDeque<f64>,
    capacity: Option<usize>,
}

impl LineBuffer {
    fn new(window_size: Option<usize>) -> Self {
        match window_size.filter(|size| *size > 0) {
            Some(size) => Self {
                samples: std::iter::repeat_n(0.0, size).collect(),
                capacity: Some(size),
            },
            None => Self {
                samples: VecDeque::from([0.0]),
                capacity: None,
            },
        }
    }

    fn push(&mut self, value: f64) {
        if let Some(capacity) = self.capacity {
            while self.samples.len() >= capacity {
                self.samples.pop_front();
            }
        }
        self.samples.push_back(value);
    }

    fn replace(&mut self, values: &[f64]) {
        let skip = match self.capacity {
            Some(capacity) => values.len().saturating_sub(capacity),
            None => 0,
        };
        self.samples.clear();
        self.samples.extend(&values[skip..]);
    }
}

/// Format a scale label: rounded to three decimals, whole numbers keep `.0`.
pub(crate) fn scale_label(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.is_finite() && rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        rounded.to_string()
    }
}

/// State of a native line plot, shared between the figure and its window.
#[derive(Debug, Clone, PartialEq)]
pub struct NativePlotState {
    uid: String,
    title: String,
    theme: Theme,
    colors: Vec<u32>,
    lines: Vec<LineBuffer>,
    ylim: Option<Range>,
    scale: Range,
    labels: (String, String),
    generation: u64,
}

impl NativePlotState {
    pub(crate) fn new(
        uid: String,
        title: String,
        theme: Theme,
        colors: Vec<u32>,
        ylim: Option<(f64, f64)>,
        window_size: Option<usize>,
    ) -> Self {
        let ylim = ylim.map(|(min, max)| Range::new(min, max));
        let scale = ylim.unwrap_or(Range::new(DEFAULT_SCALE.0, DEFAULT_SCALE.1));
        Self {
            uid,
            title,
            theme,
            lines: (0..colors.len()).map(|_| LineBuffer::new(window_size)).collect(),
            colors,
            ylim,
            scale,
            labels: (scale_label(scale.min), scale_label(scale.max)),
            generation: 0,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Packed `0xAABBGGRR` color of each line.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Buffered samples of line `index`, oldest first.
    pub fn line(&self, index: usize) -> Option<impl Iterator<Item = f64> + '_> {
        self.lines
            .get(index)
            .map(|line| line.samples.iter().copied())
    }

    /// Shared y-axis scale of every line.
    pub fn scale(&self) -> Range {
        self.scale
    }

    /// Texts of the `(min, max)` scale labels.
    pub fn labels(&self) -> (&str, &str) {
        (&self.labels.0, &self.labels.1)
    }

    /// Bumped on every data mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual == self.lines.len() {
            Ok(())
        } else {
            Err(VisualizerError::InvalidSeriesLength {
                expected: self.lines.len(),
                actual,
            })
        }
    }

    fn add_data(&mut self, sample: &[f64]) -> Result<()> {
        self.check_len(sample.len())?;
        for (line, value) in self.lines.iter_mut().zip(sample) {
            line.push(*value);
        }
        self.updated();
        Ok(())
    }

    fn set_data<S: AsRef<[f64]>>(&mut self, series: &[S]) -> Result<()> {
        self.check_len(series.len())?;
        for (line, values) in self.lines.iter_mut().zip(series) {
            line.replace(values.as_ref());
        }
        self.updated();
        Ok(())
    }

    /// Refit the scale to the data unless it was fixed, then bump the generation.
    fn updated(&mut self) {
        if self.ylim.is_none() {
            let values = self.lines.iter().flat_map(|line| line.samples.iter().copied());
            if let Some(range) = Range::of_values(values) {
                self.scale = range;
                self.labels = (scale_label(range.min), scale_label(range.max));
            }
        }
        self.generation += 1;
    }

    /// Height needed by [`render_list`](Self::render_list).
    pub fn preferred_height(&self) -> f32 {
        let title = if self.title.is_empty() {
            0.0
        } else {
            LABEL_HEIGHT + TITLE_GAP
        };
        title + LABEL_HEIGHT * 2.0 + PLOT_HEIGHT
    }

    /// Title, scale labels, themed box and one polyline per line, top-aligned in `bounds`.
    pub(crate) fn render_list(&self, bounds: ScreenRect) -> RenderList {
        let mut list = RenderList::new();
        let left = bounds.min.x;
        let width = bounds.width();
        let mut y = bounds.min.y;
        let label = |size: f32, v_align: VAlign| {
            TextStyle {
                color: LABEL_COLOR,
                size,
                ..TextStyle::default()
            }
            .anchored(HAlign::Left, v_align)
        };

        if !self.title.is_empty() {
            list.text(
                ScreenPoint::new(left, y),
                self.title.clone(),
                label(TITLE_SIZE, VAlign::Top),
            );
            y += LABEL_HEIGHT + TITLE_GAP;
        }
        list.text(ScreenPoint::new(left, y), self.labels.1.clone(), label(LABEL_SIZE, VAlign::Top));
        y += LABEL_HEIGHT;

        let plot = ScreenRect::new(
            ScreenPoint::new(left, y),
            ScreenPoint::new(left + width, y + PLOT_HEIGHT),
        );
        list.push(RenderCommand::Rect {
            rect: plot,
            style: RectStyle {
                fill: self.theme.background(),
                stroke: Color::BLACK,
                stroke_width: 1.0,
            },
        });
        list.push(RenderCommand::ClipRect(plot));
        let span = self.scale.span();
        for (line, color) in self.lines.iter().zip(&self.colors) {
            let count = line.samples.len();
            let step = if count > 1 {
                width / (count - 1) as f32
            } else {
                0.0
            };
            let points: Vec<ScreenPoint> = line
                .samples
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    let t = if span > 0.0 {
                        ((value - self.scale.min) / span) as f32
                    } else {
                        0.5
                    };
                    ScreenPoint::new(left + step * index as f32, plot.max.y - t * PLOT_HEIGHT)
                })
                .collect();
            list.polyline(
                &points,
                LineStyle {
                    color: Color::from_packed_abgr(*color),
                    ..LineStyle::default()
                },
            );
        }
        list.push(RenderCommand::ClipEnd);

        list.text(
            ScreenPoint::new(left, plot.max.y + LABEL_HEIGHT),
            self.labels.0.clone(),
            label(LABEL_SIZE, VAlign::Bottom),
        );
        list
    }
}

/// Handle to a native plot.
///
/// Clones share the same state. Lock poisoning is recovered, since every
/// mutation leaves the state consistent before it can panic.
#[derive(Clone)]
pub struct PlotHandle {
    state: Arc<RwLock<NativePlotState>>,
}

impl PlotHandle {
    pub(crate) fn new(state: NativePlotState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn lock_read(&self) -> RwLockReadGuard<'_, NativePlotState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_write(&self) -> RwLockWriteGuard<'_, NativePlotState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the plot state.
    ///
    /// The plot is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&NativePlotState) -> R) -> R {
        f(&self.lock_read())
    }

    pub fn uid(&self) -> String {
        self.lock_read().uid.clone()
    }

    /// Append one sample per line.
    pub fn add_data(&self, sample: &[f64]) -> Result<()> {
        self.lock_write().add_data(sample)
    }

    /// Append a sample to a single-line plot.
    pub fn add_value(&self, value: f64) -> Result<()> {
        self.add_data(&[value])
    }

    /// Replace every line's samples. Bounded lines keep the most recent ones.
    pub fn set_data<S: AsRef<[f64]>>(&self, series: &[S]) -> Result<()> {
        self.lock_write().set_data(series)
    }

    /// Snapshot of every line's samples.
    pub fn lines(&self) -> Vec<Vec<f64>> {
        self.lock_read()
            .lines
            .iter()
            .map(|line| line.samples.iter().copied().collect())
            .collect()
    }

    pub fn colors(&self) -> Vec<u32> {
        self.lock_read().colors.clone()
    }

    pub fn scale(&self) -> Range {
        self.lock_read().scale
    }

    /// `(min, max)` label texts.
    pub fn labels(&self) -> (String, String) {
        self.lock_read().labels.clone()
    }

    pub fn generation(&self) -> u64 {
        self.lock_read().generation
    }

    /// Whether both handles point at the same plot.
    pub fn ptr_eq(&self, other: &PlotHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for PlotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_read();
        f.debug_struct("PlotHandle")
            .field("uid", &state.uid)
            .field("lines", &state.lines.len())
            .field("generation", &state.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(lines: usize, ylim: Option<(f64, f64)>, window: Option<usize>) -> NativePlotState {
        NativePlotState::new(
            "p".to_string(),
            String::new(),
            Theme::Light,
            vec![0xFF00_00FF; lines],
            ylim,
            window,
        )
    }

    #[test]
    fn bounded_lines_start_full_of_zeros() {
        let handle = PlotHandle::new(state(2, None, Some(4)));
        assert_eq!(handle.lines(), vec![vec![0.0; 4], vec![0.0; 4]]);
        handle.add_data(&[1.0, 2.0]).expect("two lines");
        assert_eq!(handle.lines()[1], vec![0.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn unbounded_lines_grow() {
        for window in [None, Some(0)] {
            let handle = PlotHandle::new(state(1, None, window));
            for value in [1.0, 2.0, 3.0] {
                handle.add_value(value).expect("one line");
            }
            assert_eq!(handle.lines()[0], vec![0.0, 1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn sample_length_must_match_lines() {
        let handle = PlotHandle::new(state(2, None, Some(3)));
        let err = handle.add_value(1.0).expect_err("two lines");
        assert!(matches!(
            err,
            VisualizerError::InvalidSeriesLength {
                expected: 2,
                actual: 1
            }
        ));
        assert!(handle.set_data(&[vec![1.0]]).is_err());
        assert_eq!(handle.generation(), 0);
    }

    #[test]
    fn scale_follows_data_unless_fixed() {
        let handle = PlotHandle::new(state(1, None, Some(3)));
        assert_eq!(handle.labels(), ("-1.0".to_string(), "1.0".to_string()));
        handle.add_value(2.12345).expect("one line");
        assert_eq!(handle.scale(), Range::new(0.0, 2.12345));
        assert_eq!(handle.labels(), ("0.0".to_string(), "2.123".to_string()));

        let fixed = PlotHandle::new(state(1, Some((-5.0, 5.0)), Some(3)));
        fixed.add_value(20.0).expect("one line");
        assert_eq!(fixed.scale(), Range::new(-5.0, 5.0));
        assert_eq!(fixed.labels(), ("-5.0".to_string(), "5.0".to_string()));
    }

    #[test]
    fn set_data_keeps_the_most_recent_samples() {
        let handle = PlotHandle::new(state(2, None, Some(3)));
        handle
            .set_data(&[vec![1.0, 2.0, 3.0, 4.0], vec![-1.0]])
            .expect("two series");
        assert_eq!(handle.lines(), vec![vec![2.0, 3.0, 4.0], vec![-1.0]]);
        assert_eq!(handle.scale(), Range::new(-1.0, 4.0));
        handle.add_data(&[5.0, -2.0]).expect("two lines");
        assert_eq!(handle.lines(), vec![vec![3.0, 4.0, 5.0], vec![-1.0, -2.0]]);
    }

    #[test]
    fn render_list_draws_one_polyline_per_line() {
        let handle = PlotHandle::new(NativePlotState::new(
            "p".to_string(),
            "Sensors".to_string(),
            Theme::Dark,
            vec![0xFF00_00FF, 0xFF00_FF00],
            None,
            Some(10),
        ));
        let bounds = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(200.0, 200.0));
        let list = handle.read(|state| state.render_list(bounds));
        let polylines = list
            .commands()
            .iter()
            .filter(|command| matches!(command, RenderCommand::LineSegments { .. }))
            .count();
        let texts = list
            .commands()
            .iter()
            .filter(|command| matches!(command, RenderCommand::Text { .. }))
            .count();
        assert_eq!(polylines, 2);
        assert_eq!(texts, 3);
        assert!(handle.read(NativePlotState::preferred_height) > PLOT_HEIGHT);
    }

    #[test]
    fn scale_labels_round_to_three_decimals() {
        assert_eq!(scale_label(1.0), "1.0");
        assert_eq!(scale_label(0.12345), "0.123");
        assert_eq!(scale_label(-2.5), "-2.5");
    }
}
