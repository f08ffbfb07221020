use tracing::trace_span;

use super::geometry::{
  BOUNDS_PADDING, Bounds, PointSequence, RenderState, format_axis_label,
  grid_lines, grid_spacing, hue_for_index,
};
use super::surface::{Color, DisplayList, Surface, TextAlign};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
  /// Widen one axis so data units are square on screen.
  pub maintain_aspect_ratio: bool,
}

/// Split a sequence into runs of finite points, breaking at NaN/Infinity.
/// Runs with fewer than two points draw nothing and are dropped.
pub(crate) fn split_into_segments(
  sequence: &PointSequence,
) -> Vec<Vec<(f64, f64)>> {
  let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
  let mut current: Vec<(f64, f64)> = Vec::new();

  for (x, y) in sequence.points() {
    if x.is_finite() && y.is_finite() {
      current.push((x, y));
    } else if current.len() > 1 {
      segments.push(std::mem::take(&mut current));
    } else {
      current.clear();
    }
  }
  if current.len() > 1 {
    segments.push(current);
  }
  segments
}

/// Fits point sequences to a surface and draws them with a labelled grid.
#[derive(Debug, Clone)]
pub struct PathRenderer<S: Surface = DisplayList> {
  surface: S,
  state: RenderState,
  theme: Theme,
}

impl PathRenderer<DisplayList> {
  pub fn with_display_list(theme: Theme) -> Self {
    PathRenderer::new(DisplayList::new(), theme)
  }
}

impl<S: Surface> PathRenderer<S> {
  pub fn new(surface: S, theme: Theme) -> Self {
    PathRenderer {
      surface,
      state: RenderState::default(),
      theme,
    }
  }

  pub fn state(&self) -> &RenderState {
    &self.state
  }

  pub fn state_mut(&mut self) -> &mut RenderState {
    &mut self.state
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn theme(&self) -> &Theme {
    &self.theme
  }

  /// Record a new surface size. Takes effect on the next render.
  pub fn resize(&mut self, width: f64, height: f64) {
    self.state.width = width.max(0.0);
    self.state.height = height.max(0.0);
  }

  /// Start an empty frame at the current size.
  pub fn clear(&mut self) {
    self.surface.begin_frame(self.state.width, self.state.height);
  }

  /// Run one full render cycle: bounds, aspect fit, padding, background,
  /// paths, grid and labels.
  pub fn render_paths(
    &mut self,
    sequences: &[PointSequence],
    options: RenderOptions,
  ) {
    let (width, height) = (self.state.width, self.state.height);
    let drawable = width > 0.0 && height > 0.0;

    let mut bounds = Bounds::of_sequences(sequences);
    if options.maintain_aspect_ratio && drawable {
      bounds.fit_aspect_ratio(width / height);
    }
    self.state.bounds = bounds.padded(BOUNDS_PADDING);

    let min_lines = self.theme.grid.min_lines;
    let spacing_x = grid_spacing(self.state.x_span(), min_lines);
    let spacing_y = grid_spacing(self.state.y_span(), min_lines);

    let span = trace_span!(
      "render_paths",
      sequences = sequences.len(),
      min_x = self.state.bounds.min_x,
      max_x = self.state.bounds.max_x,
      min_y = self.state.bounds.min_y,
      max_y = self.state.bounds.max_y,
      spacing_x,
      spacing_y
    );
    let _enter = span.enter();

    self.surface.begin_frame(width, height);
    if !drawable {
      return;
    }

    self
      .surface
      .fill_rect(0.0, 0.0, width, height, self.theme.background);
    self.draw_paths(sequences);
    self.draw_grid(spacing_x, spacing_y);
  }

  fn draw_paths(&mut self, sequences: &[PointSequence]) {
    let state = self.state;
    for (index, sequence) in sequences.iter().enumerate() {
      let color = Color::from_hsl(hue_for_index(index, sequences.len()), 1.0, 0.5);
      for segment in split_into_segments(sequence) {
        let screen: Vec<(f64, f64)> = segment
          .iter()
          .map(|&(x, y)| (state.screen_x(x), state.screen_y(y)))
          .collect();
        self.surface.stroke_path(&screen, color, self.theme.path_width);
      }
    }
  }

  fn draw_grid(&mut self, spacing_x: f64, spacing_y: f64) {
    let state = self.state;
    let (width, height) = (state.width, state.height);
    let (x_start, x_end) = state.visible_x_range();
    let (y_start, y_end) = state.visible_y_range();
    let xs = grid_lines(x_start, x_end, spacing_x);
    let ys = grid_lines(y_start, y_end, spacing_y);

    let (gridline, grid_width) = (self.theme.gridline, self.theme.grid_width);
    for &x in &xs {
      let sx = state.screen_x(x);
      self
        .surface
        .stroke_path(&[(sx, 0.0), (sx, height)], gridline, grid_width);
    }
    for &y in &ys {
      let sy = state.screen_y(y);
      self
        .surface
        .stroke_path(&[(0.0, sy), (width, sy)], gridline, grid_width);
    }

    let font_size = self.theme.font_size;
    let centered = self.theme.label_style(TextAlign::Center);
    for &x in &xs {
      self.surface.fill_text(
        &format_axis_label(x),
        state.screen_x(x),
        height - font_size + 4.0,
        &centered,
      );
    }
    let left = self.theme.label_style(TextAlign::Left);
    for &y in &ys {
      self
        .surface
        .fill_text(&format_axis_label(y), 10.0, state.screen_y(y) - 2.0, &left);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn segments_break_at_non_finite_points() {
    let seq = PointSequence::from_points([
      (0.0, 0.0),
      (1.0, 1.0),
      (2.0, f64::NAN),
      (3.0, 3.0),
      (f64::INFINITY, 4.0),
      (5.0, 5.0),
      (6.0, 6.0),
    ]);
    assert_eq!(
      split_into_segments(&seq),
      vec![vec![(0.0, 0.0), (1.0, 1.0)], vec![(5.0, 5.0), (6.0, 6.0)]]
    );
  }
}
