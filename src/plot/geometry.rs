use crate::PlotError;

/// Spans smaller than this are replaced by it so transforms stay finite.
pub const MIN_SPAN: f64 = 1e-9;
/// Fraction of each axis span added on both sides before drawing.
pub const BOUNDS_PADDING: f64 = 0.01;
pub const DEFAULT_MIN_GRID_LINES: usize = 5;

/// Flat, interleaved `x0, y0, x1, y1, ...` list of points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSequence(Vec<f64>);

impl PointSequence {
  pub fn new(values: Vec<f64>) -> Result<Self, PlotError> {
    if values.len() % 2 != 0 {
      return Err(PlotError::OddPointSequence(values.len()));
    }
    Ok(PointSequence(values))
  }

  pub fn with_capacity(points: usize) -> Self {
    PointSequence(Vec::with_capacity(points * 2))
  }

  pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
    let mut sequence = PointSequence::default();
    for (x, y) in points {
      sequence.push(x, y);
    }
    sequence
  }

  pub fn push(&mut self, x: f64, y: f64) {
    self.0.push(x);
    self.0.push(y);
  }

  pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
    self.0.chunks_exact(2).map(|pair| (pair[0], pair[1]))
  }

  /// Number of points (half the number of values).
  pub fn len(&self) -> usize {
    self.0.len() / 2
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_slice(&self) -> &[f64] {
    &self.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
  X,
  Y,
}

/// Axis-aligned data bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
  pub min_x: f64,
  pub max_x: f64,
  pub min_y: f64,
  pub max_y: f64,
}

impl Bounds {
  /// Bounds of all finite points. Initialized from the first point and
  /// widened from there; all zero when there is no finite point.
  pub fn of_sequences(sequences: &[PointSequence]) -> Self {
    let mut finite = sequences
      .iter()
      .flat_map(|s| s.points())
      .filter(|(x, y)| x.is_finite() && y.is_finite());

    let Some((x, y)) = finite.next() else {
      return Bounds::default();
    };
    let mut bounds = Bounds {
      min_x: x,
      max_x: x,
      min_y: y,
      max_y: y,
    };
    for (x, y) in finite {
      bounds.min_x = bounds.min_x.min(x);
      bounds.max_x = bounds.max_x.max(x);
      bounds.min_y = bounds.min_y.min(y);
      bounds.max_y = bounds.max_y.max(y);
    }
    bounds
  }

  pub fn x_span(&self) -> f64 {
    self.max_x - self.min_x
  }

  pub fn y_span(&self) -> f64 {
    self.max_y - self.min_y
  }

  /// Widen one axis around its midpoint so that `x_span / y_span` matches
  /// `target`. Returns the axis that changed, if any. Never narrows.
  pub fn fit_aspect_ratio(&mut self, target: f64) -> Option<Axis> {
    if !(target.is_finite() && target > 0.0) {
      return None;
    }
    let x_len = self.x_span();
    let y_len = self.y_span();

    if x_len / y_len > target {
      let wanted = x_len / target;
      if wanted > y_len {
        let mid = (self.min_y + self.max_y) / 2.0;
        self.min_y = mid - wanted / 2.0;
        self.max_y = mid + wanted / 2.0;
        return Some(Axis::Y);
      }
    } else {
      let wanted = target * y_len;
      if wanted > x_len {
        let mid = (self.min_x + self.max_x) / 2.0;
        self.min_x = mid - wanted / 2.0;
        self.max_x = mid + wanted / 2.0;
        return Some(Axis::X);
      }
    }
    None
  }

  /// Expand every side outward by `fraction` of the axis span.
  pub fn padded(&self, fraction: f64) -> Self {
    let dx = self.x_span() * fraction;
    let dy = self.y_span() * fraction;
    Bounds {
      min_x: self.min_x - dx,
      max_x: self.max_x + dx,
      min_y: self.min_y - dy,
      max_y: self.max_y + dy,
    }
  }
}

pub fn effective_span(span: f64) -> f64 {
  if span.abs() < MIN_SPAN { MIN_SPAN } else { span }
}

/// Bounds, surface size and pan offset of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
  pub bounds: Bounds,
  pub width: f64,
  pub height: f64,
  pub domain_offset_x: f64,
  pub domain_offset_y: f64,
}

impl RenderState {
  pub fn new(width: f64, height: f64) -> Self {
    RenderState {
      width,
      height,
      ..Default::default()
    }
  }

  pub fn x_span(&self) -> f64 {
    effective_span(self.bounds.x_span())
  }

  pub fn y_span(&self) -> f64 {
    effective_span(self.bounds.y_span())
  }

  pub fn screen_x(&self, x: f64) -> f64 {
    (x - (self.bounds.min_x + self.domain_offset_x)) / self.x_span()
      * self.width
  }

  pub fn screen_y(&self, y: f64) -> f64 {
    (1.0 - (y - self.bounds.min_y + self.domain_offset_y) / self.y_span())
      * self.height
  }

  pub fn screen_x_to_domain(&self, screen_x: f64) -> f64 {
    if self.width <= 0.0 {
      return self.bounds.min_x + self.domain_offset_x;
    }
    screen_x / self.width * self.x_span()
      + self.bounds.min_x
      + self.domain_offset_x
  }

  pub fn screen_y_to_domain(&self, screen_y: f64) -> f64 {
    if self.height <= 0.0 {
      return self.bounds.min_y - self.domain_offset_y;
    }
    (1.0 - screen_y / self.height) * self.y_span() + self.bounds.min_y
      - self.domain_offset_y
  }

  /// Domain X range currently on screen, after panning.
  pub fn visible_x_range(&self) -> (f64, f64) {
    let start = self.bounds.min_x + self.domain_offset_x;
    (start, start + self.x_span())
  }

  /// Domain Y range currently on screen, after panning.
  pub fn visible_y_range(&self) -> (f64, f64) {
    let start = self.bounds.min_y - self.domain_offset_y;
    (start, start + self.y_span())
  }
}

/// Convert a pixel delta into a domain delta along one axis.
pub fn screen_delta_to_domain(delta: f64, dimension: f64, span: f64) -> f64 {
  if dimension <= 0.0 {
    return 0.0;
  }
  delta / dimension * span
}

/// Largest `e` with `base^e <= value`, for `value > 0`.
fn floor_log(value: f64, base: f64) -> i32 {
  let mut exponent = (value.ln() / base.ln()).floor() as i32;
  while base.powi(exponent + 1) <= value {
    exponent += 1;
  }
  while base.powi(exponent) > value {
    exponent -= 1;
  }
  exponent
}

/// Grid spacing for an axis of length `span`.
///
/// Candidates are `base^(floor(log_base span) - 1)` for bases 2, 5 and 10.
/// Among those that give more than `min_lines` lines, the largest wins,
/// unless a rounder base (10, then 5) lies within a factor of two of it.
pub fn grid_spacing(span: f64, min_lines: usize) -> f64 {
  let span = effective_span(span.abs());
  if !span.is_finite() {
    return f64::INFINITY;
  }

  // (candidate, roundness)
  let mut candidates: Vec<(f64, u8)> = [(2.0, 0), (5.0, 1), (10.0, 2)]
    .into_iter()
    .map(|(base, roundness)| {
      (f64::powi(base, floor_log(span, base) - 1), roundness)
    })
    .collect();
  candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

  let qualifying: Vec<(f64, u8)> = candidates
    .iter()
    .copied()
    .filter(|(spacing, _)| span / spacing > min_lines as f64)
    .collect();

  let Some(&(largest, _)) = qualifying.last() else {
    return candidates[0].0;
  };
  qualifying
    .into_iter()
    .filter(|(spacing, _)| spacing * 2.0 > largest)
    .max_by_key(|(_, roundness)| *roundness)
    .map_or(largest, |(spacing, _)| spacing)
}

/// Multiples of `spacing` inside `[min, max]`, ascending.
pub fn grid_lines(min: f64, max: f64, spacing: f64) -> Vec<f64> {
  const MAX_LINES: usize = 10_000;

  if !(spacing.is_finite() && spacing > 0.0 && min.is_finite() && max.is_finite())
  {
    return Vec::new();
  }
  let first = (min / spacing).ceil();
  (0..MAX_LINES)
    .map(|i| (first + i as f64) * spacing)
    .take_while(|value| *value <= max)
    .collect()
}

/// Hue in degrees for sequence `index` out of `count`.
pub fn hue_for_index(index: usize, count: usize) -> f64 {
  if count == 0 {
    return 0.0;
  }
  360.0 * index as f64 / count as f64
}

/// Axis labels carry one decimal.
pub fn format_axis_label(value: f64) -> String {
  let label = format!("{value:.1}");
  if label == "-0.0" {
    "0.0".to_string()
  } else {
    label
  }
}

pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
  start + (end - start) * t
}
