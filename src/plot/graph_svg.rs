use std::fmt::Write as _;

use super::geometry::{PointSequence, effective_span, hue_for_index, lerp};
use super::sampler::sample_function;
use super::surface::Color;
use crate::evaluator::{BlockEvaluator, GraphRequest, VariableStack};
use crate::utils::html_escape;
use crate::value::{EvalError, format_number};

pub const WIDTH: f64 = 1000.0;
pub const HEIGHT: f64 = 500.0;
pub const LEFT_PAD: f64 = 100.0;
pub const BOTTOM_PAD: f64 = 17.0;
pub const TOP_PAD: f64 = 5.0;
pub const AXES_OVERHANG: f64 = 10.0;

/// Title of the text result shown when sampling fails.
pub const GRAPH_ERROR_TITLE: &str = "An error occurred while graphing";

/// Hover overlay for one mouse position.
#[derive(Debug, Clone, PartialEq)]
pub struct Crosshair {
  /// `"x, y"` in domain units, three decimals each.
  pub readout: String,
  pub text_x: f64,
  pub text_y: f64,
  pub horizontal: String,
  pub vertical: String,
}

/// A fixed-size graph of one or more functions with min/max labels.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSvg {
  title: String,
  domain_start: f64,
  domain_end: f64,
  min: f64,
  max: f64,
  sequences: Vec<PointSequence>,
}

impl GraphSvg {
  /// Sample every function of `request` once per horizontal pixel.
  pub fn build<E: BlockEvaluator + ?Sized>(
    evaluator: &mut E,
    vars: &mut VariableStack,
    request: &GraphRequest,
  ) -> Result<Self, EvalError> {
    let samples = WIDTH as usize;
    let sequences = request
      .functions
      .iter()
      .map(|func| {
        sample_function(&mut *evaluator, &mut *vars, func, request.domain, samples - 1)
      })
      .collect::<Result<Vec<_>, _>>()?;

    let mut ys = sequences
      .iter()
      .flat_map(|s| s.points())
      .map(|(_, y)| y)
      .filter(|y| y.is_finite());
    let first = ys.next().unwrap_or(0.0);
    let (min, max) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));

    Ok(GraphSvg {
      title: format!("graph of {}", request.names().join(", ")),
      domain_start: request.domain.start(),
      domain_end: request.domain.end(),
      min,
      max,
      sequences,
    })
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn y_range(&self) -> (f64, f64) {
    (self.min, self.max)
  }

  fn plot_height() -> f64 {
    HEIGHT - BOTTOM_PAD - TOP_PAD
  }

  fn view_x(&self, t: f64) -> f64 {
    LEFT_PAD + t * (WIDTH - LEFT_PAD)
  }

  fn view_y(&self, y: f64) -> f64 {
    TOP_PAD
      + Self::plot_height()
        * (1.0 - (y - self.min) / effective_span(self.max - self.min))
  }

  /// `Bounds: a < x < b | c < y < d`
  pub fn bounds_summary(&self) -> String {
    format!(
      "Bounds: {} < x < {}\t | \t{} < y < {}",
      format_number(self.domain_start),
      format_number(self.domain_end),
      format_number(self.min),
      format_number(self.max)
    )
  }

  /// Overlay for a mouse at `(x, y)` in SVG coordinates, or `None` outside
  /// the plot rectangle.
  pub fn crosshair(&self, x: f64, y: f64) -> Option<Crosshair> {
    let bottom = HEIGHT - BOTTOM_PAD;
    if !(LEFT_PAD..=WIDTH).contains(&x) || !(TOP_PAD..=bottom).contains(&y) {
      return None;
    }
    let t_x = (x - LEFT_PAD) / (WIDTH - LEFT_PAD);
    let t_y = (y - TOP_PAD) / Self::plot_height();
    let domain_x = lerp(self.domain_start, self.domain_end, t_x);
    let domain_y = lerp(self.max, self.min, t_y);

    Some(Crosshair {
      readout: format!("{domain_x:.3}, {domain_y:.3}"),
      text_x: x + AXES_OVERHANG,
      text_y: y - AXES_OVERHANG,
      horizontal: format!("M {LEFT_PAD} {y} L {WIDTH} {y}"),
      vertical: format!("M {x} {TOP_PAD} L {x} {bottom}"),
    })
  }

  pub fn to_svg(&self) -> String {
    self.render(None)
  }

  pub fn to_svg_with_crosshair(&self, crosshair: &Crosshair) -> String {
    self.render(Some(crosshair))
  }

  fn render(&self, crosshair: Option<&Crosshair>) -> String {
    let bottom = HEIGHT - BOTTOM_PAD;
    let mut svg = format!(
      "<svg width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );
    let _ = writeln!(svg, "<title>{}</title>", html_escape(&self.title));

    let mut path = |d: String, stroke: &str, width: f64| {
      let _ = writeln!(
        svg,
        "<path d=\"{d}\" stroke=\"{stroke}\" stroke-width=\"{width}px\" fill=\"none\"/>"
      );
    };
    path(
      format!("M {} {bottom} L {WIDTH} {bottom}", LEFT_PAD - AXES_OVERHANG),
      "black",
      1.0,
    );
    path(
      format!("M {LEFT_PAD} {} L {LEFT_PAD} {TOP_PAD}", bottom + AXES_OVERHANG),
      "black",
      1.0,
    );
    path(
      format!("M {} {TOP_PAD} L {WIDTH} {TOP_PAD}", LEFT_PAD - AXES_OVERHANG),
      "grey",
      1.0,
    );
    path(
      format!("M {WIDTH} {} L {WIDTH} {TOP_PAD}", bottom + AXES_OVERHANG),
      "grey",
      1.0,
    );

    for (index, sequence) in self.sequences.iter().enumerate() {
      let color = Color::from_hsl(hue_for_index(index, self.sequences.len()), 1.0, 0.5);
      let last = sequence.len().saturating_sub(1).max(1) as f64;
      let d = sequence
        .points()
        .enumerate()
        .map(|(i, (_, y))| {
          let command = if i == 0 { "M" } else { "L" };
          format!("{command}{} {}", self.view_x(i as f64 / last), self.view_y(y))
        })
        .collect::<Vec<_>>()
        .join(" ");
      path(d, &color.to_hex(), 2.0);
    }

    let mut text = |label: String, x: f64, y: f64, anchor: &str| {
      let _ = writeln!(
        svg,
        "<text text-anchor=\"{anchor}\" x=\"{x}\" y=\"{y}\" style=\"font-size:0.8em\">{}</text>",
        html_escape(&label)
      );
    };
    text(
      format!("{:.2}", self.min),
      LEFT_PAD - AXES_OVERHANG,
      bottom - AXES_OVERHANG,
      "end",
    );
    text(
      format!("{:.2}", self.max),
      LEFT_PAD - AXES_OVERHANG,
      BOTTOM_PAD + TOP_PAD,
      "end",
    );
    text(
      format!("{:.2}", self.domain_start),
      LEFT_PAD + AXES_OVERHANG,
      HEIGHT,
      "start",
    );
    text(
      format!("{:.2}", self.domain_end),
      WIDTH - AXES_OVERHANG,
      HEIGHT,
      "end",
    );

    let _ = writeln!(
      svg,
      "<rect class=\"graph-rect\" x=\"{LEFT_PAD}\" y=\"{TOP_PAD}\" width=\"{}\" height=\"{}\" fill=\"transparent\"/>",
      WIDTH - LEFT_PAD,
      Self::plot_height()
    );

    if let Some(crosshair) = crosshair {
      let _ = writeln!(
        svg,
        "<text text-anchor=\"start\" x=\"{}\" y=\"{}\" style=\"font-size:0.8em\">{}</text>",
        crosshair.text_x,
        crosshair.text_y,
        html_escape(&crosshair.readout)
      );
      for d in [&crosshair.horizontal, &crosshair.vertical] {
        let _ = writeln!(svg, "<path d=\"{d}\" stroke=\"grey\" stroke-width=\"1\"/>");
      }
    }

    svg.push_str("</svg>\n");
    svg
  }
}
