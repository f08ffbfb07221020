use tracing::trace;

use super::geometry::{PointSequence, RenderState, screen_delta_to_domain};
use super::renderer::{PathRenderer, RenderOptions};
use super::sampler::sample_function;
use super::surface::{DisplayList, Surface};
use crate::evaluator::{BlockEvaluator, GraphRequest, Interpreter, VariableStack};
use crate::theme::Theme;
use crate::value::EvalError;

/// What a chart draws and how it reacts to panning.
pub trait ChartSource {
  fn title(&self) -> String;

  fn render_options(&self) -> RenderOptions;

  /// Point sequences for a surface `width` pixels wide.
  fn sequences(&mut self, width: f64) -> Result<Vec<PointSequence>, EvalError>;

  /// Pan state to remember when a drag starts.
  fn pan_origin(&self, state: &RenderState) -> (f64, f64);

  /// Move the pan state to `origin` shifted by a pixel delta measured from
  /// the drag start.
  fn drag_to(
    &mut self,
    state: &mut RenderState,
    origin: (f64, f64),
    dx: f64,
    dy: f64,
  );
}

/// Fixed point lists, panned on both axes through the render offset.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotChart {
  index: usize,
  lists: Vec<PointSequence>,
}

impl PlotChart {
  pub fn new(index: usize, lists: Vec<PointSequence>) -> Self {
    PlotChart { index, lists }
  }
}

impl ChartSource for PlotChart {
  fn title(&self) -> String {
    format!("Plot output {}:", self.index)
  }

  fn render_options(&self) -> RenderOptions {
    RenderOptions {
      maintain_aspect_ratio: true,
    }
  }

  fn sequences(&mut self, _width: f64) -> Result<Vec<PointSequence>, EvalError> {
    Ok(self.lists.clone())
  }

  fn pan_origin(&self, state: &RenderState) -> (f64, f64) {
    (state.domain_offset_x, state.domain_offset_y)
  }

  fn drag_to(
    &mut self,
    state: &mut RenderState,
    origin: (f64, f64),
    dx: f64,
    dy: f64,
  ) {
    state.domain_offset_x =
      origin.0 - screen_delta_to_domain(dx, state.width, state.x_span());
    state.domain_offset_y =
      origin.1 - screen_delta_to_domain(dy, state.height, state.y_span());
  }
}

/// Functions re-sampled on every render, one sample per pixel column.
/// Panning moves the sampled domain along X only.
#[derive(Debug, Clone)]
pub struct GraphChart<E: BlockEvaluator = Interpreter> {
  request: GraphRequest,
  evaluator: E,
  variables: VariableStack,
  domain_offset: f64,
}

impl GraphChart<Interpreter> {
  pub fn new(request: GraphRequest) -> Self {
    GraphChart::with_evaluator(request, Interpreter)
  }
}

impl<E: BlockEvaluator> GraphChart<E> {
  pub fn with_evaluator(request: GraphRequest, evaluator: E) -> Self {
    GraphChart {
      request,
      evaluator,
      variables: VariableStack::new(),
      domain_offset: 0.0,
    }
  }

  pub fn domain_offset(&self) -> f64 {
    self.domain_offset
  }

  pub fn request(&self) -> &GraphRequest {
    &self.request
  }
}

impl<E: BlockEvaluator> ChartSource for GraphChart<E> {
  fn title(&self) -> String {
    format!("graph of {}", self.request.names().join(", "))
  }

  fn render_options(&self) -> RenderOptions {
    RenderOptions {
      maintain_aspect_ratio: false,
    }
  }

  fn sequences(&mut self, width: f64) -> Result<Vec<PointSequence>, EvalError> {
    let interval = self
      .request
      .domain
      .shifted(self.domain_offset)
      .map_err(|e| EvalError::new(e.to_string()))?;
    let subdivisions = width.floor().max(0.0) as usize;

    self
      .request
      .functions
      .iter()
      .map(|func| {
        sample_function(
          &mut self.evaluator,
          &mut self.variables,
          func,
          interval,
          subdivisions,
        )
      })
      .collect()
  }

  fn pan_origin(&self, _state: &RenderState) -> (f64, f64) {
    (self.domain_offset, 0.0)
  }

  fn drag_to(
    &mut self,
    state: &mut RenderState,
    origin: (f64, f64),
    dx: f64,
    _dy: f64,
  ) {
    self.domain_offset = origin.0
      - screen_delta_to_domain(dx, state.width, self.request.domain.span());
  }
}

/// A mounted chart: owns its renderer and replays the source on resize,
/// drag and forced re-render.
#[derive(Debug, Clone)]
pub struct ChartView<C: ChartSource, S: Surface = DisplayList> {
  source: C,
  renderer: PathRenderer<S>,
  title: String,
  drag_origin: Option<(f64, f64)>,
  failure: Option<EvalError>,
}

impl<C: ChartSource> ChartView<C, DisplayList> {
  pub fn new(source: C, theme: Theme) -> Self {
    ChartView::with_surface(source, DisplayList::new(), theme)
  }
}

impl<C: ChartSource, S: Surface> ChartView<C, S> {
  pub fn with_surface(source: C, surface: S, theme: Theme) -> Self {
    let title = source.title();
    ChartView {
      source,
      renderer: PathRenderer::new(surface, theme),
      title,
      drag_origin: None,
      failure: None,
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn set_title(&mut self, title: impl Into<String>) {
    self.title = title.into();
  }

  pub fn source(&self) -> &C {
    &self.source
  }

  pub fn state(&self) -> &RenderState {
    self.renderer.state()
  }

  pub fn surface(&self) -> &S {
    self.renderer.surface()
  }

  /// The error of the last render, shown instead of the chart.
  pub fn failure(&self) -> Option<&EvalError> {
    self.failure.as_ref()
  }

  pub fn resize(&mut self, width: f64, height: f64) {
    self.renderer.resize(width, height);
    self.force_rerender();
  }

  pub fn drag_start(&mut self) {
    self.drag_origin = Some(self.source.pan_origin(self.renderer.state()));
  }

  /// Pan by a pixel delta measured from the drag start.
  pub fn drag(&mut self, dx: f64, dy: f64) {
    let origin = match self.drag_origin {
      Some(origin) => origin,
      None => {
        let origin = self.source.pan_origin(self.renderer.state());
        self.drag_origin = Some(origin);
        origin
      }
    };
    self
      .source
      .drag_to(self.renderer.state_mut(), origin, dx, dy);
    trace!(title = %self.title, dx, dy, "drag");
    self.force_rerender();
  }

  pub fn drag_end(&mut self) {
    self.drag_origin = None;
  }

  /// Re-request the sequences and render them. On failure the surface is
  /// cleared and the error kept for display.
  pub fn force_rerender(&mut self) {
    let width = self.renderer.state().width;
    match self.source.sequences(width) {
      Ok(sequences) => {
        self.failure = None;
        let options = self.source.render_options();
        self.renderer.render_paths(&sequences, options);
      }
      Err(err) => {
        self.renderer.clear();
        self.failure = Some(err);
      }
    }
  }
}
