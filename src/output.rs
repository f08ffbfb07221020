use std::fmt;

use tracing::{debug, warn};

use crate::evaluator::{
  Interpreter, ProgramContext, ProgramInput, ProgramResult, VariableStack,
};
use crate::plot::chart::{ChartView, GraphChart, PlotChart};
use crate::plot::graph_svg::{GRAPH_ERROR_TITLE, GraphSvg};
use crate::syntax::Span;
use crate::theme::Theme;
use crate::utils::truncate;
use crate::value::{EvalError, Value};
use crate::{PlotError, evaluate_program, evaluate_program_with_inputs};

pub const FINAL_RESULT_TITLE: &str = "Final calculation result";
const ERROR_SOURCE_CHARS: usize = 30;

/// A titled value, shown as `title: value`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextResult {
  pub title: String,
  pub value: String,
  pub is_error: bool,
}

impl TextResult {
  pub fn new(title: impl Into<String>, value: &Value) -> Self {
    TextResult {
      title: title.into(),
      value: value.to_string(),
      is_error: value.is_error(),
    }
  }
}

impl fmt::Display for TextResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.title, self.value)
  }
}

pub enum OutputItem {
  Text(TextResult),
  Input(ProgramInput),
  Plot(ChartView<PlotChart>),
  Graph(ChartView<GraphChart>),
}

impl OutputItem {
  pub fn title(&self) -> &str {
    match self {
      OutputItem::Text(text) => &text.title,
      OutputItem::Input(input) => &input.name,
      OutputItem::Plot(view) => view.title(),
      OutputItem::Graph(view) => view.title(),
    }
  }
}

/// One text result per failing source location, in first-seen order.
///
/// `Error at ln 3 ( 1/0 )` for a single error, `4 errors at ln 3 ( f(x) )`
/// when several errors came from the same code.
pub fn error_outputs(context: &ProgramContext) -> Vec<TextResult> {
  let mut spots: Vec<(Option<Span>, Vec<&EvalError>)> = Vec::new();
  for err in &context.errors {
    match spots.iter_mut().find(|(span, _)| *span == err.span) {
      Some((_, errors)) => errors.push(err),
      None => spots.push((err.span, vec![err])),
    }
  }

  spots
    .into_iter()
    .map(|(span, errors)| {
      let plural = if errors.len() == 1 {
        "Error".to_string()
      } else {
        format!("{} errors", errors.len())
      };
      let title = match span {
        Some(span) => format!(
          "{plural} at ln {} ( {} )",
          span.line,
          truncate(span.text(&context.text), ERROR_SOURCE_CHARS)
        ),
        None => plural,
      };
      TextResult::new(title, &Value::Error(errors[0].clone()))
    })
    .collect()
}

fn untitled(index: usize) -> String {
  format!("result {index}")
}

/// Build the output panel of a finished program: errors, then the sliders,
/// then every print/plot/graph result in order, then the final value
/// unless null.
///
/// Charts are not rendered yet; size them with [`ChartView::resize`].
pub fn collect_outputs(context: &ProgramContext, theme: &Theme) -> Vec<OutputItem> {
  let mut outputs: Vec<OutputItem> =
    error_outputs(context).into_iter().map(OutputItem::Text).collect();
  outputs.extend(context.inputs.iter().cloned().map(OutputItem::Input));

  for (index, result) in context.results.iter().enumerate() {
    let item = match result {
      ProgramResult::Print { title, value } => OutputItem::Text(TextResult::new(
        title.clone().unwrap_or_else(|| untitled(index)),
        value,
      )),
      ProgramResult::Plot { lists: Ok(lists) } => OutputItem::Plot(ChartView::new(
        PlotChart::new(index, lists.clone()),
        theme.clone(),
      )),
      ProgramResult::Graph {
        request: Ok(request),
      } => OutputItem::Graph(ChartView::new(
        GraphChart::new(request.clone()),
        theme.clone(),
      )),
      ProgramResult::Plot { lists: Err(err) }
      | ProgramResult::Graph { request: Err(err) } => OutputItem::Text(
        TextResult::new(untitled(index), &Value::Error(err.clone())),
      ),
    };
    outputs.push(item);
  }

  if !context.program_result.is_null() {
    outputs.push(OutputItem::Text(TextResult::new(
      FINAL_RESULT_TITLE,
      &context.program_result,
    )));
  }
  outputs
}

/// A program together with its output panel. Moving a slider re-runs the
/// program and re-renders the panel.
pub struct ProgramSession {
  source: String,
  theme: Theme,
  context: ProgramContext,
  outputs: Vec<OutputItem>,
}

impl ProgramSession {
  pub fn new(source: &str, theme: Theme) -> Result<Self, PlotError> {
    let context = evaluate_program(source)?;
    let outputs = collect_outputs(&context, &theme);
    Ok(ProgramSession {
      source: source.to_string(),
      theme,
      context,
      outputs,
    })
  }

  pub fn context(&self) -> &ProgramContext {
    &self.context
  }

  pub fn outputs(&self) -> &[OutputItem] {
    &self.outputs
  }

  pub fn outputs_mut(&mut self) -> &mut [OutputItem] {
    &mut self.outputs
  }

  pub fn into_outputs(self) -> Vec<OutputItem> {
    self.outputs
  }

  /// Move the slider `name` to `value`, then run the program again with
  /// the new value. Charts that were already sized are rendered at the
  /// same size. Returns the value the slider settled on.
  pub fn set_input(&mut self, name: &str, value: f64) -> Result<f64, PlotError> {
    let mut inputs = self.context.inputs.clone();
    let input = inputs
      .iter_mut()
      .find(|input| input.name == name)
      .ok_or_else(|| PlotError::UnknownInput(name.to_string()))?;
    let settled = input.set_value(value);
    debug!(input = name, value = settled, "input changed");

    let context = evaluate_program_with_inputs(&self.source, &inputs)?;
    let sizes: Vec<(f64, f64)> = self.outputs.iter().filter_map(chart_size).collect();
    let mut outputs = collect_outputs(&context, &self.theme);
    let charts = outputs.iter_mut().filter(|item| chart_size(item).is_some());
    for (item, (width, height)) in charts.zip(sizes) {
      if width > 0.0 || height > 0.0 {
        resize_chart(item, width, height);
      }
    }

    self.context = context;
    self.outputs = outputs;
    Ok(settled)
  }
}

fn chart_size(item: &OutputItem) -> Option<(f64, f64)> {
  let state = match item {
    OutputItem::Plot(view) => view.state(),
    OutputItem::Graph(view) => view.state(),
    OutputItem::Text(_) | OutputItem::Input(_) => return None,
  };
  Some((state.width, state.height))
}

fn resize_chart(item: &mut OutputItem, width: f64, height: f64) {
  match item {
    OutputItem::Plot(view) => view.resize(width, height),
    OutputItem::Graph(view) => view.resize(width, height),
    OutputItem::Text(_) | OutputItem::Input(_) => {}
  }
}

pub enum SvgOutput {
  Text(TextResult),
  Graph(GraphSvg),
}

/// Outputs for the fixed-size SVG graph renderer: errors, the calculation
/// result, then print and graph results. Plot results are skipped.
pub fn collect_svg_outputs(context: &ProgramContext) -> Vec<SvgOutput> {
  let mut outputs: Vec<SvgOutput> =
    error_outputs(context).into_iter().map(SvgOutput::Text).collect();

  if !context.program_result.is_null() {
    outputs.push(SvgOutput::Text(TextResult::new(
      "Calculation result",
      &context.program_result,
    )));
  }

  for (index, result) in context.results.iter().enumerate() {
    match result {
      ProgramResult::Print { title, value } => {
        outputs.push(SvgOutput::Text(TextResult::new(
          title.clone().unwrap_or_else(|| untitled(index)),
          value,
        )));
      }
      ProgramResult::Graph {
        request: Ok(request),
      } => {
        let mut variables = VariableStack::new();
        let graph = GraphSvg::build(&mut Interpreter, &mut variables, request);
        outputs.push(match graph {
          Ok(graph) => SvgOutput::Graph(graph),
          Err(err) => {
            SvgOutput::Text(TextResult::new(GRAPH_ERROR_TITLE, &Value::Error(err)))
          }
        });
      }
      ProgramResult::Graph { request: Err(err) } => {
        outputs.push(SvgOutput::Text(TextResult::new(
          untitled(index),
          &Value::Error(err.clone()),
        )));
      }
      ProgramResult::Plot { .. } => {
        warn!(result = index, "plot output is not supported by the SVG graph renderer");
      }
    }
  }
  outputs
}
