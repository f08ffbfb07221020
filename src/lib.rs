use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

pub mod evaluator;
pub mod output;
pub mod plot;
pub mod syntax;
pub mod theme;
pub mod utils;
pub mod value;

use evaluator::{ProgramContext, ProgramInput};
use syntax::Block;

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

#[derive(Error, Debug)]
pub enum PlotError {
  #[error("Parse error: {0}")]
  ParseError(#[from] Box<pest::error::Error<Rule>>),
  #[error("Empty input")]
  EmptyInput,
  #[error("point sequence must hold x,y pairs, got {0} values")]
  OddPointSequence(usize),
  #[error("domain bounds must be finite, got {start} to {end}")]
  NonFiniteDomain { start: f64, end: f64 },
  #[error("no input named '{0}'")]
  UnknownInput(String),
  #[error("Render error: {0}")]
  RenderError(String),
  #[error("Theme error: {0}")]
  ThemeError(#[from] serde_json::Error),
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl CalcParser {
  pub fn parse_program(
    input: &str,
  ) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>>
  {
    Self::parse(Rule::Program, input).map_err(Box::new)
  }
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  CalcParser::parse_program(input)
}

/// Parse `input` into a statement block.
pub fn parse_program(input: &str) -> Result<Block, PlotError> {
  if input.trim().is_empty() {
    return Err(PlotError::EmptyInput);
  }
  let mut pairs = parse(input)?;
  Ok(pairs.next().map(syntax::pair_to_block).unwrap_or_default())
}

/// Parse and run a whole program, collecting its results and errors.
pub fn evaluate_program(input: &str) -> Result<ProgramContext, PlotError> {
  evaluate_program_with_inputs(input, &[])
}

/// Run a program with slider values carried over from `inputs`.
pub fn evaluate_program_with_inputs(
  input: &str,
  inputs: &[ProgramInput],
) -> Result<ProgramContext, PlotError> {
  let program = parse_program(input)?;
  let mut context = ProgramContext::with_inputs(input, inputs.to_vec());
  context.run(&program);
  Ok(context)
}

/// Run a program and render its final value as text.
pub fn interpret(input: &str) -> Result<String, PlotError> {
  let context = evaluate_program(input)?;
  Ok(context.program_result.to_string())
}
