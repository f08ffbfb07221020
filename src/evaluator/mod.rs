pub mod builtins;
pub mod inputs;
pub mod scoping;

use std::rc::Rc;

use tracing::{debug, trace};

pub use inputs::ProgramInput;
pub use scoping::{FrameGuard, ScopeError, SlotId, VariableStack};

use crate::plot::geometry::PointSequence;
use crate::plot::sampler::DomainInterval;
use crate::syntax::{BinaryOperator, Block, Expr, Span, Stmt, StmtKind};
use crate::value::{EvalError, FunctionValue, Value};

/// Runs a function body against a variable stack.
///
/// This is the only evaluator entry point the plotting code relies on; the
/// reference [`Interpreter`] implements it for the bundled expression
/// language.
pub trait BlockEvaluator {
  /// Evaluate `body` and return its `return` value or the value of its
  /// last statement. Failures come back as [`Value::Error`].
  fn evaluate_block(&mut self, vars: &mut VariableStack, body: &Block)
  -> Value;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter;

impl BlockEvaluator for Interpreter {
  fn evaluate_block(
    &mut self,
    vars: &mut VariableStack,
    body: &Block,
  ) -> Value {
    match run_block(vars, body) {
      Ok(Flow::Next(value) | Flow::Return(value)) => value,
      Err(err) => Value::Error(err),
    }
  }
}

enum Flow {
  Next(Value),
  Return(Value),
}

fn scope_error(err: ScopeError, span: Span) -> EvalError {
  EvalError::at(err.to_string(), span)
}

fn run_block(
  vars: &mut VariableStack,
  body: &Block,
) -> Result<Flow, EvalError> {
  let mut last = Value::Null;
  for stmt in &body.statements {
    match exec_stmt(vars, stmt)? {
      Flow::Return(value) => return Ok(Flow::Return(value)),
      Flow::Next(value) => last = value,
    }
  }
  Ok(Flow::Next(last))
}

fn exec_stmt(vars: &mut VariableStack, stmt: &Stmt) -> Result<Flow, EvalError> {
  match &stmt.kind {
    StmtKind::Let { name, value } => {
      let value = eval_expr(vars, value)?;
      vars
        .declare(name, value)
        .map_err(|e| scope_error(e, stmt.span))?;
      Ok(Flow::Next(Value::Null))
    }
    StmtKind::Assign { name, value } => {
      let value = eval_expr(vars, value)?;
      vars
        .assign(name, value)
        .map_err(|e| scope_error(e, stmt.span))?;
      Ok(Flow::Next(Value::Null))
    }
    StmtKind::FunctionDefinition { name, params, body } => {
      let func = define_function(vars, name, params, body);
      vars
        .declare(name, Value::Function(func))
        .map_err(|e| scope_error(e, stmt.span))?;
      Ok(Flow::Next(Value::Null))
    }
    StmtKind::Return(expr) => Ok(Flow::Return(eval_expr(vars, expr)?)),
    StmtKind::Expr(expr) => Ok(Flow::Next(eval_expr(vars, expr)?)),
    StmtKind::Print { .. } => Err(top_level_only("print", stmt.span)),
    StmtKind::Graph { .. } => Err(top_level_only("graph", stmt.span)),
    StmtKind::Plot { .. } => Err(top_level_only("plot", stmt.span)),
    StmtKind::Slider { .. } => Err(top_level_only("slider", stmt.span)),
  }
}

fn top_level_only(what: &str, span: Span) -> EvalError {
  EvalError::at(
    format!("{what} is only allowed at the top level of a program"),
    span,
  )
}

fn define_function(
  vars: &VariableStack,
  name: &str,
  params: &[String],
  body: &Rc<Block>,
) -> Rc<FunctionValue> {
  Rc::new(FunctionValue {
    name: name.to_string(),
    args: params.to_vec(),
    captures: vars.visible(),
    body: Rc::clone(body),
  })
}

/// Declare the captures of `func` in the innermost frame of `vars`.
///
/// Captures named like one of the function's parameters are skipped; the
/// parameter binding shadows them.
pub fn bind_captures(
  vars: &mut VariableStack,
  func: &FunctionValue,
) -> Result<(), EvalError> {
  for (name, value) in &func.captures {
    if func.args.iter().any(|arg| arg == name) {
      continue;
    }
    vars
      .declare(name, value.clone())
      .map_err(|e| EvalError::new(e.to_string()))?;
  }
  Ok(())
}

fn call_function(
  vars: &mut VariableStack,
  func: &FunctionValue,
  args: &[f64],
) -> Result<Value, EvalError> {
  if args.len() != func.args.len() {
    return Err(EvalError::new(format!(
      "{} expects {} argument{}; {} given",
      func.name,
      func.args.len(),
      if func.args.len() == 1 { "" } else { "s" },
      args.len()
    )));
  }

  let mut frame = vars.enter_frame();
  bind_captures(&mut frame, func)?;
  for (param, arg) in func.args.iter().zip(args) {
    frame
      .declare(param, Value::Number(*arg))
      .map_err(|e| EvalError::new(e.to_string()))?;
  }
  match run_block(&mut frame, &func.body)? {
    Flow::Next(value) | Flow::Return(value) => Ok(value),
  }
}

fn eval_expr(vars: &mut VariableStack, expr: &Expr) -> Result<Value, EvalError> {
  match expr {
    Expr::Number { value, .. } => Ok(Value::Number(*value)),
    Expr::Identifier { name, span } => match vars.get(name) {
      Some(Value::Error(err)) => Err(err.clone()),
      Some(value) => Ok(value.clone()),
      None => Err(EvalError::at(format!("undefined variable '{name}'"), *span)),
    },
    Expr::Negate { operand, .. } => Ok(Value::Number(-eval_number(vars, operand)?)),
    Expr::BinaryOp {
      op,
      left,
      right,
      span,
    } => {
      let lhs = eval_number(vars, left)?;
      let rhs = eval_number(vars, right)?;
      apply_binary(*op, lhs, rhs)
        .map(Value::Number)
        .map_err(|message| EvalError::at(message, *span))
    }
    Expr::Call { name, args, span } => eval_call(vars, name, args, *span),
  }
}

fn eval_number(vars: &mut VariableStack, expr: &Expr) -> Result<f64, EvalError> {
  match eval_expr(vars, expr)? {
    Value::Number(n) => Ok(n),
    Value::Error(err) => Err(err),
    Value::Function(func) => Err(EvalError::at(
      format!("function '{}' cannot be used as a number", func.name),
      expr.span(),
    )),
    Value::Null => Err(EvalError::at("expected a number, got null", expr.span())),
  }
}

fn apply_binary(op: BinaryOperator, lhs: f64, rhs: f64) -> Result<f64, String> {
  match op {
    BinaryOperator::Plus => Ok(lhs + rhs),
    BinaryOperator::Minus => Ok(lhs - rhs),
    BinaryOperator::Times => Ok(lhs * rhs),
    BinaryOperator::Divide if rhs == 0.0 => Err("division by zero".into()),
    BinaryOperator::Divide => Ok(lhs / rhs),
    BinaryOperator::Remainder if rhs == 0.0 => Err("remainder by zero".into()),
    BinaryOperator::Remainder => Ok(lhs % rhs),
    BinaryOperator::Power => Ok(lhs.powf(rhs)),
  }
}

fn eval_call(
  vars: &mut VariableStack,
  name: &str,
  args: &[Expr],
  span: Span,
) -> Result<Value, EvalError> {
  let callee = vars.get(name).cloned();
  if let Some(Value::Error(err)) = callee {
    return Err(err);
  }
  if matches!(callee, Some(Value::Number(_) | Value::Null)) {
    return Err(EvalError::at(format!("'{name}' is not a function"), span));
  }

  let mut values = Vec::with_capacity(args.len());
  for arg in args {
    values.push(eval_number(vars, arg)?);
  }

  match callee {
    Some(Value::Function(func)) => {
      call_function(vars, &func, &values).map_err(|e| e.or_at(span))
    }
    _ => match builtins::call_builtin(name, &values) {
      Some(Ok(n)) => Ok(Value::Number(n)),
      Some(Err(message)) => Err(EvalError::at(message, span)),
      None => Err(EvalError::at(format!("undefined function '{name}'"), span)),
    },
  }
}

/// A `graph` statement whose functions and domain resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
  pub functions: Vec<Rc<FunctionValue>>,
  pub domain: DomainInterval,
}

impl GraphRequest {
  pub fn names(&self) -> Vec<&str> {
    self.functions.iter().map(|f| f.name.as_str()).collect()
  }
}

/// Side results of a program, in statement order.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramResult {
  Print {
    title: Option<String>,
    value: Value,
  },
  Plot {
    lists: Result<Vec<PointSequence>, EvalError>,
  },
  Graph {
    request: Result<GraphRequest, EvalError>,
  },
}

/// Everything a program run produced.
#[derive(Debug, Clone)]
pub struct ProgramContext {
  /// Program source, used to quote the code an error came from.
  pub text: String,
  pub variables: VariableStack,
  pub results: Vec<ProgramResult>,
  pub errors: Vec<EvalError>,
  /// Sliders declared by the program, in statement order.
  pub inputs: Vec<ProgramInput>,
  /// Sliders of a previous run whose values carry over by name.
  carried: Vec<ProgramInput>,
  /// Value of the last expression statement (or top-level `return`).
  pub program_result: Value,
}

impl ProgramContext {
  pub fn new(text: &str) -> Self {
    Self::with_inputs(text, Vec::new())
  }

  /// Like [`ProgramContext::new`], but `slider` statements start from the
  /// value of the same-named input in `carried` instead of their minimum.
  pub fn with_inputs(text: &str, carried: Vec<ProgramInput>) -> Self {
    let mut variables = VariableStack::new();
    for (name, value) in builtins::CONSTANTS {
      let declared = variables.declare(name, Value::Number(value));
      debug_assert!(declared.is_ok(), "constant {name} declared twice");
    }
    // User declarations live one frame up so they may shadow constants.
    variables.push_frame();

    ProgramContext {
      text: text.to_string(),
      variables,
      results: Vec::new(),
      errors: Vec::new(),
      inputs: Vec::new(),
      carried,
      program_result: Value::Null,
    }
  }

  /// Execute the top-level statements of `program`.
  ///
  /// Evaluation errors do not abort the run: they are recorded in
  /// `errors`, and a failed declaration still binds its name to the error
  /// so later uses report the same failure.
  pub fn run(&mut self, program: &Block) {
    debug!(statements = program.statements.len(), "running program");

    for stmt in &program.statements {
      trace!(line = stmt.span.line, "statement");
      match &stmt.kind {
        StmtKind::Print { value, title } => {
          let value = Value::from(eval_expr(&mut self.variables, value));
          self.results.push(ProgramResult::Print {
            title: title.clone(),
            value,
          });
        }
        StmtKind::Graph {
          functions,
          start,
          end,
        } => {
          let request = self.graph_request(functions, start, end);
          self.results.push(ProgramResult::Graph { request });
        }
        StmtKind::Plot { lists } => {
          let lists = self.point_lists(lists, stmt.span);
          self.results.push(ProgramResult::Plot { lists });
        }
        StmtKind::Slider {
          name,
          min,
          max,
          step,
        } => {
          let result = self.slider(name, min, max, step.as_ref(), stmt.span);
          let value = self.record(result);
          if let Err(err) = self.variables.declare(name, value) {
            self.errors.push(scope_error(err, stmt.span));
          }
        }
        StmtKind::Let { name, value } | StmtKind::Assign { name, value } => {
          let result = eval_expr(&mut self.variables, value);
          let value = self.record(result);
          let bound = if matches!(stmt.kind, StmtKind::Let { .. }) {
            self.variables.declare(name, value)
          } else {
            self.variables.assign(name, value)
          };
          if let Err(err) = bound {
            self.errors.push(scope_error(err, stmt.span));
          }
        }
        StmtKind::Return(expr) => {
          let result = eval_expr(&mut self.variables, expr);
          self.program_result = self.record(result);
          break;
        }
        StmtKind::Expr(expr) => {
          let result = eval_expr(&mut self.variables, expr);
          self.program_result = self.record(result);
        }
        StmtKind::FunctionDefinition { .. } => {
          if let Err(err) = exec_stmt(&mut self.variables, stmt) {
            self.errors.push(err);
          }
        }
      }
    }
  }

  fn record(&mut self, result: Result<Value, EvalError>) -> Value {
    let value = Value::from(result);
    if let Value::Error(err) = &value {
      self.errors.push(err.clone());
    }
    value
  }

  fn slider(
    &mut self,
    name: &str,
    min: &Expr,
    max: &Expr,
    step: Option<&Expr>,
    span: Span,
  ) -> Result<Value, EvalError> {
    let min = eval_number(&mut self.variables, min)?;
    let max = eval_number(&mut self.variables, max)?;
    let step = match step {
      Some(step) => eval_number(&mut self.variables, step)?,
      None => inputs::DEFAULT_STEP,
    };
    let mut input =
      ProgramInput::new(name, min, max, step).map_err(|e| EvalError::at(e, span))?;
    if let Some(previous) = self.carried.iter().find(|i| i.name == name) {
      input.set_value(previous.value());
    }
    debug!(input = %input, "slider");
    let value = Value::Number(input.value());
    self.inputs.push(input);
    Ok(value)
  }

  fn graph_request(
    &mut self,
    functions: &[(String, Span)],
    start: &Expr,
    end: &Expr,
  ) -> Result<GraphRequest, EvalError> {
    let functions = functions
      .iter()
      .map(|(name, span)| match self.variables.get(name) {
        Some(Value::Function(func)) => Ok(Rc::clone(func)),
        Some(Value::Error(err)) => Err(err.clone()),
        Some(_) => Err(EvalError::at(format!("'{name}' is not a function"), *span)),
        None => Err(EvalError::at(format!("undefined function '{name}'"), *span)),
      })
      .collect::<Result<Vec<_>, _>>()?;

    let start_value = eval_number(&mut self.variables, start)?;
    let end_value = eval_number(&mut self.variables, end)?;
    let domain = DomainInterval::new(start_value, end_value)
      .map_err(|e| EvalError::at(e.to_string(), start.span().to(end.span())))?;

    Ok(GraphRequest { functions, domain })
  }

  fn point_lists(
    &mut self,
    lists: &[Vec<Expr>],
    span: Span,
  ) -> Result<Vec<PointSequence>, EvalError> {
    let mut sequences = Vec::with_capacity(lists.len());
    for list in lists {
      let mut values = Vec::with_capacity(list.len());
      for expr in list {
        values.push(eval_number(&mut self.variables, expr)?);
      }
      let sequence =
        PointSequence::new(values).map_err(|e| EvalError::at(e.to_string(), span))?;
      sequences.push(sequence);
    }
    Ok(sequences)
  }
}
