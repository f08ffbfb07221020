use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::syntax::{Block, Span};

/// An evaluation failure, carried as a value so it can flow through
/// variables and sampling loops.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EvalError {
  pub message: String,
  /// Source location of the node that failed, if known.
  pub span: Option<Span>,
}

impl EvalError {
  pub fn new(message: impl Into<String>) -> Self {
    EvalError {
      message: message.into(),
      span: None,
    }
  }

  pub fn at(message: impl Into<String>, span: Span) -> Self {
    EvalError {
      message: message.into(),
      span: Some(span),
    }
  }

  /// Attach `span` unless the error is already located.
  pub fn or_at(mut self, span: Span) -> Self {
    if self.span.is_none() {
      self.span = Some(span);
    }
    self
  }
}

/// A user-defined function closed over the variables visible at its
/// definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
  pub name: String,
  pub args: Vec<String>,
  /// Snapshot of captured variables, in declaration order.
  pub captures: Vec<(String, Value)>,
  pub body: Rc<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
  #[default]
  Null,
  Number(f64),
  Error(EvalError),
  Function(Rc<FunctionValue>),
}

impl Value {
  pub fn is_error(&self) -> bool {
    matches!(self, Value::Error(_))
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Value::Number(n)
  }
}

impl From<EvalError> for Value {
  fn from(err: EvalError) -> Self {
    Value::Error(err)
  }
}

impl<T: Into<Value>> From<Result<T, EvalError>> for Value {
  fn from(result: Result<T, EvalError>) -> Self {
    match result {
      Ok(v) => v.into(),
      Err(e) => Value::Error(e),
    }
  }
}

/// Render a number the way the output panel shows it: integers without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
  if n.is_nan() {
    "NaN".to_string()
  } else if n.is_infinite() {
    if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
  } else if n == n.trunc() && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    format!("{n}")
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "null"),
      Value::Number(n) => write!(f, "{}", format_number(*n)),
      Value::Error(err) => write!(f, "Error: {}", err.message),
      Value::Function(func) => {
        write!(f, "fn {}({})", func.name, func.args.join(", "))
      }
    }
  }
}
