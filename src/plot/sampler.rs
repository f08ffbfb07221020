use tracing::{debug, warn};

use super::geometry::{PointSequence, lerp};
use crate::PlotError;
use crate::evaluator::{BlockEvaluator, VariableStack, bind_captures};
use crate::value::{EvalError, FunctionValue, Value, format_number};

/// Closed interval of function arguments; both ends are finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainInterval {
  start: f64,
  end: f64,
}

impl DomainInterval {
  pub fn new(start: f64, end: f64) -> Result<Self, PlotError> {
    if !(start.is_finite() && end.is_finite()) {
      return Err(PlotError::NonFiniteDomain { start, end });
    }
    Ok(DomainInterval { start, end })
  }

  pub fn start(&self) -> f64 {
    self.start
  }

  pub fn end(&self) -> f64 {
    self.end
  }

  pub fn span(&self) -> f64 {
    self.end - self.start
  }

  pub fn lerp(&self, t: f64) -> f64 {
    lerp(self.start, self.end, t)
  }

  /// The same interval moved by `offset`.
  pub fn shifted(&self, offset: f64) -> Result<Self, PlotError> {
    Self::new(self.start + offset, self.end + offset)
  }
}

/// Evaluate `func` at `subdivisions + 1` evenly spaced points of
/// `interval`, both ends included.
///
/// Captures and the argument are declared in a frame of their own; every
/// sample runs in a fresh inner frame with the argument slot overwritten
/// in place. The first failing sample aborts and its error is returned.
/// All frames are popped again on every path.
pub fn sample_function<E: BlockEvaluator + ?Sized>(
  evaluator: &mut E,
  vars: &mut VariableStack,
  func: &FunctionValue,
  interval: DomainInterval,
  subdivisions: usize,
) -> Result<PointSequence, EvalError> {
  debug!(
    function = %func.name,
    start = interval.start,
    end = interval.end,
    subdivisions,
    "sampling function"
  );

  let Some(argument) = func.args.first() else {
    return Err(EvalError::new(format!(
      "cannot graph {}: it takes no arguments",
      func.name
    )));
  };

  let mut frame = vars.enter_frame();
  bind_captures(&mut frame, func)?;
  let slot = frame
    .declare(argument, Value::Number(interval.start))
    .map_err(|e| EvalError::new(e.to_string()))?;
  for extra in &func.args[1..] {
    frame
      .declare(extra, Value::Number(0.0))
      .map_err(|e| EvalError::new(e.to_string()))?;
  }

  let mut sequence = PointSequence::with_capacity(subdivisions + 1);
  for i in 0..=subdivisions {
    let t = if subdivisions == 0 {
      0.0
    } else {
      i as f64 / subdivisions as f64
    };
    let x = interval.lerp(t);
    frame.set_slot(slot, Value::Number(x));

    let result = {
      let mut sample_frame = frame.enter_frame();
      evaluator.evaluate_block(&mut sample_frame, &func.body)
    };

    match result {
      Value::Number(y) => sequence.push(x, y),
      Value::Error(err) => {
        warn!(function = %func.name, sample = i, x, error = %err, "sampling failed");
        return Err(err);
      }
      other => {
        return Err(EvalError::new(format!(
          "{} returned {other} at x = {}, expected a number",
          func.name,
          format_number(x)
        )));
      }
    }
  }
  Ok(sequence)
}
