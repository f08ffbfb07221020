use std::fmt;

use crate::value::format_number;

/// Step used when a `slider` statement gives none.
pub const DEFAULT_STEP: f64 = 0.001;

/// A numeric slider declared by a `slider` statement.
///
/// The value always lies on the grid `min + k * step` inside `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInput {
  pub name: String,
  pub min: f64,
  pub max: f64,
  pub step: f64,
  value: f64,
}

impl ProgramInput {
  /// Create a slider resting at `min`. Fails on an empty or non-finite
  /// range, or a step that is not a positive number.
  pub fn new(name: &str, min: f64, max: f64, step: f64) -> Result<Self, String> {
    if !min.is_finite() || !max.is_finite() {
      return Err(format!(
        "slider {name} needs finite bounds, got {} to {}",
        format_number(min),
        format_number(max)
      ));
    }
    if min > max {
      return Err(format!(
        "slider {name} has an empty range: {} to {}",
        format_number(min),
        format_number(max)
      ));
    }
    if !step.is_finite() || step <= 0.0 {
      return Err(format!(
        "slider {name} needs a positive step, got {}",
        format_number(step)
      ));
    }
    Ok(ProgramInput {
      name: name.to_string(),
      min,
      max,
      step,
      value: min,
    })
  }

  pub fn value(&self) -> f64 {
    self.value
  }

  /// Move the slider to the grid position nearest `value` and return the
  /// value it settled on. Non-finite values leave it where it is.
  pub fn set_value(&mut self, value: f64) -> f64 {
    if value.is_finite() {
      self.value = self.snap(value);
    }
    self.value
  }

  fn snap(&self, value: f64) -> f64 {
    let steps = ((value - self.min) / self.step).round();
    let snapped = self.min + steps * self.step;
    if snapped > self.max {
      // Step back onto the grid when the range is not a whole number of steps.
      let last = ((self.max - self.min) / self.step).floor();
      self.min + last * self.step
    } else {
      snapped.max(self.min)
    }
  }
}

impl fmt::Display for ProgramInput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} = {} ({} to {}, step {})",
      self.name,
      format_number(self.value),
      format_number(self.min),
      format_number(self.max),
      format_number(self.step)
    )
  }
}
