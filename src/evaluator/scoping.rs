use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
  #[error("'{0}' is already declared in this scope")]
  Redeclared(String),
  #[error("undefined variable '{0}'")]
  Undefined(String),
}

/// Handle to a binding, valid until the frame that declared it is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotId(usize);

#[derive(Debug, Clone)]
struct Binding {
  name: String,
  value: Value,
}

/// Index-based stack of variable frames.
///
/// Bindings live in one flat vector; a frame is the index where it
/// starts. Lookups walk from the innermost binding outwards, so a
/// declaration in an inner frame shadows outer ones without touching them.
#[derive(Debug, Clone, Default)]
pub struct VariableStack {
  bindings: Vec<Binding>,
  frames: Vec<usize>,
}

impl VariableStack {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of frames pushed on top of the root frame.
  pub fn depth(&self) -> usize {
    self.frames.len()
  }

  /// Total number of live bindings across all frames.
  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }

  fn frame_start(&self) -> usize {
    self.frames.last().copied().unwrap_or(0)
  }

  pub fn push_frame(&mut self) {
    self.frames.push(self.bindings.len());
  }

  /// Drop the innermost frame and every binding declared in it. The root
  /// frame is never popped.
  pub fn pop_frame(&mut self) {
    if let Some(start) = self.frames.pop() {
      self.bindings.truncate(start);
    }
  }

  /// Push a frame that is popped again when the guard is dropped, on every
  /// exit path.
  pub fn enter_frame(&mut self) -> FrameGuard<'_> {
    let depth = self.depth();
    self.push_frame();
    FrameGuard { stack: self, depth }
  }

  /// Declare `name` in the innermost frame.
  pub fn declare(
    &mut self,
    name: &str,
    value: Value,
  ) -> Result<SlotId, ScopeError> {
    let start = self.frame_start();
    if self.bindings[start..].iter().any(|b| b.name == name) {
      return Err(ScopeError::Redeclared(name.to_string()));
    }
    self.bindings.push(Binding {
      name: name.to_string(),
      value,
    });
    Ok(SlotId(self.bindings.len() - 1))
  }

  fn position(&self, name: &str) -> Option<usize> {
    self.bindings.iter().rposition(|b| b.name == name)
  }

  /// Overwrite the innermost visible binding of `name`.
  pub fn assign(
    &mut self,
    name: &str,
    value: Value,
  ) -> Result<SlotId, ScopeError> {
    let index = self
      .position(name)
      .ok_or_else(|| ScopeError::Undefined(name.to_string()))?;
    self.bindings[index].value = value;
    Ok(SlotId(index))
  }

  /// Overwrite a binding in place through its handle. Stale handles (whose
  /// frame was popped) are ignored.
  pub fn set_slot(&mut self, slot: SlotId, value: Value) {
    if let Some(binding) = self.bindings.get_mut(slot.0) {
      binding.value = value;
    }
  }

  pub fn slot(&self, slot: SlotId) -> Option<&Value> {
    self.bindings.get(slot.0).map(|b| &b.value)
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.position(name).map(|i| &self.bindings[i].value)
  }

  /// Innermost binding of every visible name, in declaration order.
  pub fn visible(&self) -> Vec<(String, Value)> {
    self
      .bindings
      .iter()
      .enumerate()
      .filter(|(i, b)| self.position(&b.name) == Some(*i))
      .map(|(_, b)| (b.name.clone(), b.value.clone()))
      .collect()
  }
}

/// A frame on a [`VariableStack`] that unwinds itself when dropped.
pub struct FrameGuard<'a> {
  stack: &'a mut VariableStack,
  depth: usize,
}

impl Deref for FrameGuard<'_> {
  type Target = VariableStack;

  fn deref(&self) -> &VariableStack {
    self.stack
  }
}

impl DerefMut for FrameGuard<'_> {
  fn deref_mut(&mut self) -> &mut VariableStack {
    self.stack
  }
}

impl Drop for FrameGuard<'_> {
  fn drop(&mut self) {
    while self.stack.depth() > self.depth {
      self.stack.pop_frame();
    }
  }
}
