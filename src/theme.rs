use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PlotError;
use crate::plot::geometry::DEFAULT_MIN_GRID_LINES;
use crate::plot::surface::{Color, TextAlign, TextStyle};

/// Colors and stroke settings shared by every chart.
///
/// Loaded from JSON; missing fields keep their defaults, e.g.
/// `{ "background": "#101010", "grid": { "min_lines": 8 } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
  pub background: Color,
  pub gridline: Color,
  pub foreground: Color,
  pub font_size: f64,
  pub font_family: String,
  pub path_width: f64,
  pub grid_width: f64,
  pub grid: GridOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
  /// A grid spacing only qualifies when it yields more lines than this.
  pub min_lines: usize,
}

impl Default for GridOptions {
  fn default() -> Self {
    GridOptions {
      min_lines: DEFAULT_MIN_GRID_LINES,
    }
  }
}

impl Default for Theme {
  fn default() -> Self {
    Theme {
      background: Color::WHITE,
      gridline: Color::rgb(0xcc, 0xcc, 0xcc),
      foreground: Color::BLACK,
      font_size: 14.0,
      font_family: "monospace".to_string(),
      path_width: 2.0,
      grid_width: 1.0,
      grid: GridOptions::default(),
    }
  }
}

impl Theme {
  pub fn from_json(json: &str) -> Result<Self, PlotError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, PlotError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json(&json)
  }

  pub fn label_style(&self, align: TextAlign) -> TextStyle {
    TextStyle {
      size: self.font_size,
      family: self.font_family.clone(),
      color: self.foreground,
      align,
    }
  }
}
