use std::fmt;
use std::str::FromStr;

use plotters::coord::Shift;
use plotters::prelude::{
  DrawingArea, DrawingBackend, IntoFont, PathElement, RGBColor, Rectangle,
};
use plotters::style::Color as _;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};

use crate::PlotError;

/// An opaque RGB color, written as `#rrggbb` in theme files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl Color {
  pub const BLACK: Color = Color::rgb(0, 0, 0);
  pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
    Color { r, g, b }
  }

  /// `hue` in degrees, `saturation` and `lightness` in `0..=1`.
  pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
    let hue = hue.rem_euclid(360.0) / 60.0;
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
    let (r, g, b) = match hue as u8 {
      0 => (chroma, x, 0.0),
      1 => (x, chroma, 0.0),
      2 => (0.0, chroma, x),
      3 => (0.0, x, chroma),
      4 => (x, 0.0, chroma),
      _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::rgb(channel(r), channel(g), channel(b))
  }

  pub fn to_hex(self) -> String {
    format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
  }
}

impl FromStr for Color {
  type Err = String;

  /// Accepts `#rrggbb` and `#rgb`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || format!("invalid color '{s}', expected #rrggbb");
    let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(invalid());
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    match hex.len() {
      6 => Ok(Color::rgb(
        channel(&hex[0..2])?,
        channel(&hex[2..4])?,
        channel(&hex[4..6])?,
      )),
      3 => {
        let short = |i: usize| channel(&hex[i..=i].repeat(2));
        Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
      }
      _ => Err(invalid()),
    }
  }
}

impl TryFrom<String> for Color {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Color> for String {
  fn from(color: Color) -> Self {
    color.to_hex()
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl From<Color> for RGBColor {
  fn from(color: Color) -> Self {
    RGBColor(color.r, color.g, color.b)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
  #[default]
  Left,
  Center,
  Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
  pub size: f64,
  pub family: String,
  pub color: Color,
  pub align: TextAlign,
}

/// A 2D pixel surface with the origin at the top left.
pub trait Surface {
  /// Start a new frame of the given size, discarding the previous one.
  fn begin_frame(&mut self, width: f64, height: f64);
  fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color);
  /// Stroke one connected polyline.
  fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, width: f64);
  /// Draw `text` with its baseline at `y`.
  fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
  FillRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: Color,
  },
  StrokePath {
    points: Vec<(f64, f64)>,
    color: Color,
    width: f64,
  },
  Text {
    text: String,
    x: f64,
    y: f64,
    style: TextStyle,
  },
}

/// Retained surface: records the last frame so it can be inspected or
/// replayed onto another surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
  width: f64,
  height: f64,
  commands: Vec<DrawCommand>,
}

impl DisplayList {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn size(&self) -> (f64, f64) {
    (self.width, self.height)
  }

  pub fn commands(&self) -> &[DrawCommand] {
    &self.commands
  }

  /// Stroked polylines of the given color, in drawing order.
  pub fn paths_with_color(
    &self,
    wanted: Color,
  ) -> impl Iterator<Item = &[(f64, f64)]> + '_ {
    self.commands.iter().filter_map(move |command| match command {
      DrawCommand::StrokePath { points, color, .. } if *color == wanted => {
        Some(points.as_slice())
      }
      _ => None,
    })
  }

  pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
    self.commands.iter().filter_map(|command| match command {
      DrawCommand::Text { text, .. } => Some(text.as_str()),
      _ => None,
    })
  }

  pub fn replay<S: Surface>(&self, target: &mut S) {
    target.begin_frame(self.width, self.height);
    for command in &self.commands {
      match command {
        DrawCommand::FillRect {
          x,
          y,
          width,
          height,
          color,
        } => target.fill_rect(*x, *y, *width, *height, *color),
        DrawCommand::StrokePath {
          points,
          color,
          width,
        } => target.stroke_path(points, *color, *width),
        DrawCommand::Text { text, x, y, style } => {
          target.fill_text(text, *x, *y, style)
        }
      }
    }
  }
}

impl Surface for DisplayList {
  fn begin_frame(&mut self, width: f64, height: f64) {
    self.width = width;
    self.height = height;
    self.commands.clear();
  }

  fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
    self.commands.push(DrawCommand::FillRect {
      x,
      y,
      width,
      height,
      color,
    });
  }

  fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, width: f64) {
    self.commands.push(DrawCommand::StrokePath {
      points: points.to_vec(),
      color,
      width,
    });
  }

  fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
    self.commands.push(DrawCommand::Text {
      text: text.to_string(),
      x,
      y,
      style: style.clone(),
    });
  }
}

/// Draws onto a plotters drawing area, scaling every coordinate by
/// `scale`. Plotters works in integer pixels, so callers render at a
/// multiple of the target size and scale the result back down.
pub struct PlottersSurface<'a, DB: DrawingBackend> {
  area: &'a DrawingArea<DB, Shift>,
  scale: f64,
  font_scale: f64,
  error: Option<PlotError>,
}

impl<'a, DB: DrawingBackend> PlottersSurface<'a, DB> {
  pub fn new(area: &'a DrawingArea<DB, Shift>, scale: f64) -> Self {
    PlottersSurface {
      area,
      scale,
      font_scale: 1.0,
      error: None,
    }
  }

  /// Extra factor for font sizes, for backends that shrink the requested
  /// size when writing it out.
  pub fn with_font_scale(mut self, font_scale: f64) -> Self {
    self.font_scale = font_scale;
    self
  }

  fn px(&self, value: f64) -> i32 {
    (value * self.scale).round() as i32
  }

  fn record<E: fmt::Display>(&mut self, result: Result<(), E>) {
    if let Err(err) = result {
      if self.error.is_none() {
        self.error = Some(PlotError::RenderError(err.to_string()));
      }
    }
  }

  /// The first backend failure, if drawing hit one.
  pub fn finish(self) -> Result<(), PlotError> {
    self.error.map_or(Ok(()), Err)
  }
}

impl<DB: DrawingBackend> Surface for PlottersSurface<'_, DB> {
  fn begin_frame(&mut self, _width: f64, _height: f64) {}

  fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
    let rect = Rectangle::new(
      [(self.px(x), self.px(y)), (self.px(x + width), self.px(y + height))],
      RGBColor::from(color).filled(),
    );
    let result = self.area.draw(&rect);
    self.record(result);
  }

  fn stroke_path(&mut self, points: &[(f64, f64)], color: Color, width: f64) {
    let points: Vec<(i32, i32)> =
      points.iter().map(|&(x, y)| (self.px(x), self.px(y))).collect();
    let stroke = (width * self.scale).round().max(1.0) as u32;
    let path = PathElement::new(points, RGBColor::from(color).stroke_width(stroke));
    let result = self.area.draw(&path);
    self.record(result);
  }

  fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
    let h_pos = match style.align {
      TextAlign::Left => HPos::Left,
      TextAlign::Center => HPos::Center,
      TextAlign::Right => HPos::Right,
    };
    let size = style.size * self.scale * self.font_scale;
    let font = (style.family.as_str(), size)
      .into_font()
      .color(&RGBColor::from(style.color))
      .pos(Pos::new(h_pos, VPos::Bottom));
    let result = self.area.draw_text(text, &font, (self.px(x), self.px(y)));
    self.record(result);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hsl_primaries() {
    assert_eq!(Color::from_hsl(0.0, 1.0, 0.5), Color::rgb(255, 0, 0));
    assert_eq!(Color::from_hsl(120.0, 1.0, 0.5), Color::rgb(0, 255, 0));
    assert_eq!(Color::from_hsl(240.0, 1.0, 0.5), Color::rgb(0, 0, 255));
    assert_eq!(Color::from_hsl(0.0, 0.0, 1.0), Color::WHITE);
  }

  #[test]
  fn parses_hex_colors() {
    assert_eq!("#1e90ff".parse::<Color>(), Ok(Color::rgb(0x1e, 0x90, 0xff)));
    assert_eq!("#fff".parse::<Color>(), Ok(Color::WHITE));
    assert!("1e90ff".parse::<Color>().is_err());
    assert!("#12345g".parse::<Color>().is_err());
    assert_eq!(Color::rgb(1, 2, 255).to_hex(), "#0102ff");
  }

  #[test]
  fn display_list_replays_in_order() {
    let mut list = DisplayList::new();
    list.begin_frame(10.0, 5.0);
    list.fill_rect(0.0, 0.0, 10.0, 5.0, Color::WHITE);
    list.stroke_path(&[(0.0, 0.0), (1.0, 1.0)], Color::BLACK, 2.0);

    let mut copy = DisplayList::new();
    list.replay(&mut copy);
    assert_eq!(copy, list);

    list.begin_frame(3.0, 3.0);
    assert!(list.commands().is_empty());
    assert_eq!(list.size(), (3.0, 3.0));
  }
}
