use plotters::prelude::{IntoDrawingArea, SVGBackend};

use super::surface::{DisplayList, PlottersSurface};
use crate::PlotError;

/// Internal rendering resolution multiplier for sub-pixel precision.
/// Plotters maps to integer coordinates, so we render at a higher resolution
/// and scale down via SVG viewBox to get smooth curves.
pub const RESOLUTION_SCALE: u32 = 10;

/// The SVG backend writes `font-size` as the requested size divided by
/// this ratio.
const SVG_FONT_SIZE_RATIO: f64 = 1.24;

fn render_size(width: f64, height: f64) -> Result<(u32, u32, u32, u32), PlotError> {
  let too_large =
    || PlotError::RenderError(format!("surface too large to export: {width}x{height}"));
  let pixels = |v: f64| -> Result<u32, PlotError> {
    let v = v.round().max(1.0);
    if v > u32::MAX as f64 {
      return Err(too_large());
    }
    Ok(v as u32)
  };
  let svg_width = pixels(width)?;
  let svg_height = pixels(height)?;
  let render_width = svg_width.checked_mul(RESOLUTION_SCALE).ok_or_else(too_large)?;
  let render_height = svg_height.checked_mul(RESOLUTION_SCALE).ok_or_else(too_large)?;
  Ok((svg_width, svg_height, render_width, render_height))
}

/// Replay a rendered frame through the plotters SVG backend.
pub fn display_list_to_svg(list: &DisplayList) -> Result<String, PlotError> {
  let (width, height) = list.size();
  let (svg_width, svg_height, render_width, render_height) =
    render_size(width, height)?;

  let mut buf = String::new();
  {
    let root = SVGBackend::with_string(&mut buf, (render_width, render_height))
      .into_drawing_area();
    let mut surface = PlottersSurface::new(&root, RESOLUTION_SCALE as f64)
      .with_font_scale(SVG_FONT_SIZE_RATIO);
    list.replay(&mut surface);
    surface.finish()?;
    root
      .present()
      .map_err(|e| PlotError::RenderError(e.to_string()))?;
  }

  rewrite_svg_header(
    &mut buf,
    svg_width,
    svg_height,
    render_width,
    render_height,
  );
  Ok(buf)
}

/// Replace the opening `<svg ...` tag so the document displays at
/// `svg_width` x `svg_height` while keeping the high-resolution viewBox.
pub(crate) fn rewrite_svg_header(
  buf: &mut String,
  svg_width: u32,
  svg_height: u32,
  render_width: u32,
  render_height: u32,
) {
  if let Some(pos) = buf.find('>') {
    let new_header = format!(
      "<svg width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"xMidYMid meet\" xmlns=\"http://www.w3.org/2000/svg\"",
      svg_width, svg_height, render_width, render_height,
    );
    buf.replace_range(..pos, &new_header);
  }
}
