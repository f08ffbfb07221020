//! Function sampling and chart rendering.

pub mod chart;
pub mod export;
pub mod geometry;
pub mod graph_svg;
pub mod renderer;
pub mod sampler;
pub mod surface;

pub use chart::{ChartSource, ChartView, GraphChart, PlotChart};
pub use geometry::{Bounds, PointSequence, RenderState};
pub use renderer::{PathRenderer, RenderOptions};
pub use sampler::{DomainInterval, sample_function};
pub use surface::{Color, DisplayList, Surface};
