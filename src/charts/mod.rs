//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, ThemeKind, ViewOptions};
pub use renderer::StaticChartRenderer;
