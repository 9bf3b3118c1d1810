//! Charts module - Chart descriptions and rendering

mod model;
mod plotter;
mod renderer;

pub use model::{
    diverging_color, series_color, BarGroup, BarGroups, Chart, Heatmap, Layer, Panel, Series,
    WindRose, PALETTE,
};
pub use plotter::ChartPlotter;
pub use renderer::{ChartRenderer, RenderError};
