//! Chart description types shared by the interactive and static renderers.

use crate::stats::HistogramBin;
use serde::Serialize;

/// Series palette (RGB).
pub const PALETTE: [[u8; 3]; 10] = [
    [52, 152, 219],  // Blue
    [231, 76, 60],   // Red
    [46, 204, 113],  // Green
    [155, 89, 182],  // Purple
    [243, 156, 18],  // Orange
    [26, 188, 156],  // Teal
    [233, 30, 99],   // Pink
    [0, 188, 212],   // Cyan
    [255, 87, 34],   // Deep Orange
    [96, 125, 139],  // Blue Grey
];

pub fn series_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// Blue (-1) through white (0) to red (+1). NaN maps to light grey.
pub fn diverging_color(value: f64) -> [u8; 3] {
    if value.is_nan() {
        return [220, 220, 220];
    }
    let v = value.clamp(-1.0, 1.0);
    let fade = |channel: u8, t: f64| (255.0 + (channel as f64 - 255.0) * t).round() as u8;
    if v < 0.0 {
        let t = -v;
        [fade(59, t), fade(76, t), fade(192, t)]
    } else {
        [fade(180, v), fade(4, v), fade(38, v)]
    }
}

/// A named sequence of `[x, y]` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// Bars grouped by category, one value per group in each category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroups {
    pub categories: Vec<String>,
    pub groups: Vec<BarGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    pub name: String,
    /// Parallel to `BarGroups::categories`.
    pub values: Vec<f64>,
}

/// Square matrix with row/column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Counts per direction sector, stacked by speed bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindRose {
    /// Sector width in degrees; sector `i` is centred on `i * sector_width`.
    pub sector_width: f64,
    pub speed_bins: Vec<String>,
    /// `counts[sector][speed_bin]`
    pub counts: Vec<Vec<usize>>,
}

impl WindRose {
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Largest stacked sector count.
    pub fn max_sector(&self) -> usize {
        self.counts
            .iter()
            .map(|sector| sector.iter().sum::<usize>())
            .max()
            .unwrap_or(0)
    }
}

/// What a panel draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Layer {
    Lines(Vec<Series>),
    Areas(Vec<Series>),
    Scatter(Vec<Series>),
    Bars(BarGroups),
    Histogram(Vec<HistogramBin>),
    Heatmap(Heatmap),
    WindRose(WindRose),
}

/// One plot area of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Labels for integer x positions (e.g. timestamps by row).
    pub x_ticks: Option<Vec<String>>,
    pub layer: Layer,
}

impl Panel {
    pub fn new(title: impl Into<String>, layer: Layer) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            x_ticks: None,
            layer,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_x_ticks(mut self, ticks: Vec<String>) -> Self {
        self.x_ticks = Some(ticks);
        self
    }
}

/// Immutable chart description produced by the analyses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Chart {
    pub fn new(title: impl Into<String>, panels: Vec<Panel>) -> Self {
        Self {
            title: title.into(),
            panels,
        }
    }

    /// Grid used to lay out the panels: (rows, columns).
    pub fn grid(&self) -> (usize, usize) {
        let n = self.panels.len().max(1);
        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        (rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_fits_all_panels() {
        let panel = || Panel::new("p", Layer::Lines(Vec::new()));
        for n in 1..=12 {
            let chart = Chart::new("c", (0..n).map(|_| panel()).collect());
            let (rows, cols) = chart.grid();
            assert!(rows * cols >= n);
        }
        assert_eq!(Chart::new("c", vec![panel(), panel(), panel()]).grid(), (2, 2));
    }

    #[test]
    fn test_diverging_color_endpoints() {
        assert_eq!(diverging_color(0.0), [255, 255, 255]);
        assert_eq!(diverging_color(1.0), [180, 4, 38]);
        assert_eq!(diverging_color(-1.0), [59, 76, 192]);
    }
}
