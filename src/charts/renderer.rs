//! Static Chart Renderer
//! Draws chart descriptions into an in-memory bitmap with plotters.
//!
//! Layout:
//! 1. Chart title centered on top
//! 2. Panels on a grid (see `Chart::grid`), each with its own caption and axes
//!
//! Nothing is written to disk here; callers decide what to do with the pixels.

use crate::charts::{
    diverging_color, series_color, BarGroups, Chart, ChartPlotter, Heatmap, Layer, Panel, Series,
    WindRose,
};
use crate::stats::HistogramBin;
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use std::ops::Range;
use thiserror::Error;

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart has no panels")]
    Empty,
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Bitmap buffer has the wrong size")]
    Buffer,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn drawing_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn rgb(color: [u8; 3]) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Range padded by 5% on each side; degenerate ranges are widened by one.
fn padded(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if max <= min {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

fn series_bounds(series: &[Series]) -> (Range<f64>, Range<f64>) {
    let points = series.iter().flat_map(|s| s.points.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x_min = x_min.min(p[0]);
        x_max = x_max.max(p[0]);
        y_min = y_min.min(p[1]);
        y_max = y_max.max(p[1]);
    }
    (padded(x_min, x_max), padded(y_min, y_max))
}

/// Renders charts to bitmaps and PNG bytes.
pub struct ChartRenderer;

impl ChartRenderer {
    /// Render a chart into an RGB image of the requested size.
    pub fn render(chart: &Chart, width: u32, height: u32) -> Result<RgbImage, RenderError> {
        if chart.panels.is_empty() {
            return Err(RenderError::Empty);
        }

        let mut buffer = vec![255u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing_err)?;
            let body = root
                .titled(&chart.title, (FONT, 26))
                .map_err(drawing_err)?;

            let (rows, cols) = chart.grid();
            let areas = body.split_evenly((rows, cols));
            for (panel, area) in chart.panels.iter().zip(areas.iter()) {
                Self::draw_panel(area, panel)?;
            }
            root.present().map_err(drawing_err)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)
    }

    /// Render a chart and encode it as PNG.
    pub fn render_png(chart: &Chart, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let image = Self::render(chart, width, height)?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn draw_panel(area: &Area, panel: &Panel) -> Result<(), RenderError> {
        match &panel.layer {
            Layer::Lines(series) => Self::draw_series(area, panel, series, false),
            Layer::Areas(series) => Self::draw_series(area, panel, series, true),
            Layer::Scatter(series) => Self::draw_scatter(area, panel, series),
            Layer::Bars(bars) => Self::draw_bars(area, panel, bars),
            Layer::Histogram(bins) => Self::draw_histogram(area, panel, bins),
            Layer::Heatmap(heatmap) => Self::draw_heatmap(area, panel, heatmap),
            Layer::WindRose(rose) => Self::draw_wind_rose(area, panel, rose),
        }
    }

    fn draw_series(
        area: &Area,
        panel: &Panel,
        series: &[Series],
        filled: bool,
    ) -> Result<(), RenderError> {
        let (x_range, y_range) = series_bounds(series);
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing_err)?;

        let ticks = panel.x_ticks.clone().unwrap_or_default();
        let tick_label = |x: &f64| {
            let idx = x.round();
            if ticks.is_empty() || idx < 0.0 {
                format!("{:.0}", x)
            } else {
                ticks.get(idx as usize).cloned().unwrap_or_default()
            }
        };

        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .x_labels(5)
            .x_label_formatter(&tick_label)
            .draw()
            .map_err(drawing_err)?;

        for (i, s) in series.iter().enumerate() {
            let color = rgb(series_color(i));
            let points = s.points.iter().map(|p| (p[0], p[1]));
            let drawn = if filled {
                chart
                    .draw_series(
                        AreaSeries::new(points, 0.0, color.mix(0.3)).border_style(color),
                    )
                    .map_err(drawing_err)?
            } else {
                chart
                    .draw_series(LineSeries::new(points, &color))
                    .map_err(drawing_err)?
            };
            drawn
                .label(s.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_scatter(area: &Area, panel: &Panel, series: &[Series]) -> Result<(), RenderError> {
        let (x_range, y_range) = series_bounds(series);
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .draw()
            .map_err(drawing_err)?;

        for (i, s) in series.iter().enumerate() {
            let color = rgb(series_color(i));
            chart
                .draw_series(
                    s.points
                        .iter()
                        .map(|p| Circle::new((p[0], p[1]), 2, color.mix(0.7).filled())),
                )
                .map_err(drawing_err)?
                .label(s.name.as_str())
                .legend(move |(x, y)| Circle::new((x + 7, y), 3, color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_bars(area: &Area, panel: &Panel, bars: &BarGroups) -> Result<(), RenderError> {
        let n = bars.categories.len().max(1);
        let y_max = bars
            .groups
            .iter()
            .flat_map(|g| g.values.iter())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max);
        let y_min = bars
            .groups
            .iter()
            .flat_map(|g| g.values.iter())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::min);

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), padded(y_min, y_max))
            .map_err(drawing_err)?;

        let categories = &bars.categories;
        let category_label = |x: &f64| {
            let idx = x.round();
            if idx >= 0.0 && (x - idx).abs() < 1e-6 {
                categories.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&category_label)
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .draw()
            .map_err(drawing_err)?;

        let group_count = bars.groups.len().max(1);
        let bar_width = 0.8 / group_count as f64;
        for (g, group) in bars.groups.iter().enumerate() {
            let color = rgb(series_color(g));
            let offset = (g as f64 - (group_count as f64 - 1.0) / 2.0) * bar_width;
            chart
                .draw_series(
                    group
                        .values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| v.is_finite())
                        .map(|(i, &v)| {
                            let center = i as f64 + offset;
                            Rectangle::new(
                                [(center - bar_width / 2.0, 0.0), (center + bar_width / 2.0, v)],
                                color.filled(),
                            )
                        }),
                )
                .map_err(drawing_err)?
                .label(group.name.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_histogram(
        area: &Area,
        panel: &Panel,
        bins: &[HistogramBin],
    ) -> Result<(), RenderError> {
        let x_min = bins.first().map(|b| b.lower).unwrap_or(0.0);
        let x_max = bins.last().map(|b| b.upper).unwrap_or(1.0);
        let y_max = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(padded(x_min, x_max), 0.0..(y_max * 1.1).max(1.0))
            .map_err(drawing_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(panel.x_label.as_str())
            .y_desc(panel.y_label.as_str())
            .draw()
            .map_err(drawing_err)?;

        let color = rgb(series_color(0));
        chart
            .draw_series(bins.iter().map(|bin| {
                let (lower, upper) = if bin.upper > bin.lower {
                    (bin.lower, bin.upper)
                } else {
                    (bin.lower - 0.5, bin.upper + 0.5)
                };
                Rectangle::new([(lower, 0.0), (upper, bin.count as f64)], color.mix(0.8).filled())
            }))
            .map_err(drawing_err)?;
        Ok(())
    }

    fn draw_heatmap(area: &Area, panel: &Panel, heatmap: &Heatmap) -> Result<(), RenderError> {
        let n = heatmap.labels.len().max(1);
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 16))
            .margin(8)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..n as f64, 0.0..n as f64)
            .map_err(drawing_err)?;

        let labels = &heatmap.labels;
        let x_label = |x: &f64| {
            let idx = (x - 0.5).round();
            if idx >= 0.0 && (x - 0.5 - idx).abs() < 1e-6 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };
        // Row 0 sits at the top.
        let y_label = |y: &f64| {
            let idx = (y - 0.5).round();
            if idx >= 0.0 && (idx as usize) < n && (y - 0.5 - idx).abs() < 1e-6 {
                labels.get(n - 1 - idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(2 * n + 1)
            .y_labels(2 * n + 1)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .draw()
            .map_err(drawing_err)?;

        for (i, row) in heatmap.values.iter().enumerate() {
            let y = (n - 1 - i) as f64;
            chart
                .draw_series(row.iter().enumerate().map(|(j, &value)| {
                    let x = j as f64;
                    let fill = rgb(diverging_color(value)).filled();
                    Rectangle::new([(x, y), (x + 1.0, y + 1.0)], fill)
                }))
                .map_err(drawing_err)?;
            chart
                .draw_series(row.iter().enumerate().map(|(j, &value)| {
                    Text::new(
                        format!("{:.2}", value),
                        (j as f64 + 0.35, y + 0.55),
                        (FONT, 12).into_font(),
                    )
                }))
                .map_err(drawing_err)?;
        }
        Ok(())
    }

    fn draw_wind_rose(area: &Area, panel: &Panel, rose: &WindRose) -> Result<(), RenderError> {
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 16))
            .margin(8)
            .build_cartesian_2d(-1.25..1.25, -1.25..1.25)
            .map_err(drawing_err)?;

        let max = rose.max_sector();
        if max == 0 {
            return Ok(());
        }
        let scale = 1.0 / max as f64;

        for bin in 0..rose.speed_bins.len() {
            let color = rgb(series_color(bin));
            let mut wedges = Vec::new();
            for (sector, counts) in rose.counts.iter().enumerate() {
                let inner: usize = counts[..bin].iter().sum();
                let count = counts[bin];
                if count == 0 {
                    continue;
                }
                let points: Vec<(f64, f64)> = ChartPlotter::wedge(
                    sector as f64 * rose.sector_width,
                    rose.sector_width * 0.9,
                    inner as f64 * scale,
                    (inner + count) as f64 * scale,
                )
                .into_iter()
                .map(|p| (p[0], p[1]))
                .collect();
                wedges.push(Polygon::new(points, color.mix(0.8).filled()));
            }
            chart
                .draw_series(wedges)
                .map_err(drawing_err)?
                .label(rose.speed_bins[bin].as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        chart
            .draw_series(
                [("N", 0.0f64), ("E", 90.0), ("S", 180.0), ("W", 270.0)]
                    .into_iter()
                    .map(|(label, deg)| {
                        let rad = deg.to_radians();
                        let at = (1.12 * rad.sin() - 0.03, 1.12 * rad.cos() + 0.03);
                        Text::new(label, at, (FONT, 14).into_font())
                    }),
            )
            .map_err(drawing_err)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(drawing_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::BarGroup;

    #[test]
    fn test_empty_chart_is_rejected() {
        let chart = Chart::new("empty", Vec::new());
        assert!(matches!(
            ChartRenderer::render(&chart, 200, 100),
            Err(RenderError::Empty)
        ));
    }

    fn line(name: &str) -> Series {
        Series {
            name: name.to_string(),
            points: vec![[0.0, 1.0], [1.0, 3.0], [2.0, 2.0]],
        }
    }

    fn bin(lower: f64, upper: f64, count: usize) -> HistogramBin {
        HistogramBin {
            lower,
            upper,
            count,
        }
    }

    fn every_layer() -> Vec<Panel> {
        vec![
            Panel::new("lines", Layer::Lines(vec![line("GHI"), line("DNI")]))
                .with_x_ticks(vec!["t0".into(), "t1".into(), "t2".into()]),
            Panel::new("areas", Layer::Areas(vec![line("DHI")])),
            Panel::new("scatter", Layer::Scatter(vec![line("Tamb vs RH")])),
            Panel::new(
                "bars",
                Layer::Bars(BarGroups {
                    categories: vec!["ModA".into(), "ModB".into()],
                    groups: vec![
                        BarGroup {
                            name: "Not cleaned".into(),
                            values: vec![100.0, 90.0],
                        },
                        BarGroup {
                            name: "Cleaned".into(),
                            values: vec![120.0, f64::NAN],
                        },
                    ],
                }),
            ),
            Panel::new(
                "histogram",
                Layer::Histogram(vec![bin(0.0, 1.0, 3), bin(1.0, 2.0, 5)]),
            ),
            Panel::new(
                "heatmap",
                Layer::Heatmap(Heatmap {
                    labels: vec!["GHI".into(), "WS".into()],
                    values: vec![vec![1.0, -0.4], vec![-0.4, f64::NAN]],
                }),
            ),
            Panel::new(
                "wind rose",
                Layer::WindRose(WindRose {
                    sector_width: 90.0,
                    speed_bins: vec!["0-2".into(), ">=2".into()],
                    counts: vec![vec![2, 1], vec![0, 3], vec![1, 0], vec![0, 0]],
                }),
            ),
        ]
    }

    #[test]
    fn test_every_layer_renders_at_requested_size() {
        for panel in every_layer() {
            let title = panel.title.clone();
            let chart = Chart::new(title.clone(), vec![panel]);
            let image = ChartRenderer::render(&chart, 320, 240)
                .unwrap_or_else(|e| panic!("{} failed: {}", title, e));
            assert_eq!(image.dimensions(), (320, 240));
        }
    }

    #[test]
    fn test_grid_of_panels_encodes_png() {
        let chart = Chart::new("all layers", every_layer());
        let bytes = ChartRenderer::render_png(&chart, 900, 700).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_padded_range_widens_constant_values() {
        assert_eq!(padded(3.0, 3.0), 2.0..4.0);
        assert_eq!(padded(f64::INFINITY, f64::NEG_INFINITY), 0.0..1.0);
        let r = padded(0.0, 100.0);
        assert_eq!(r, -5.0..105.0);
    }

    #[test]
    fn test_series_bounds_cover_points() {
        let series = vec![Series {
            name: "GHI".to_string(),
            points: vec![[0.0, 10.0], [4.0, 30.0]],
        }];
        let (x, y) = series_bounds(&series);
        assert!(x.start < 0.0 && x.end > 4.0);
        assert!(y.start < 10.0 && y.end > 30.0);
    }
}
