//! Chart Plotter Module
//! Draws chart descriptions and result tables interactively using egui_plot.

use crate::analysis::cleaning::CleaningImpact;
use crate::analysis::quality::{FlagTable, MissingReport};
use crate::analysis::summary::{Statistic, SummaryResult};
use crate::charts::{
    diverging_color, series_color, BarGroups, Chart, Heatmap, Layer, Panel, WindRose,
};
use crate::stats::HistogramBin;
use egui::{Color32, RichText, ScrollArea, Stroke};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Points, Polygon,
    Text,
};

/// Highlight for significant p-values and flagged cells
pub const ALERT_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

const PANEL_SPACING: f32 = 12.0;
const SINGLE_PANEL_HEIGHT: f32 = 420.0;
const GRID_PANEL_HEIGHT: f32 = 260.0;

/// Flag tables longer than this are truncated on screen.
const MAX_TABLE_ROWS: usize = 500;

/// Creates interactive charts and tables with egui.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(rgb: [u8; 3]) -> Color32 {
        Color32::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    fn format_value(v: f64) -> String {
        if v.is_nan() {
            "NaN".to_string()
        } else {
            format!("{:.3}", v)
        }
    }

    /// Draw every panel of a chart, laid out on its grid.
    pub fn draw_chart(ui: &mut egui::Ui, chart: &Chart, id_salt: &str) {
        let (rows, cols) = chart.grid();
        let panel_width = (ui.available_width() / cols as f32 - PANEL_SPACING).max(200.0);
        let height = if rows == 1 {
            SINGLE_PANEL_HEIGHT
        } else {
            GRID_PANEL_HEIGHT
        };

        for row in 0..rows {
            ui.horizontal(|ui| {
                for col in 0..cols {
                    let idx = row * cols + col;
                    let Some(panel) = chart.panels.get(idx) else {
                        continue;
                    };
                    ui.vertical(|ui| {
                        ui.set_width(panel_width);
                        ui.label(RichText::new(&panel.title).size(14.0).strong());
                        let id = format!("{id_salt}_{idx}");
                        Self::draw_panel(ui, panel, &id, panel_width, height);
                    });
                    ui.add_space(PANEL_SPACING);
                }
            });
            ui.add_space(PANEL_SPACING);
        }
    }

    fn draw_panel(ui: &mut egui::Ui, panel: &Panel, id: &str, width: f32, height: f32) {
        let mut plot = Plot::new(id.to_string())
            .width(width)
            .height(height)
            .x_axis_label(panel.x_label.clone())
            .y_axis_label(panel.y_label.clone());

        if let Some(ticks) = panel.x_ticks.clone() {
            plot = plot.x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    ticks.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            });
        }

        match &panel.layer {
            Layer::Lines(series) | Layer::Areas(series) => {
                let filled = matches!(panel.layer, Layer::Areas(_));
                plot.legend(Legend::default()).show(ui, |plot_ui| {
                    for (i, s) in series.iter().enumerate() {
                        let mut line = Line::new(PlotPoints::new(s.points.clone()))
                            .name(&s.name)
                            .color(Self::color(series_color(i)))
                            .width(1.5);
                        if filled {
                            line = line.fill(0.0f32);
                        }
                        plot_ui.line(line);
                    }
                });
            }
            Layer::Scatter(series) => {
                plot.legend(Legend::default()).show(ui, |plot_ui| {
                    for (i, s) in series.iter().enumerate() {
                        plot_ui.points(
                            Points::new(PlotPoints::new(s.points.clone()))
                                .name(&s.name)
                                .color(Self::color(series_color(i)).gamma_multiply(0.7))
                                .radius(2.5),
                        );
                    }
                });
            }
            Layer::Bars(bars) => Self::draw_bars(ui, plot, bars),
            Layer::Histogram(bins) => {
                plot.show(ui, |plot_ui| Self::draw_histogram(plot_ui, bins));
            }
            Layer::Heatmap(heatmap) => Self::draw_heatmap(ui, plot, heatmap),
            Layer::WindRose(rose) => Self::draw_wind_rose(ui, plot, rose),
        }
    }

    fn draw_bars(ui: &mut egui::Ui, plot: Plot, bars: &BarGroups) {
        let categories = bars.categories.clone();
        let group_count = bars.groups.len().max(1);
        let bar_width = 0.8 / group_count as f64;

        plot.legend(Legend::default())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    categories.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (g, group) in bars.groups.iter().enumerate() {
                    let offset = (g as f64 - (group_count as f64 - 1.0) / 2.0) * bar_width;
                    let items: Vec<Bar> = group
                        .values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| !v.is_nan())
                        .map(|(i, &v)| Bar::new(i as f64 + offset, v).width(bar_width * 0.95))
                        .collect();
                    plot_ui.bar_chart(
                        BarChart::new(items)
                            .name(&group.name)
                            .color(Self::color(series_color(g))),
                    );
                }
            });
    }

    fn draw_histogram(plot_ui: &mut PlotUi, bins: &[HistogramBin]) {
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                let width = if bin.upper > bin.lower {
                    bin.upper - bin.lower
                } else {
                    1.0
                };
                Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64).width(width)
            })
            .collect();
        plot_ui.bar_chart(BarChart::new(bars).color(Self::color(series_color(0))));
    }

    fn centered_marks(n: usize) -> Vec<GridMark> {
        (0..n)
            .map(|i| GridMark {
                value: i as f64 + 0.5,
                step_size: 1.0,
            })
            .collect()
    }

    fn draw_heatmap(ui: &mut egui::Ui, plot: Plot, heatmap: &Heatmap) {
        let n = heatmap.labels.len();
        let x_labels = heatmap.labels.clone();
        let y_labels = heatmap.labels.clone();

        plot.data_aspect(1.0)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .x_grid_spacer(move |_input| Self::centered_marks(n))
            .y_grid_spacer(move |_input| Self::centered_marks(n))
            .x_axis_formatter(move |mark, _range| {
                let idx = (mark.value - 0.5).round();
                if idx >= 0.0 {
                    x_labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(move |mark, _range| {
                // Row 0 is drawn at the top.
                let idx = (mark.value - 0.5).round();
                if idx >= 0.0 && (idx as usize) < n {
                    y_labels[n - 1 - idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, row) in heatmap.values.iter().enumerate() {
                    let y = (n - 1 - i) as f64;
                    for (j, &value) in row.iter().enumerate() {
                        let x = j as f64;
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(vec![
                                [x, y],
                                [x + 1.0, y],
                                [x + 1.0, y + 1.0],
                                [x, y + 1.0],
                            ]))
                            .fill_color(Self::color(diverging_color(value)))
                            .stroke(Stroke::new(0.5, Color32::WHITE)),
                        );
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(x + 0.5, y + 0.5),
                                RichText::new(format!("{:.2}", value)).size(10.0),
                            )
                            .color(Color32::BLACK),
                        );
                    }
                }
            });
    }

    /// Unit-radius wedge points for one stacked segment; 0° points up, clockwise.
    pub fn wedge(center_deg: f64, width_deg: f64, inner: f64, outer: f64) -> Vec<[f64; 2]> {
        const STEPS: usize = 8;
        let start = center_deg - width_deg / 2.0;
        let at = |r: f64, deg: f64| {
            let rad = deg.to_radians();
            [r * rad.sin(), r * rad.cos()]
        };

        let mut points: Vec<[f64; 2]> = (0..=STEPS)
            .map(|k| at(outer, start + width_deg * k as f64 / STEPS as f64))
            .collect();
        points.extend(
            (0..=STEPS)
                .rev()
                .map(|k| at(inner, start + width_deg * k as f64 / STEPS as f64)),
        );
        points
    }

    fn draw_wind_rose(ui: &mut egui::Ui, plot: Plot, rose: &WindRose) {
        let max = rose.max_sector();
        if max == 0 {
            ui.label(RichText::new("No wind readings").color(Color32::GRAY));
            return;
        }
        let scale = 1.0 / max as f64;

        plot.legend(Legend::default())
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .include_x(-1.2)
            .include_x(1.2)
            .include_y(-1.2)
            .include_y(1.2)
            .show(ui, |plot_ui| {
                for (sector, counts) in rose.counts.iter().enumerate() {
                    let center = sector as f64 * rose.sector_width;
                    let mut inner = 0.0;
                    for (bin, &count) in counts.iter().enumerate() {
                        if count == 0 {
                            continue;
                        }
                        let outer = inner + count as f64 * scale;
                        let color = Self::color(series_color(bin));
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(Self::wedge(
                                center,
                                rose.sector_width * 0.9,
                                inner,
                                outer,
                            )))
                            .fill_color(color.gamma_multiply(0.8))
                            .stroke(Stroke::new(0.5, color))
                            .name(&rose.speed_bins[bin]),
                        );
                        inner = outer;
                    }
                }

                for (label, deg) in [("N", 0.0f64), ("E", 90.0), ("S", 180.0), ("W", 270.0)] {
                    let rad = deg.to_radians();
                    plot_ui.text(Text::new(
                        PlotPoint::new(1.1 * rad.sin(), 1.1 * rad.cos()),
                        RichText::new(label).strong(),
                    ));
                }
            });
    }

    /// Summary statistics laid out like a describe() table: statistics as rows.
    pub fn draw_summary_table(ui: &mut egui::Ui, summary: &SummaryResult) {
        ScrollArea::horizontal().id_salt("summary_scroll").show(ui, |ui| {
            egui::Grid::new("summary_table")
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label("");
                    for column in &summary.columns {
                        ui.label(RichText::new(&column.column).strong());
                    }
                    ui.end_row();

                    for statistic in Statistic::ALL {
                        ui.label(RichText::new(statistic.label()).strong());
                        for column in &summary.columns {
                            let text = match statistic {
                                Statistic::Count => column.stats.count.to_string(),
                                _ => Self::format_value(column.get(statistic)),
                            };
                            ui.label(text);
                        }
                        ui.end_row();
                    }
                });
        });
    }

    pub fn draw_missing_table(ui: &mut egui::Ui, report: &MissingReport) {
        egui::Grid::new("missing_table")
            .striped(true)
            .min_col_width(80.0)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Column").strong());
                ui.label(RichText::new("Missing").strong());
                ui.label(RichText::new("Percentage").strong());
                ui.end_row();

                for entry in &report.columns {
                    let color = if entry.count > 0 {
                        ALERT_COLOR
                    } else {
                        ui.visuals().text_color()
                    };
                    ui.label(&entry.column);
                    ui.label(RichText::new(entry.count.to_string()).color(color));
                    ui.label(RichText::new(format!("{:.2}%", entry.percentage)).color(color));
                    ui.end_row();
                }
            });
    }

    pub fn draw_flag_table(ui: &mut egui::Ui, flags: &FlagTable) {
        if flags.is_empty() {
            ui.label(RichText::new("No rows flagged").color(Color32::from_rgb(40, 167, 69)));
            return;
        }

        let shown = flags.frame.height().min(MAX_TABLE_ROWS);
        ui.label(format!(
            "{} flagged values in {} rows{}",
            flags.len(),
            flags.rows().len(),
            if shown < flags.frame.height() {
                format!(" (showing first {shown})")
            } else {
                String::new()
            }
        ));
        ui.add_space(5.0);

        ScrollArea::both().id_salt("flag_scroll").show(ui, |ui| {
            egui::Grid::new("flag_table")
                .striped(true)
                .spacing([10.0, 3.0])
                .show(ui, |ui| {
                    for column in flags.frame.get_columns() {
                        ui.label(RichText::new(column.name().as_str()).strong());
                    }
                    ui.end_row();

                    for row in 0..shown {
                        let flagged = flags.entries.get(row).map(|e| e.column.as_str());
                        for column in flags.frame.get_columns() {
                            let text = column
                                .get(row)
                                .map(|v| v.to_string().trim_matches('"').to_string())
                                .unwrap_or_default();
                            if Some(column.name().as_str()) == flagged {
                                ui.label(RichText::new(text).color(ALERT_COLOR).strong());
                            } else {
                                ui.label(text);
                            }
                        }
                        ui.end_row();
                    }
                });
        });
    }

    pub fn draw_cleaning_table(ui: &mut egui::Ui, impact: &CleaningImpact) {
        egui::Grid::new("cleaning_table")
            .striped(true)
            .min_col_width(70.0)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Column").strong());
                ui.label(RichText::new("Mean (not cleaned)").strong());
                ui.label(RichText::new("Mean (cleaned)").strong());
                ui.label(RichText::new("Δ mean").strong());
                ui.label(RichText::new("Δ std").strong());
                ui.label(RichText::new("Δ median").strong());
                ui.label(RichText::new("P-value").strong());
                ui.end_row();

                let default_text_color = ui.visuals().text_color();
                for delta in &impact.deltas {
                    let before = impact.uncleaned.get(&delta.column, Statistic::Mean);
                    let after = impact.cleaned.get(&delta.column, Statistic::Mean);

                    ui.label(&delta.column);
                    ui.label(Self::format_value(before.unwrap_or(f64::NAN)));
                    ui.label(Self::format_value(after.unwrap_or(f64::NAN)));
                    for statistic in [Statistic::Mean, Statistic::Std, Statistic::Median] {
                        ui.label(Self::format_value(delta.delta(statistic).unwrap_or(f64::NAN)));
                    }
                    match delta.ttest {
                        Some(t) => {
                            let color = if t.is_significant {
                                ALERT_COLOR
                            } else {
                                default_text_color
                            };
                            ui.label(RichText::new(format!("{:.4}", t.p_value)).color(color));
                        }
                        None => {
                            ui.label("-");
                        }
                    }
                    ui.end_row();
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wedge_points_up_for_north() {
        let points = ChartPlotter::wedge(0.0, 20.0, 0.0, 1.0);
        let mid = points[4];
        assert!(mid[0].abs() < 1e-12);
        assert!((mid[1] - 1.0).abs() < 1e-12);
        assert_eq!(points.len(), 18);
    }

    #[test]
    fn test_wedge_east_is_positive_x() {
        let points = ChartPlotter::wedge(90.0, 20.0, 0.5, 1.0);
        assert!((points[4][0] - 1.0).abs() < 1e-12);
        assert!(points[4][1].abs() < 1e-12);
    }
}
