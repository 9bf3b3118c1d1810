//! Result Viewer Widget
//! Central scrollable panel showing the output of the selected analysis.

use crate::charts::ChartPlotter;
use crate::dashboard::{Analysis, AnalysisOutput};
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;

/// What the viewer currently holds.
enum ViewState {
    Empty,
    Output(AnalysisOutput),
    Error(String),
}

/// Displays tables and charts for one analysis at a time.
pub struct ResultViewer {
    analysis: Analysis,
    site: String,
    state: ViewState,
}

impl ResultViewer {
    pub fn new(site: &str) -> Self {
        Self {
            analysis: Analysis::default(),
            site: site.to_string(),
            state: ViewState::Empty,
        }
    }

    pub fn clear(&mut self) {
        self.state = ViewState::Empty;
    }

    pub fn set_output(&mut self, analysis: Analysis, output: AnalysisOutput) {
        self.analysis = analysis;
        self.state = ViewState::Output(output);
    }

    pub fn set_error(&mut self, analysis: Analysis, error: String) {
        self.analysis = analysis;
        self.state = ViewState::Error(error);
    }

    pub fn output(&self) -> Option<&AnalysisOutput> {
        match &self.state {
            ViewState::Output(output) => Some(output),
            _ => None,
        }
    }

    pub fn analysis(&self) -> Analysis {
        self.analysis
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let output = match &self.state {
            ViewState::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
                return;
            }
            ViewState::Error(error) => {
                ui.heading(self.analysis.label());
                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new(error)
                        .size(14.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                return;
            }
            ViewState::Output(output) => output,
        };

        ui.heading(format!("{} ({})", self.analysis.label(), self.site));
        ui.add_space(SECTION_SPACING);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match output {
                AnalysisOutput::Summary(summary) => {
                    ui.label(format!("{} rows", summary.row_count));
                    ui.add_space(5.0);
                    ChartPlotter::draw_summary_table(ui, summary);
                }
                AnalysisOutput::Missing(report) => {
                    ui.label(format!("{} rows", report.total_rows));
                    ui.add_space(5.0);
                    ChartPlotter::draw_missing_table(ui, report);
                }
                AnalysisOutput::Flags(flags) => ChartPlotter::draw_flag_table(ui, flags),
                AnalysisOutput::Cleaning { impact, chart } => {
                    ChartPlotter::draw_chart(ui, chart, "cleaning");
                    ui.add_space(SECTION_SPACING);
                    ui.label(RichText::new("Cleaned minus not cleaned").size(14.0).strong());
                    ui.add_space(5.0);
                    ChartPlotter::draw_cleaning_table(ui, impact);
                }
                AnalysisOutput::Chart(chart) => {
                    ChartPlotter::draw_chart(ui, chart, self.analysis.label());
                }
            });
    }
}
