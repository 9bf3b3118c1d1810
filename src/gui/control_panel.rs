//! Navigation Panel Widget
//! Left side panel with the data source, the analysis menu and the export button.

use crate::dashboard::Analysis;
use egui::{Color32, RichText};
use std::path::{Path, PathBuf};

/// Left side navigation panel.
pub struct NavigationPanel {
    pub data_path: PathBuf,
    pub row_cap: Option<usize>,
    pub row_count: Option<usize>,
    pub selected: Analysis,
    pub status: String,
    pub is_error: bool,
    pub export_enabled: bool,
}

impl NavigationPanel {
    pub fn new(data_path: &Path, row_cap: Option<usize>) -> Self {
        Self {
            data_path: data_path.to_path_buf(),
            row_cap,
            row_count: None,
            selected: Analysis::default(),
            status: "Ready".to_string(),
            is_error: false,
            export_enabled: false,
        }
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> NavigationAction {
        let mut action = NavigationAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("☀ Solar Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(255, 165, 0)),
            );
            ui.label(
                RichText::new("Data quality & descriptive analysis")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let file_name = self
                        .data_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(file_name).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Open CSV…").clicked() {
                            action = NavigationAction::OpenCsv;
                        }
                    });
                });

                let cap = match self.row_cap {
                    Some(cap) => format!("first {} rows", cap),
                    None => "all rows".to_string(),
                };
                let loaded = match self.row_count {
                    Some(n) => format!("{} rows loaded ({})", n, cap),
                    None => format!("not loaded ({})", cap),
                };
                ui.label(RichText::new(loaded).size(11.0).color(Color32::GRAY));
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Analysis Menu =====
        ui.label(RichText::new("📊 Select Analysis").size(14.0).strong());
        ui.add_space(5.0);

        for analysis in Analysis::ALL {
            if ui
                .radio_value(&mut self.selected, analysis, analysis.label())
                .changed()
            {
                action = NavigationAction::AnalysisChanged;
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = NavigationAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.is_error = false;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.status = format!("Error: {}", error.into());
        self.is_error = true;
    }
}

/// Actions triggered by the navigation panel
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationAction {
    None,
    OpenCsv,
    AnalysisChanged,
    ExportPng,
}
