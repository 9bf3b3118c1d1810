//! Solar Dashboard Main Application
//! Main window with navigation panel and result viewer.

use crate::charts::ChartRenderer;
use crate::config::DashboardConfig;
use crate::dashboard::{self, Analysis};
use crate::data::{DataLoader, TableCache};
use crate::gui::{NavigationAction, NavigationPanel, ResultViewer};
use anyhow::Context;
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Size of exported PNG images
const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 1000;

/// CSV loading result from background thread
enum LoadResult {
    Complete {
        path: PathBuf,
        table: Arc<DataFrame>,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    cache: Arc<TableCache>,
    table: Option<Arc<DataFrame>>,
    navigation: NavigationPanel,
    viewer: ResultViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            navigation: NavigationPanel::new(&config.data_path, config.row_cap),
            viewer: ResultViewer::new(&config.site_label),
            cache: Arc::new(TableCache::new()),
            table: None,
            config,
            load_rx: None,
            is_loading: false,
        };
        let path = app.config.data_path.clone();
        app.start_load(path);
        app
    }

    /// Load a CSV file in a background thread through the shared cache.
    fn start_load(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }

        self.navigation.set_status(format!("Loading {}...", path.display()));
        self.navigation.data_path = path.clone();
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cache = Arc::clone(&self.cache);
        let row_cap = self.config.row_cap;
        thread::spawn(move || {
            let result = match cache.get_or_load(&path, row_cap) {
                Ok(table) => LoadResult::Complete { path, table },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { path, table }) => {
                let rows = DataLoader::get_row_count(&table);
                let columns = DataLoader::get_columns(&table).len();
                self.config = self.config.with_data_path(path);
                self.navigation.row_count = Some(rows);
                self.navigation
                    .set_status(format!("Loaded {} rows, {} columns", rows, columns));
                self.table = Some(table);
                self.is_loading = false;
                self.run_selected();
            }
            Ok(LoadResult::Error(error)) => {
                log::error!("Loading failed: {}", error);
                self.navigation.set_error(error);
                self.navigation.row_count = None;
                self.table = None;
                self.viewer.clear();
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                self.navigation.set_error("loader thread stopped unexpectedly");
                self.is_loading = false;
            }
        }
    }

    /// Handle CSV file selection
    fn handle_open_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            // Re-opening the same file reads it fresh from disk.
            self.cache.invalidate(&path, self.config.row_cap);
            self.viewer.clear();
            self.navigation.export_enabled = false;
            self.start_load(path);
        }
    }

    /// Run the selected analysis against the loaded table.
    fn run_selected(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        let analysis: Analysis = self.navigation.selected;

        match dashboard::run(analysis, &table, &self.config) {
            Ok(output) => {
                self.navigation.export_enabled = output.chart().is_some();
                self.viewer.set_output(analysis, output);
            }
            Err(e) => {
                log::error!("{} failed: {}", analysis.label(), e);
                self.navigation.export_enabled = false;
                self.navigation.set_error(e.to_string());
                self.viewer.set_error(analysis, e.to_string());
            }
        }
    }

    /// Handle PNG export of the displayed chart
    fn handle_export_png(&mut self) {
        let Some(chart) = self.viewer.output().and_then(|o| o.chart()).cloned() else {
            self.navigation.set_status("No chart to export");
            return;
        };

        let file_name = format!(
            "{}.png",
            self.viewer.analysis().label().to_lowercase().replace(' ', "_")
        );
        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(file_name)
            .save_file()
        else {
            return; // User cancelled
        };

        match Self::export_png(&chart, &output_path) {
            Ok(()) => {
                log::info!("Exported chart to {}", output_path.display());
                self.navigation
                    .set_status(format!("Exported {}", output_path.display()));
                if let Err(e) = open::that(&output_path) {
                    log::warn!("Could not open {}: {}", output_path.display(), e);
                }
            }
            Err(e) => {
                log::error!("Export failed: {:#}", e);
                self.navigation.set_error(format!("{:#}", e));
            }
        }
    }

    fn export_png(chart: &crate::charts::Chart, path: &Path) -> anyhow::Result<()> {
        let bytes = ChartRenderer::render_png(chart, EXPORT_WIDTH, EXPORT_HEIGHT)
            .context("rendering chart")?;
        fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Navigation
        SidePanel::left("navigation_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.navigation.show(ui) {
                        NavigationAction::OpenCsv => self.handle_open_csv(),
                        NavigationAction::AnalysisChanged => self.run_selected(),
                        NavigationAction::ExportPng => self.handle_export_png(),
                        NavigationAction::None => {}
                    }
                });
            });

        // Central panel - Result Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(ui);
        });
    }
}
