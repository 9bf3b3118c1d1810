//! Solar Data Analysis Dashboard
//!
//! Desktop viewer for the site analyses. An optional JSON config path may be
//! passed as the first argument.

use eframe::egui;
use solar_dashboard::config::DashboardConfig;
use solar_dashboard::gui::DashboardApp;
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match DashboardConfig::load_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}; using default settings", e);
            DashboardConfig::default()
        }
    };

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Solar Data Analysis Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Solar Data Analysis Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
