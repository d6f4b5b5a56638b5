mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::Path;

use app::SheetPlotApp;
use config::{AppConfig, DEFAULT_DATASETS_DIR};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load(Path::new(DEFAULT_DATASETS_DIR));
    log::info!(
        "Datasets directory: {} ({} catalog entries)",
        config.datasets_dir.display(),
        config.catalog.entries().len()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sheet Plot – Spreadsheet Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(SheetPlotApp::new(config)))),
    )
}
