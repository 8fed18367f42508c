#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    planboard_timeline::logging::init_logging();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    tracing::info!(?path, "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Planboard Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Planboard Timeline",
        options,
        Box::new(move |cc| Ok(Box::new(app::TimelineApp::new(cc, path)))),
    )
}
