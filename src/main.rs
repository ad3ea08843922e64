//! Fiscalens - Fiscal Workbook Analysis & Interactive Chart Dashboard
//!
//! Loads a fixed Excel workbook of budget, demographic, and corruption-index
//! figures, normalizes it into a table bundle, and renders an interactive
//! dashboard with a slider-driven simulation multiplier.

mod charts;
mod data;
mod gui;
mod report;
mod stats;

use eframe::egui;
use gui::FiscalensApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Fiscalens"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Fiscalens",
        options,
        Box::new(|cc| Ok(Box::new(FiscalensApp::new(cc)))),
    )
}
