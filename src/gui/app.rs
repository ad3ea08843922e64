//! Fiscalens Main Application
//! Main window with control panel and dashboard viewer.

use crate::charts::StaticChartRenderer;
use crate::data::{apply_simulation, load_workbook, BundleCache, DataBundle};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::report::{ReportGenerator, ReportMeta};
use egui::SidePanel;
use log::{error, info};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

/// Workbook loading result from the background thread
enum LoadResult {
    Complete(DataBundle),
    Error(String),
}

/// Main application window.
pub struct FiscalensApp {
    cache: BundleCache,
    simulated: Option<Arc<DataBundle>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async workbook loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl FiscalensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            cache: BundleCache::new(),
            simulated: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle workbook selection - loading runs in the background.
    fn handle_browse_workbook(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Excel Workbook", &["xlsx"])
            .pick_file()
        {
            self.control_panel.settings.workbook_path = Some(path.clone());
            self.cache.set_source(path);
            self.simulated = None;
            self.start_load();
        }
    }

    /// Spawn the loader thread for the cache's current source.
    fn start_load(&mut self) {
        let Some(path) = self.cache.source().map(|p| p.to_path_buf()) else {
            self.control_panel.set_progress(0.0, "No workbook selected");
            return;
        };

        self.control_panel
            .set_progress(10.0, "Loading workbook...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match load_workbook(&path) {
                Ok(bundle) => LoadResult::Complete(bundle),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for workbook loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete(bundle) => {
                        let missing = [
                            bundle.roi.is_none(),
                            bundle.catastrophic_trend.is_none(),
                            bundle.pension_trend.is_none(),
                        ]
                        .iter()
                        .filter(|m| **m)
                        .count();

                        self.cache.store(bundle);
                        self.recompute_simulation();
                        let status = if missing > 0 {
                            format!("Loaded ({} optional tables unavailable)", missing)
                        } else {
                            "Loaded".to_string()
                        };
                        self.control_panel.set_progress(100.0, &status);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(message) => {
                        error!("workbook load failed: {}", message);
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", message));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Rebuild the simulated bundle for the current multiplier. The slider
    /// clamps to the valid range, so a transformer rejection here is a bug
    /// worth surfacing.
    fn recompute_simulation(&mut self) {
        let Some(bundle) = self.cache.get() else {
            self.simulated = None;
            return;
        };
        match apply_simulation(&bundle, self.control_panel.settings.multiplier) {
            Ok(simulated) => self.simulated = Some(Arc::new(simulated)),
            Err(e) => {
                error!("simulation rejected: {}", e);
                self.control_panel.set_progress(0.0, &format!("Error: {}", e));
                self.simulated = None;
            }
        }
    }

    /// Reset: multiplier back to neutral, cache invalidated, source reloaded.
    fn handle_reset(&mut self) {
        self.control_panel.settings.multiplier = 1.0;
        self.cache.invalidate();
        self.simulated = None;
        if self.cache.source().is_some() {
            info!("reset: reloading workbook");
            self.start_load();
        } else {
            self.control_panel.set_progress(0.0, "Ready");
        }
    }

    /// Render all charts and assemble the PPTX report. Goes through the cache
    /// so an invalidated-but-sourced session reloads instead of refusing.
    fn handle_export_report(&mut self) {
        let bundle = match self.cache.get_or_load() {
            Ok(bundle) => bundle,
            Err(e) => {
                self.control_panel.set_progress(0.0, &format!("Error: {}", e));
                return;
            }
        };
        let Some(simulated) = self.simulated.clone() else {
            self.control_panel.set_progress(0.0, "No data to export");
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PowerPoint", &["pptx"])
            .set_file_name("laporan_fiskal.pptx")
            .save_file()
        else {
            return; // User cancelled
        };

        self.control_panel.set_progress(20.0, "Rendering charts...");
        let opts = self.control_panel.settings.view_options();
        let multiplier = self.control_panel.settings.multiplier;

        let result = StaticChartRenderer::render_all(&bundle, &simulated, multiplier, &opts, 1400, 1000)
            .and_then(|images| {
                self.control_panel.set_progress(60.0, "Generating report...");
                ReportGenerator::generate_pptx(&images, &output_path, "Laporan Analisis Fiskal")
                    .map(|_| images.len())
            });

        match result {
            Ok(count) => {
                self.control_panel
                    .set_progress(100.0, &format!("Report exported ({} charts)", count));
                if let Err(e) = open::that(&output_path) {
                    info!("could not open exported report: {}", e);
                }
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    /// Dump normalized and simulated tables as JSON.
    fn handle_export_json(&mut self) {
        let bundle = match self.cache.get_or_load() {
            Ok(bundle) => bundle,
            Err(e) => {
                self.control_panel.set_progress(0.0, &format!("Error: {}", e));
                return;
            }
        };
        let Some(simulated) = self.simulated.clone() else {
            self.control_panel.set_progress(0.0, "No data to export");
            return;
        };

        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("data_fiskal.json")
            .save_file()
        else {
            return;
        };

        let meta = ReportMeta {
            source: self
                .cache
                .source()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            multiplier: self.control_panel.settings.multiplier,
        };

        match ReportGenerator::export_json(&bundle, &simulated, &meta, &output_path) {
            Ok(()) => {
                self.control_panel.set_progress(100.0, "Data exported");
            }
            Err(e) => {
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for FiscalensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        self.control_panel.export_enabled = self.cache.is_loaded() && self.simulated.is_some();

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseWorkbook => self.handle_browse_workbook(),
                        ControlPanelAction::MultiplierChanged => self.recompute_simulation(),
                        ControlPanelAction::ResetSimulation => self.handle_reset(),
                        ControlPanelAction::ExportReport => self.handle_export_report(),
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            let bundle = self.cache.get();
            let opts = self.control_panel.settings.view_options();
            self.chart_viewer.show(
                ui,
                bundle.as_deref(),
                self.simulated.as_deref(),
                self.control_panel.settings.multiplier,
                &opts,
            );
        });
    }
}
