//! Control Panel Widget
//! Left side panel with workbook selection, the simulation slider, view
//! options, and export actions.

use crate::charts::{ThemeKind, ViewOptions};
use crate::data::schema::{MULTIPLIER_MAX, MULTIPLIER_MIN, MULTIPLIER_STEP};
use egui::{Color32, RichText, Slider};
use std::path::PathBuf;

/// User-tunable dashboard state.
#[derive(Clone)]
pub struct ViewSettings {
    pub workbook_path: Option<PathBuf>,
    pub multiplier: f64,
    pub year_min: i64,
    pub year_max: i64,
    pub log_salary_axis: bool,
    pub log_roi_axis: bool,
    pub show_trend: bool,
    pub theme: ThemeKind,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            workbook_path: None,
            multiplier: 1.0,
            year_min: 2018,
            year_max: 2030,
            log_salary_axis: true,
            log_roi_axis: true,
            show_trend: true,
            theme: ThemeKind::Contrast,
        }
    }
}

impl ViewSettings {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            year_min: self.year_min,
            year_max: self.year_max,
            log_salary_axis: self.log_salary_axis,
            log_roi_axis: self.log_roi_axis,
            show_trend: self.show_trend,
            theme: self.theme,
        }
    }
}

/// Left side control panel with workbook selection and simulation controls.
pub struct ControlPanel {
    pub settings: ViewSettings,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: ViewSettings::default(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Fiscalens")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Fiscal Workbook Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Workbook Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .workbook_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No workbook selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.workbook_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseWorkbook;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Simulation Section =====
        ui.label(RichText::new("🎚 Simulation").size(14.0).strong());
        ui.add_space(5.0);

        let slider = Slider::new(
            &mut self.settings.multiplier,
            MULTIPLIER_MIN..=MULTIPLIER_MAX,
        )
        .step_by(MULTIPLIER_STEP)
        .fixed_decimals(1)
        .text("x");
        if ui.add(slider).changed() {
            action = ControlPanelAction::MultiplierChanged;
        }

        let (mode_text, mode_color) = if self.settings.multiplier < 1.0 {
            ("Mode: Lemah", Color32::from_rgb(220, 53, 69))
        } else if (self.settings.multiplier - 1.0).abs() < f64::EPSILON {
            ("Mode: Normal", Color32::GRAY)
        } else {
            ("Mode: Agresif", Color32::from_rgb(40, 167, 69))
        };
        ui.label(
            RichText::new(format!("{} ({:.1}x)", mode_text, self.settings.multiplier))
                .size(12.0)
                .color(mode_color),
        );

        ui.add_space(8.0);
        if ui.button("↺ Reset Simulation").clicked() {
            action = ControlPanelAction::ResetSimulation;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== View Options Section =====
        ui.label(RichText::new("🔧 View Options").size(14.0).strong());
        ui.add_space(8.0);

        ui.add(
            Slider::new(&mut self.settings.year_min, 2010..=2030).text("From year"),
        );
        ui.add(
            Slider::new(&mut self.settings.year_max, 2010..=2035).text("To year"),
        );
        if self.settings.year_max < self.settings.year_min {
            self.settings.year_max = self.settings.year_min;
        }

        ui.add_space(5.0);
        ui.checkbox(&mut self.settings.log_salary_axis, "Log axis: salary gap");
        ui.checkbox(&mut self.settings.log_roi_axis, "Log axis: ROI");
        ui.checkbox(&mut self.settings.show_trend, "Benchmark trend line");

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label("Emphasis:");
            ui.radio_value(&mut self.settings.theme, ThemeKind::Contrast, "Contrast");
            ui.radio_value(&mut self.settings.theme, ThemeKind::Muted, "Muted");
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let report_button =
                    egui::Button::new(RichText::new("📄 Export Report (PPTX)").size(14.0))
                        .min_size(egui::vec2(200.0, 30.0));
                if ui.add(report_button).clicked() {
                    action = ControlPanelAction::ExportReport;
                }

                ui.add_space(6.0);

                let json_button =
                    egui::Button::new(RichText::new("🗎 Export Data (JSON)").size(14.0))
                        .min_size(egui::vec2(200.0, 30.0));
                if ui.add(json_button).clicked() {
                    action = ControlPanelAction::ExportJson;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Progress").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseWorkbook,
    MultiplierChanged,
    ResetSimulation,
    ExportReport,
    ExportJson,
}
