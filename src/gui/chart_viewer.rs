//! Chart Viewer Widget
//! Central scrollable dashboard: three sections of chart cards driven by the
//! loaded bundle and its simulated counterpart.

use egui::{Color32, RichText, ScrollArea};
use polars::prelude::DataFrame;

use crate::charts::{ChartPlotter, ViewOptions};
use crate::data::DataBundle;

const CARD_SPACING: f32 = 15.0;

/// Dashboard chapter selected by the tab row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardSection {
    Burden,
    Diagnostics,
    Projection,
}

impl DashboardSection {
    const ALL: [DashboardSection; 3] = [
        DashboardSection::Burden,
        DashboardSection::Diagnostics,
        DashboardSection::Projection,
    ];

    fn label(&self) -> &'static str {
        match self {
            DashboardSection::Burden => "Beban Negara",
            DashboardSection::Diagnostics => "Diagnostik",
            DashboardSection::Projection => "Proyeksi",
        }
    }
}

/// Scrollable dashboard area.
pub struct ChartViewer {
    pub section: DashboardSection,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            section: DashboardSection::Burden,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the section tabs and the active section's chart cards.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        bundle: Option<&DataBundle>,
        simulated: Option<&DataBundle>,
        multiplier: f64,
        opts: &ViewOptions,
    ) {
        let Some(bundle) = bundle else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data - load a workbook").size(20.0));
            });
            return;
        };

        ui.horizontal(|ui| {
            for section in DashboardSection::ALL {
                if ui
                    .selectable_label(self.section == section, section.label())
                    .clicked()
                {
                    self.section = section;
                }
            }
        });
        ui.add_space(8.0);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.section {
                DashboardSection::Burden => Self::show_burden(ui, bundle, opts),
                DashboardSection::Diagnostics => Self::show_diagnostics(ui, bundle, opts),
                DashboardSection::Projection => {
                    Self::show_projection(ui, bundle, simulated, multiplier, opts)
                }
            });
    }

    fn show_burden(ui: &mut egui::Ui, bundle: &DataBundle, opts: &ViewOptions) {
        Self::card(ui, "Populasi Lansia", |ui| {
            ChartPlotter::draw_elderly_line(ui, &bundle.elderly_correlation, opts);
        });
        Self::optional_card(
            ui,
            "Biaya Penyakit Katastropik",
            bundle.catastrophic_trend.as_ref(),
            |ui, df| ChartPlotter::draw_catastrophic_bar(ui, df, opts),
        );
        Self::optional_card(
            ui,
            "Beban Pensiun APBN",
            bundle.pension_trend.as_ref(),
            |ui, df| ChartPlotter::draw_pension_bar(ui, df, opts),
        );
        Self::card(ui, "Komparasi Gaji vs Subsidi", |ui| {
            ChartPlotter::draw_salary_gap_bar(ui, &bundle.salary_comparison, opts);
        });
        Self::card(ui, "Porsi Biaya BPJS", |ui| {
            ChartPlotter::draw_disease_pie(ui, &bundle.disease_share, opts);
        });
    }

    fn show_diagnostics(ui: &mut egui::Ui, bundle: &DataBundle, opts: &ViewOptions) {
        Self::card(ui, "Skor Indeks Korupsi", |ui| {
            ChartPlotter::draw_cpi_bar(ui, &bundle.elderly_correlation, opts);
        });
        Self::card(ui, "Benchmark Gaji vs CPI", |ui| {
            ChartPlotter::draw_benchmark_scatter(ui, &bundle.country_benchmark, opts);
        });
        Self::card(ui, "Beban Lansia vs Korupsi", |ui| {
            ChartPlotter::draw_elderly_cpi_dual(ui, &bundle.elderly_correlation, opts);
        });
    }

    fn show_projection(
        ui: &mut egui::Ui,
        bundle: &DataBundle,
        simulated: Option<&DataBundle>,
        multiplier: f64,
        opts: &ViewOptions,
    ) {
        let simulated = simulated.unwrap_or(bundle);

        Self::optional_card(
            ui,
            "Analisis Modal dan Penghematan",
            simulated.roi.as_ref(),
            |ui, df| ChartPlotter::draw_roi_bar(ui, df, opts),
        );
        Self::card(ui, "Target Gaji Baru", |ui| {
            ChartPlotter::draw_salary_target_bar(
                ui,
                &bundle.country_benchmark,
                &simulated.projection,
                multiplier,
                opts,
            );
        });
        Self::card(ui, "Proyeksi Gaji dan Kasus Korupsi", |ui| {
            ChartPlotter::draw_projection_chart(ui, &simulated.projection, opts);
        });
    }

    /// One chart card with title and body.
    fn card(ui: &mut egui::Ui, title: &str, body: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(70)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(title).size(16.0).strong());
                ui.add_space(6.0);
                body(ui);
            });
        ui.add_space(CARD_SPACING);
    }

    /// Card for a table that may be unavailable; draws the "no data" state
    /// instead of the chart when the sheet was absent from the workbook.
    fn optional_card(
        ui: &mut egui::Ui,
        title: &str,
        table: Option<&DataFrame>,
        body: impl FnOnce(&mut egui::Ui, &DataFrame),
    ) {
        Self::card(ui, title, |ui| match table {
            Some(df) => body(ui, df),
            None => {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("Data tidak tersedia")
                            .size(14.0)
                            .color(Color32::GRAY),
                    );
                });
                ui.add_space(20.0);
            }
        });
    }
}
