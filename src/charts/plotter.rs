//! Chart Plotter Module
//! Creates the interactive dashboard charts using egui_plot.

use egui::{Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};
use polars::prelude::*;

use crate::data::schema::col as cols;
use crate::stats::StatsCalculator;

/// Color emphasis selected in the control panel. `Contrast` is the loud
/// magenta-on-dark palette; `Muted` is the toned-down alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Contrast,
    Muted,
}

pub struct Theme {
    pub emphasis: Color32,
    pub positive: Color32,
    pub neutral: Color32,
    pub series: [Color32; 5],
}

const CONTRAST: Theme = Theme {
    emphasis: Color32::from_rgb(255, 0, 85),
    positive: Color32::from_rgb(0, 255, 159),
    neutral: Color32::from_rgb(74, 144, 226),
    series: [
        Color32::from_rgb(255, 158, 181),
        Color32::from_rgb(255, 112, 150),
        Color32::from_rgb(255, 64, 121),
        Color32::from_rgb(255, 0, 85),
        Color32::from_rgb(120, 120, 130),
    ],
};

const MUTED: Theme = Theme {
    emphasis: Color32::from_rgb(231, 76, 60),
    positive: Color32::from_rgb(46, 204, 113),
    neutral: Color32::from_rgb(52, 152, 219),
    series: [
        Color32::from_rgb(52, 152, 219),
        Color32::from_rgb(46, 204, 113),
        Color32::from_rgb(155, 89, 182),
        Color32::from_rgb(243, 156, 18),
        Color32::from_rgb(26, 188, 156),
    ],
};

impl Theme {
    pub fn of(kind: ThemeKind) -> &'static Theme {
        match kind {
            ThemeKind::Contrast => &CONTRAST,
            ThemeKind::Muted => &MUTED,
        }
    }

    pub fn series_color(&self, idx: usize) -> Color32 {
        self.series[idx % self.series.len()]
    }
}

/// Chart-facing view options picked in the control panel.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub year_min: i64,
    pub year_max: i64,
    pub log_salary_axis: bool,
    pub log_roi_axis: bool,
    pub show_trend: bool,
    pub theme: ThemeKind,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            year_min: 2018,
            year_max: 2030,
            log_salary_axis: true,
            log_roi_axis: true,
            show_trend: true,
            theme: ThemeKind::Contrast,
        }
    }
}

/// Indonesian short-scale label for a full-rupiah amount.
pub fn format_rupiah(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.1} T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.1} M", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1} Juta", value / 1e6)
    } else {
        format!("{:.0}", value)
    }
}

/// Rows of (year, value) from a table, nulls skipped pairwise.
pub(crate) fn year_values(df: &DataFrame, value_column: &str) -> Vec<(i64, f64)> {
    let Ok(years) = df.column(cols::TAHUN).and_then(|c| c.cast(&DataType::Int64)) else {
        return Vec::new();
    };
    let Ok(values) = df
        .column(value_column)
        .and_then(|c| c.cast(&DataType::Float64))
    else {
        return Vec::new();
    };
    let (Ok(years), Ok(values)) = (years.i64(), values.f64()) else {
        return Vec::new();
    };
    years
        .into_iter()
        .zip(values)
        .filter_map(|(y, v)| Some((y?, v?)))
        .collect()
}

/// Rows of (label, value) from a table, nulls skipped pairwise.
pub(crate) fn labeled_values(df: &DataFrame, key_column: &str, value_column: &str) -> Vec<(String, f64)> {
    let Ok(values) = df
        .column(value_column)
        .and_then(|c| c.cast(&DataType::Float64))
    else {
        return Vec::new();
    };
    let Ok(values) = values.f64() else {
        return Vec::new();
    };
    let Ok(keys) = df.column(key_column) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(df.height());
    for (i, value) in values.into_iter().enumerate() {
        let (Some(value), Ok(key)) = (value, keys.get(i)) else {
            continue;
        };
        if key.is_null() {
            continue;
        }
        let label = key.to_string().trim_matches('"').to_string();
        out.push((label, value));
    }
    out
}

/// Value for one label, exact match.
pub(crate) fn value_for(df: &DataFrame, key_column: &str, key: &str, value_column: &str) -> Option<f64> {
    labeled_values(df, key_column, value_column)
        .into_iter()
        .find(|(label, _)| label == key)
        .map(|(_, v)| v)
}

/// Keep rows inside the selected year window.
pub(crate) fn filter_years(df: &DataFrame, year_min: i64, year_max: i64) -> DataFrame {
    df.clone()
        .lazy()
        .filter(
            col(cols::TAHUN)
                .gt_eq(lit(year_min))
                .and(col(cols::TAHUN).lt_eq(lit(year_max))),
        )
        .collect()
        .unwrap_or_else(|_| df.clone())
}

fn remap(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    if (from.1 - from.0).abs() < f64::EPSILON {
        return to.0;
    }
    to.0 + (value - from.0) / (from.1 - from.0) * (to.1 - to.0)
}

/// Creates the dashboard charts. Every function tolerates empty extraction
/// results; "table unavailable" handling happens in the viewer before these
/// are called.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Elderly population line, restricted to the selected year window.
    pub fn draw_elderly_line(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let filtered = filter_years(df, opts.year_min, opts.year_max);
        let rows = year_values(&filtered, cols::LANSIA_JUTA);

        let points: PlotPoints = rows.iter().map(|&(y, v)| [y as f64, v]).collect();
        Plot::new("elderly_line")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_label("Juta jiwa")
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(points)
                        .color(theme.emphasis)
                        .width(3.0)
                        .name("Jumlah Lansia"),
                );
                let markers: PlotPoints = rows.iter().map(|&(y, v)| [y as f64, v]).collect();
                plot_ui.points(Points::new(markers).radius(5.0).color(theme.emphasis));
            });
    }

    /// Catastrophic health cost per year, in trillions.
    pub fn draw_catastrophic_bar(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let rows = year_values(df, cols::BIAYA);

        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, &(year, value))| {
                Bar::new(year as f64, value / 1e12)
                    .width(0.6)
                    .fill(theme.series_color(i))
                    .name(format!("{}", year))
            })
            .collect();

        Plot::new("catastrophic_bar")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_label("Triliun Rupiah")
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Biaya Katastropik"));
            });
    }

    /// Pension expenditure per year with the first-to-last rise annotated.
    pub fn draw_pension_bar(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let rows = year_values(df, cols::ANGGARAN_TRILIUN);
        let values: Vec<f64> = rows.iter().map(|&(_, v)| v).collect();
        let rise = StatsCalculator::percent_change(&values);

        let bars: Vec<Bar> = rows
            .iter()
            .map(|&(year, value)| {
                Bar::new(year as f64, value)
                    .width(1.0)
                    .fill(theme.emphasis)
                    .name(format!("{}", year))
            })
            .collect();

        Plot::new("pension_bar")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_label("Triliun Rupiah")
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Anggaran Pensiun"));
                if let (Some(rise), Some(&(year, value))) = (rise, rows.last()) {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(year as f64, value * 1.08),
                            RichText::new(format!("+{:.1}%", rise))
                                .size(14.0)
                                .strong()
                                .color(theme.emphasis),
                        )
                        .name("Kenaikan"),
                    );
                }
            });
    }

    /// Horizontal comparison of salary vs subsidy nominal amounts. The
    /// categories span four orders of magnitude, so a log axis is offered;
    /// linear keeps the honest proportions.
    pub fn draw_salary_gap_bar(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let mut rows = labeled_values(df, cols::KATEGORI, cols::NOMINAL);
        rows.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let log_axis = opts.log_salary_axis;

        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let magnitude = if log_axis { value.log10() } else { *value };
                Bar::new(i as f64, magnitude)
                    .width(0.6)
                    .fill(theme.series_color(i))
                    .name(format!("{}: {}", label, format_rupiah(*value)))
            })
            .collect();

        // Horizontal bars: the category index lives on the y axis, the
        // magnitude on x.
        let labels: Vec<String> = rows.iter().map(|(label, _)| label.clone()).collect();
        Plot::new("salary_gap_bar")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 0.05 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .x_axis_formatter(move |mark, _range| {
                if log_axis {
                    format_rupiah(10f64.powf(mark.value))
                } else {
                    format_rupiah(mark.value)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Nominal"));
            });
    }

    /// Disease cost share pie.
    pub fn draw_disease_pie(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let mut rows = labeled_values(df, cols::JENIS_PENYAKIT, cols::BIAYA_TRILIUN);
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let total: f64 = rows.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            ui.label("Tidak ada porsi biaya untuk digambar");
            return;
        }

        Plot::new("disease_pie")
            .height(260.0)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let mut start = -std::f64::consts::FRAC_PI_2;
                for (i, (label, value)) in rows.iter().enumerate() {
                    let sweep = value / total * std::f64::consts::TAU;
                    let steps = ((sweep / 0.05).ceil() as usize).max(3);
                    let mut points: Vec<[f64; 2]> = Vec::with_capacity(steps + 2);
                    points.push([0.0, 0.0]);
                    for s in 0..=steps {
                        let angle = start + sweep * s as f64 / steps as f64;
                        points.push([angle.cos(), angle.sin()]);
                    }
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(points))
                            .fill_color(theme.series_color(i).gamma_multiply(0.9))
                            .stroke(Stroke::new(1.0, Color32::BLACK))
                            .name(format!("{} ({:.0}%)", label, value / total * 100.0)),
                    );
                    start += sweep;
                }
            });
    }

    /// Corruption perception score per year.
    pub fn draw_cpi_bar(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let filtered = filter_years(df, opts.year_min, opts.year_max);
        let rows = year_values(&filtered, cols::SKOR_KORUPSI);

        let bars: Vec<Bar> = rows
            .iter()
            .map(|&(year, value)| {
                Bar::new(year as f64, value)
                    .width(0.6)
                    .fill(theme.emphasis)
                    .name(format!("{}", year))
            })
            .collect();

        Plot::new("cpi_bar")
            .height(260.0)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(100.0)
            .y_axis_label("Skor CPI")
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Skor Indeks Korupsi"));
            });
    }

    /// Official salary vs cleanliness score across countries, with a fitted
    /// trend line over every plotted country.
    pub fn draw_benchmark_scatter(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let salaries = labeled_values(df, cols::NEGARA, cols::GAJI_PEJABAT_MILIAR);
        let scores = labeled_values(df, cols::NEGARA, cols::SKOR_KEBERSIHAN);

        let mut rows: Vec<(String, f64, f64)> = Vec::new();
        for (country, salary) in &salaries {
            if let Some((_, score)) = scores.iter().find(|(c, _)| c == country) {
                rows.push((country.clone(), *salary, *score));
            }
        }

        let xs: Vec<f64> = rows.iter().map(|r| r.1).collect();
        let ys: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let trend = if opts.show_trend {
            StatsCalculator::linear_fit(&xs, &ys)
        } else {
            None
        };

        Plot::new("benchmark_scatter")
            .height(260.0)
            .allow_scroll(false)
            .include_y(0.0)
            .include_y(100.0)
            .x_axis_label("Gaji Pejabat (Miliar Rupiah)")
            .y_axis_label("Skor Kebersihan (CPI)")
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (i, (country, salary, score)) in rows.iter().enumerate() {
                    plot_ui.points(
                        Points::new(vec![[*salary, *score]])
                            .radius(6.0)
                            .color(theme.series_color(i))
                            .name(country),
                    );
                    plot_ui.text(Text::new(
                        PlotPoint::new(*salary, score + 4.0),
                        RichText::new(country.clone()).size(12.0),
                    ));
                }
                if let (Some(line), Some(x_max)) = (
                    trend,
                    xs.iter().cloned().reduce(f64::max),
                ) {
                    let points: PlotPoints =
                        vec![[0.0, line.at(0.0)], [x_max * 1.1, line.at(x_max * 1.1)]].into();
                    plot_ui.line(
                        Line::new(points)
                            .color(theme.neutral)
                            .width(2.0)
                            .style(egui_plot::LineStyle::dashed_loose())
                            .name("Tren"),
                    );
                }
            });
    }

    /// Elderly population against the corruption score on a remapped second
    /// scale. egui_plot has no twin axes, so the score series is projected
    /// into the population range and its own ticks are drawn on the right.
    pub fn draw_elderly_cpi_dual(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let filtered = filter_years(df, opts.year_min, opts.year_max);
        let elderly = year_values(&filtered, cols::LANSIA_JUTA);
        let scores = year_values(&filtered, cols::SKOR_KORUPSI);
        if elderly.is_empty() {
            ui.label("Tidak ada data pada rentang tahun ini");
            return;
        }

        let e_min = elderly.iter().map(|&(_, v)| v).fold(f64::INFINITY, f64::min);
        let e_max = elderly
            .iter()
            .map(|&(_, v)| v)
            .fold(f64::NEG_INFINITY, f64::max);
        let score_scale = (0.0, 100.0);
        let pop_scale = (e_min * 0.9, e_max * 1.1);

        let last_year = elderly.iter().map(|&(y, _)| y).max().unwrap_or(0);

        let pop_points: PlotPoints = elderly.iter().map(|&(y, v)| [y as f64, v]).collect();
        let score_points: PlotPoints = scores
            .iter()
            .map(|&(y, v)| [y as f64, remap(v, score_scale, pop_scale)])
            .collect();

        Plot::new("elderly_cpi_dual")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_label("Juta jiwa")
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(pop_points)
                        .color(theme.emphasis)
                        .width(3.0)
                        .name("Lansia (kiri)"),
                );
                plot_ui.line(
                    Line::new(score_points)
                        .color(theme.neutral)
                        .width(2.0)
                        .style(egui_plot::LineStyle::dashed_dense())
                        .name("CPI (kanan, 0-100)"),
                );
                for score in [0.0, 50.0, 100.0] {
                    plot_ui.text(Text::new(
                        PlotPoint::new(last_year as f64 + 0.4, remap(score, score_scale, pop_scale)),
                        RichText::new(format!("{:.0}", score))
                            .size(10.0)
                            .color(theme.neutral),
                    ));
                }
            });

        // Honest annotation: the on-screen correlation with its p-value, so
        // the two curves are not left to imply more than the data supports.
        let paired: Vec<(f64, f64)> = elderly
            .iter()
            .filter_map(|&(year, pop)| {
                scores
                    .iter()
                    .find(|&&(y, _)| y == year)
                    .map(|&(_, score)| (pop, score))
            })
            .collect();
        let xs: Vec<f64> = paired.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = paired.iter().map(|p| p.1).collect();
        match StatsCalculator::pearson(&xs, &ys) {
            Some(corr) => {
                let verdict = if corr.is_significant {
                    "signifikan"
                } else {
                    "tidak signifikan"
                };
                ui.label(
                    RichText::new(format!(
                        "Korelasi r = {:.2} (p = {:.3}, n = {}): {}",
                        corr.r, corr.p_value, corr.n, verdict
                    ))
                    .size(11.0)
                    .color(egui::Color32::GRAY),
                );
            }
            None => {
                ui.label(
                    RichText::new("Korelasi tidak dapat dihitung untuk rentang ini")
                        .size(11.0)
                        .color(egui::Color32::GRAY),
                );
            }
        }
    }

    /// ROI component amounts; the spread covers four orders of magnitude, so
    /// the log axis is on by default.
    pub fn draw_roi_bar(ui: &mut egui::Ui, df: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let rows = labeled_values(df, cols::KOMPONEN, cols::NOMINAL);
        let log_axis = opts.log_roi_axis;

        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let magnitude = if log_axis { value.max(1.0).log10() } else { *value };
                Bar::new(i as f64, magnitude)
                    .width(0.6)
                    .fill(match i {
                        0 => theme.emphasis,
                        1 => theme.positive,
                        _ => theme.neutral,
                    })
                    .name(format!("{}: {}", label, format_rupiah(*value)))
            })
            .collect();

        let labels: Vec<String> = rows.iter().map(|(label, _)| label.clone()).collect();
        Plot::new("roi_bar")
            .height(260.0)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 0.05 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(move |mark, _range| {
                if log_axis {
                    format_rupiah(10f64.powf(mark.value))
                } else {
                    format_rupiah(mark.value)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Nominal"));
            });
    }

    /// Current salary, simulated target, and the Singapore benchmark side by
    /// side, all in billions.
    pub fn draw_salary_target_bar(
        ui: &mut egui::Ui,
        benchmark: &DataFrame,
        simulated_projection: &DataFrame,
        multiplier: f64,
        opts: &ViewOptions,
    ) {
        let theme = Theme::of(opts.theme);
        let current = value_for(benchmark, cols::NEGARA, "Indonesia", cols::GAJI_PEJABAT_MILIAR);
        let singapore = value_for(benchmark, cols::NEGARA, "Singapura", cols::GAJI_PEJABAT_MILIAR);
        let target = year_values(simulated_projection, cols::PROYEKSI_GAJI_JUTA)
            .into_iter()
            .max_by_key(|&(year, _)| year)
            .map(|(_, juta)| juta / 1000.0);

        let mut entries: Vec<(String, f64, Color32)> = Vec::new();
        if let Some(v) = current {
            entries.push(("Sekarang".to_string(), v, theme.emphasis));
        }
        if let Some(v) = target {
            entries.push((format!("Target ({:.1}x)", multiplier), v, theme.positive));
        }
        if let Some(v) = singapore {
            entries.push(("Singapura".to_string(), v, theme.neutral));
        }

        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, (label, value, color))| {
                Bar::new(i as f64, *value)
                    .width(0.6)
                    .fill(*color)
                    .name(format!("{}: {:.2} M", label, value))
            })
            .collect();

        let labels: Vec<String> = entries.iter().map(|(label, _, _)| label.clone()).collect();
        Plot::new("salary_target_bar")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_label("Miliar Rupiah")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 0.05 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Gaji tahunan"));
            });
    }

    /// Simulated salary projection (area, billions) against the projected
    /// corruption caseload on a remapped second scale.
    pub fn draw_projection_chart(ui: &mut egui::Ui, simulated_projection: &DataFrame, opts: &ViewOptions) {
        let theme = Theme::of(opts.theme);
        let salaries: Vec<(i64, f64)> = year_values(simulated_projection, cols::PROYEKSI_GAJI_JUTA)
            .into_iter()
            .map(|(y, juta)| (y, juta / 1000.0))
            .collect();
        let cases = year_values(simulated_projection, cols::PROYEKSI_KASUS);
        if salaries.is_empty() {
            ui.label("Tidak ada data proyeksi");
            return;
        }

        let s_max = salaries
            .iter()
            .map(|&(_, v)| v)
            .fold(f64::NEG_INFINITY, f64::max);
        let c_max = cases.iter().map(|&(_, v)| v).fold(1.0, f64::max);
        let salary_scale = (0.0, s_max * 1.1);
        let case_scale = (0.0, c_max * 1.1);
        let last_year = salaries.iter().map(|&(y, _)| y).max().unwrap_or(0);

        let salary_points: PlotPoints = salaries.iter().map(|&(y, v)| [y as f64, v]).collect();
        let case_points: PlotPoints = cases
            .iter()
            .map(|&(y, v)| [y as f64, remap(v, case_scale, salary_scale)])
            .collect();

        Plot::new("projection_chart")
            .height(260.0)
            .allow_scroll(false)
            .y_axis_label("Miliar Rupiah")
            .x_axis_formatter(|mark, _range| format!("{}", mark.value.round() as i64))
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(salary_points)
                        .color(theme.positive)
                        .width(3.0)
                        .fill(0.0)
                        .name("Proyeksi Gaji (kiri)"),
                );
                plot_ui.line(
                    Line::new(case_points)
                        .color(theme.emphasis)
                        .width(3.0)
                        .name("Kasus Korupsi (kanan)"),
                );
                for fraction in [0.0, 0.5, 1.0] {
                    let case_value = case_scale.1 * fraction;
                    plot_ui.text(Text::new(
                        PlotPoint::new(
                            last_year as f64 + 0.4,
                            remap(case_value, case_scale, salary_scale),
                        ),
                        RichText::new(format!("{:.0}", case_value))
                            .size(10.0)
                            .color(theme.emphasis),
                    ));
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::col as cols;

    #[test]
    fn rupiah_formatting_uses_short_scale() {
        assert_eq!(format_rupiah(25_000_000.0), "25.0 Juta");
        assert_eq!(format_rupiah(4_500_000_000.0), "4.5 M");
        assert_eq!(format_rupiah(117_000_000_000_000.0), "117.0 T");
        assert_eq!(format_rupiah(950.0), "950");
    }

    #[test]
    fn year_values_skip_incomplete_rows() {
        let df = DataFrame::new(vec![
            Column::new(cols::TAHUN.into(), vec![Some(2020i64), Some(2021), Some(2022)]),
            Column::new(cols::LANSIA_JUTA.into(), vec![Some(26.8), None, Some(30.2)]),
        ])
        .unwrap();
        assert_eq!(
            year_values(&df, cols::LANSIA_JUTA),
            vec![(2020, 26.8), (2022, 30.2)]
        );
    }

    #[test]
    fn year_filter_is_inclusive() {
        let df = DataFrame::new(vec![
            Column::new(cols::TAHUN.into(), vec![2019i64, 2020, 2023, 2024]),
            Column::new(cols::SKOR_KORUPSI.into(), vec![40.0, 37.0, 34.0, 34.0]),
        ])
        .unwrap();
        let filtered = filter_years(&df, 2020, 2023);
        assert_eq!(
            year_values(&filtered, cols::SKOR_KORUPSI),
            vec![(2020, 37.0), (2023, 34.0)]
        );
    }

    #[test]
    fn value_for_matches_exact_labels() {
        let df = DataFrame::new(vec![
            Column::new(cols::NEGARA.into(), vec!["Indonesia", "Singapura"]),
            Column::new(cols::GAJI_PEJABAT_MILIAR.into(), vec![0.658, 2.48]),
        ])
        .unwrap();
        assert_eq!(
            value_for(&df, cols::NEGARA, "Singapura", cols::GAJI_PEJABAT_MILIAR),
            Some(2.48)
        );
        assert_eq!(
            value_for(&df, cols::NEGARA, "Hong Kong", cols::GAJI_PEJABAT_MILIAR),
            None
        );
    }

    #[test]
    fn remap_projects_between_scales() {
        assert!((remap(50.0, (0.0, 100.0), (0.0, 4.0)) - 2.0).abs() < 1e-12);
        assert!((remap(0.0, (0.0, 100.0), (1.0, 3.0)) - 1.0).abs() < 1e-12);
    }
}
