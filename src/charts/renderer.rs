//! Static Chart Renderer
//! Renders the dashboard charts to in-memory PNGs with plotters, for the
//! report export. One image per chart; the report generator lays them out.

use anyhow::Context;
use plotters::element::Pie;
use plotters::prelude::*;
use polars::prelude::DataFrame;
use rayon::prelude::*;

use super::plotter::{
    filter_years, format_rupiah, labeled_values, value_for, year_values, Theme, ViewOptions,
};
use crate::data::schema::col as cols;
use crate::data::DataBundle;
use crate::stats::StatsCalculator;

/// One renderable dashboard chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    ElderlyLine,
    DiseasePie,
    SalaryGap,
    CpiBar,
    BenchmarkScatter,
    CatastrophicBar,
    PensionBar,
    RoiBar,
    SalaryTarget,
    ProjectionDual,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::ElderlyLine => "Populasi Lansia",
            ChartKind::DiseasePie => "Porsi Biaya BPJS",
            ChartKind::SalaryGap => "Komparasi Gaji vs Subsidi",
            ChartKind::CpiBar => "Skor Indeks Korupsi",
            ChartKind::BenchmarkScatter => "Benchmark Gaji vs CPI",
            ChartKind::CatastrophicBar => "Biaya Penyakit Katastropik",
            ChartKind::PensionBar => "Beban Pensiun APBN",
            ChartKind::RoiBar => "Analisis Modal dan Penghematan",
            ChartKind::SalaryTarget => "Target Gaji Baru",
            ChartKind::ProjectionDual => "Proyeksi Gaji dan Kasus Korupsi",
        }
    }

    const ALL: [ChartKind; 10] = [
        ChartKind::ElderlyLine,
        ChartKind::DiseasePie,
        ChartKind::SalaryGap,
        ChartKind::CpiBar,
        ChartKind::BenchmarkScatter,
        ChartKind::CatastrophicBar,
        ChartKind::PensionBar,
        ChartKind::RoiBar,
        ChartKind::SalaryTarget,
        ChartKind::ProjectionDual,
    ];
}

fn rgb(color: egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// Renders dashboard charts to PNG bytes.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart that has data, in dashboard order. Charts backed by
    /// unavailable optional tables are skipped, matching the on-screen "no
    /// data" cards. Rendering fans out across threads.
    pub fn render_all(
        bundle: &DataBundle,
        simulated: &DataBundle,
        multiplier: f64,
        opts: &ViewOptions,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let kinds: Vec<ChartKind> = ChartKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                ChartKind::CatastrophicBar => bundle.catastrophic_trend.is_some(),
                ChartKind::PensionBar => bundle.pension_trend.is_some(),
                ChartKind::RoiBar => bundle.roi.is_some(),
                _ => true,
            })
            .collect();

        kinds
            .par_iter()
            .map(|kind| -> anyhow::Result<(String, Vec<u8>)> {
                let png =
                    Self::render_chart(bundle, simulated, multiplier, opts, *kind, width, height)?;
                Ok((kind.title().to_string(), png))
            })
            .collect()
    }

    /// Render one chart into a PNG byte buffer.
    pub fn render_chart(
        bundle: &DataBundle,
        simulated: &DataBundle,
        multiplier: f64,
        opts: &ViewOptions,
        kind: ChartKind,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Vec<u8>> {
        let mut buf = vec![0u8; (width as usize) * (height as usize) * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
            root.fill(&WHITE)?;
            let theme = Theme::of(opts.theme);

            match kind {
                ChartKind::ElderlyLine => {
                    let df = filter_years(&bundle.elderly_correlation, opts.year_min, opts.year_max);
                    Self::draw_year_line(
                        &root,
                        kind.title(),
                        "Juta jiwa",
                        &year_values(&df, cols::LANSIA_JUTA),
                        rgb(theme.emphasis),
                    )?;
                }
                ChartKind::DiseasePie => {
                    Self::draw_pie(&root, kind.title(), &bundle.disease_share, theme)?;
                }
                ChartKind::SalaryGap => {
                    let rows = labeled_values(
                        &bundle.salary_comparison,
                        cols::KATEGORI,
                        cols::NOMINAL,
                    );
                    Self::draw_horizontal_bars(
                        &root,
                        kind.title(),
                        &rows,
                        opts.log_salary_axis,
                        theme,
                    )?;
                }
                ChartKind::CpiBar => {
                    let df = filter_years(&bundle.elderly_correlation, opts.year_min, opts.year_max);
                    Self::draw_year_bars(
                        &root,
                        kind.title(),
                        "Skor CPI",
                        &year_values(&df, cols::SKOR_KORUPSI),
                        Some(100.0),
                        rgb(theme.emphasis),
                    )?;
                }
                ChartKind::BenchmarkScatter => {
                    Self::draw_benchmark(&root, kind.title(), &bundle.country_benchmark, opts, theme)?;
                }
                ChartKind::CatastrophicBar => {
                    if let Some(df) = &bundle.catastrophic_trend {
                        let rows: Vec<(i64, f64)> = year_values(df, cols::BIAYA)
                            .into_iter()
                            .map(|(y, v)| (y, v / 1e12))
                            .collect();
                        Self::draw_year_bars(
                            &root,
                            kind.title(),
                            "Triliun Rupiah",
                            &rows,
                            None,
                            rgb(theme.emphasis),
                        )?;
                    }
                }
                ChartKind::PensionBar => {
                    if let Some(df) = &bundle.pension_trend {
                        Self::draw_pension(&root, kind.title(), df, theme)?;
                    }
                }
                ChartKind::RoiBar => {
                    if let Some(df) = simulated.roi.as_ref().or(bundle.roi.as_ref()) {
                        let rows = labeled_values(df, cols::KOMPONEN, cols::NOMINAL);
                        Self::draw_horizontal_bars(
                            &root,
                            kind.title(),
                            &rows,
                            opts.log_roi_axis,
                            theme,
                        )?;
                    }
                }
                ChartKind::SalaryTarget => {
                    Self::draw_salary_target(&root, kind.title(), bundle, simulated, multiplier, theme)?;
                }
                ChartKind::ProjectionDual => {
                    Self::draw_projection(&root, kind.title(), &simulated.projection, theme)?;
                }
            }
            root.present()?;
        }

        let img = image::RgbImage::from_raw(width, height, buf)
            .context("rendered buffer did not match image dimensions")?;
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )?;
        Ok(bytes)
    }

    fn draw_year_line(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        y_desc: &str,
        rows: &[(i64, f64)],
        color: RGBColor,
    ) -> anyhow::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let (x_min, x_max) = year_span(rows);
        let y_max = rows.iter().map(|&(_, v)| v).fold(1.0, f64::max);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min - 0.5..x_max + 0.5, 0.0..y_max * 1.2)?;
        chart
            .configure_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&|x| format!("{}", x.round() as i64))
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(LineSeries::new(
            rows.iter().map(|&(y, v)| (y as f64, v)),
            color.stroke_width(3),
        ))?;
        chart.draw_series(
            rows.iter()
                .map(|&(y, v)| Circle::new((y as f64, v), 4, color.filled())),
        )?;
        Ok(())
    }

    fn draw_year_bars(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        y_desc: &str,
        rows: &[(i64, f64)],
        y_top: Option<f64>,
        color: RGBColor,
    ) -> anyhow::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let (x_min, x_max) = year_span(rows);
        let data_max = rows.iter().map(|&(_, v)| v).fold(1.0, f64::max);
        let y_max = y_top.unwrap_or(data_max * 1.25);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min - 0.8..x_max + 0.8, 0.0..y_max)?;
        chart
            .configure_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&|x| format!("{}", x.round() as i64))
            .y_desc(y_desc)
            .draw()?;

        chart.draw_series(rows.iter().map(|&(year, value)| {
            Rectangle::new(
                [(year as f64 - 0.3, 0.0), (year as f64 + 0.3, value)],
                color.filled(),
            )
        }))?;
        Ok(())
    }

    fn draw_pension(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        df: &DataFrame,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        let rows = year_values(df, cols::ANGGARAN_TRILIUN);
        if rows.is_empty() {
            return Ok(());
        }
        let (x_min, x_max) = year_span(&rows);
        let values: Vec<f64> = rows.iter().map(|&(_, v)| v).collect();
        let y_max = values.iter().cloned().fold(1.0, f64::max) * 1.25;
        let color = rgb(theme.emphasis);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(x_min - 0.8..x_max + 0.8, 0.0..y_max)?;
        chart
            .configure_mesh()
            .x_labels(rows.len())
            .x_label_formatter(&|x| format!("{}", x.round() as i64))
            .y_desc("Triliun Rupiah")
            .draw()?;

        chart.draw_series(rows.iter().map(|&(year, value)| {
            Rectangle::new(
                [(year as f64 - 0.3, 0.0), (year as f64 + 0.3, value)],
                color.filled(),
            )
        }))?;

        // Percent-rise annotation above the last bar, like the on-screen card.
        if let (Some(rise), Some(&(year, value))) =
            (StatsCalculator::percent_change(&values), rows.last())
        {
            chart.plotting_area().draw(&Text::new(
                format!("+{:.1}%", rise),
                (year as f64 - 0.5, value * 1.1),
                ("sans-serif", 18).into_font().color(&color),
            ))?;
        }
        Ok(())
    }

    fn draw_horizontal_bars(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        rows: &[(String, f64)],
        log_axis: bool,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut rows: Vec<(String, f64)> = rows.to_vec();
        rows.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let magnitudes: Vec<f64> = rows
            .iter()
            .map(|(_, v)| if log_axis { v.max(1.0).log10() } else { *v })
            .collect();
        let x_max = magnitudes.iter().cloned().fold(1.0, f64::max);

        let labels: Vec<String> = rows.iter().map(|(label, _)| label.clone()).collect();
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(170)
            .build_cartesian_2d(0.0..x_max * 1.15, -0.6..rows.len() as f64 - 0.4)?;
        chart
            .configure_mesh()
            .y_labels(rows.len())
            .y_label_formatter(&move |y| {
                let idx = y.round();
                if idx >= 0.0 && (idx - y).abs() < 0.05 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .x_label_formatter(&move |x| {
                if log_axis {
                    format_rupiah(10f64.powf(*x))
                } else {
                    format_rupiah(*x)
                }
            })
            .draw()?;

        chart.draw_series(rows.iter().zip(&magnitudes).enumerate().map(
            |(i, ((_, _), magnitude))| {
                Rectangle::new(
                    [(0.0, i as f64 - 0.3), (*magnitude, i as f64 + 0.3)],
                    rgb(theme.series_color(i)).filled(),
                )
            },
        ))?;
        chart.draw_series(rows.iter().zip(&magnitudes).enumerate().map(
            |(i, ((_, value), magnitude))| {
                Text::new(
                    format_rupiah(*value),
                    (*magnitude, i as f64 - 0.1),
                    ("sans-serif", 14),
                )
            },
        ))?;
        Ok(())
    }

    fn draw_pie(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        df: &DataFrame,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        let mut rows = labeled_values(df, cols::JENIS_PENYAKIT, cols::BIAYA_TRILIUN);
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        if rows.is_empty() {
            return Ok(());
        }

        let area = root.titled(title, ("sans-serif", 24))?;
        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = (w.min(h) as f64) * 0.35;

        let total: f64 = rows.iter().map(|(_, v)| v).sum();
        let sizes: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();
        let colors: Vec<RGBColor> = (0..rows.len()).map(|i| rgb(theme.series_color(i))).collect();
        let labels: Vec<String> = rows
            .iter()
            .map(|(label, value)| format!("{} ({:.0}%)", label, value / total * 100.0))
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 16).into_font());
        area.draw(&pie)?;
        Ok(())
    }

    fn draw_benchmark(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        df: &DataFrame,
        opts: &ViewOptions,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        let salaries = labeled_values(df, cols::NEGARA, cols::GAJI_PEJABAT_MILIAR);
        let scores = labeled_values(df, cols::NEGARA, cols::SKOR_KEBERSIHAN);
        let mut rows: Vec<(String, f64, f64)> = Vec::new();
        for (country, salary) in &salaries {
            if let Some((_, score)) = scores.iter().find(|(c, _)| c == country) {
                rows.push((country.clone(), *salary, *score));
            }
        }
        if rows.is_empty() {
            return Ok(());
        }

        let x_max = rows.iter().map(|r| r.1).fold(f64::NEG_INFINITY, f64::max) * 1.2;
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(42)
            .y_label_area_size(48)
            .build_cartesian_2d(0.0..x_max, 0.0..105.0)?;
        chart
            .configure_mesh()
            .x_desc("Gaji Pejabat (Miliar Rupiah)")
            .y_desc("Skor Kebersihan (CPI)")
            .draw()?;

        chart.draw_series(rows.iter().enumerate().map(|(i, (_, salary, score))| {
            Circle::new((*salary, *score), 6, rgb(theme.series_color(i)).filled())
        }))?;
        chart.draw_series(rows.iter().map(|(country, salary, score)| {
            Text::new(country.clone(), (*salary, *score + 3.0), ("sans-serif", 15))
        }))?;

        if opts.show_trend {
            let xs: Vec<f64> = rows.iter().map(|r| r.1).collect();
            let ys: Vec<f64> = rows.iter().map(|r| r.2).collect();
            if let Some(line) = StatsCalculator::linear_fit(&xs, &ys) {
                chart.draw_series(LineSeries::new(
                    [(0.0, line.at(0.0)), (x_max, line.at(x_max))],
                    rgb(theme.neutral).stroke_width(2),
                ))?;
            }
        }
        Ok(())
    }

    fn draw_salary_target(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        bundle: &DataBundle,
        simulated: &DataBundle,
        multiplier: f64,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        let current = value_for(
            &bundle.country_benchmark,
            cols::NEGARA,
            "Indonesia",
            cols::GAJI_PEJABAT_MILIAR,
        );
        let singapore = value_for(
            &bundle.country_benchmark,
            cols::NEGARA,
            "Singapura",
            cols::GAJI_PEJABAT_MILIAR,
        );
        let target = year_values(&simulated.projection, cols::PROYEKSI_GAJI_JUTA)
            .into_iter()
            .max_by_key(|&(year, _)| year)
            .map(|(_, juta)| juta / 1000.0);

        let mut entries: Vec<(String, f64, RGBColor)> = Vec::new();
        if let Some(v) = current {
            entries.push(("Sekarang".to_string(), v, rgb(theme.emphasis)));
        }
        if let Some(v) = target {
            entries.push((
                format!("Target ({:.1}x)", multiplier),
                v,
                rgb(theme.positive),
            ));
        }
        if let Some(v) = singapore {
            entries.push(("Singapura".to_string(), v, rgb(theme.neutral)));
        }
        if entries.is_empty() {
            return Ok(());
        }

        let y_max = entries.iter().map(|e| e.1).fold(f64::NEG_INFINITY, f64::max) * 1.25;
        let labels: Vec<String> = entries.iter().map(|e| e.0.clone()).collect();
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.6..entries.len() as f64 - 0.4, 0.0..y_max)?;
        chart
            .configure_mesh()
            .x_labels(entries.len())
            .x_label_formatter(&move |x| {
                let idx = x.round();
                if idx >= 0.0 && (idx - x).abs() < 0.05 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_desc("Miliar Rupiah")
            .draw()?;

        chart.draw_series(entries.iter().enumerate().map(|(i, (_, value, color))| {
            Rectangle::new(
                [(i as f64 - 0.3, 0.0), (i as f64 + 0.3, *value)],
                color.filled(),
            )
        }))?;
        chart.draw_series(entries.iter().enumerate().map(|(i, (_, value, _))| {
            Text::new(
                format!("{:.2} M", value),
                (i as f64 - 0.2, value * 1.05),
                ("sans-serif", 15),
            )
        }))?;
        Ok(())
    }

    fn draw_projection(
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        title: &str,
        projection: &DataFrame,
        theme: &Theme,
    ) -> anyhow::Result<()> {
        let salaries: Vec<(i64, f64)> = year_values(projection, cols::PROYEKSI_GAJI_JUTA)
            .into_iter()
            .map(|(y, juta)| (y, juta / 1000.0))
            .collect();
        let cases = year_values(projection, cols::PROYEKSI_KASUS);
        if salaries.is_empty() {
            return Ok(());
        }

        let (x_min, x_max) = year_span(&salaries);
        let s_max = salaries.iter().map(|&(_, v)| v).fold(1.0, f64::max);
        let c_max = cases.iter().map(|&(_, v)| v).fold(1.0, f64::max);

        let salary_color = rgb(theme.positive);
        let case_color = rgb(theme.emphasis);

        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 24))
            .margin(14)
            .x_label_area_size(36)
            .y_label_area_size(52)
            .right_y_label_area_size(52)
            .build_cartesian_2d(x_min - 0.5..x_max + 0.5, 0.0..s_max * 1.15)?
            .set_secondary_coord(x_min - 0.5..x_max + 0.5, 0.0..c_max * 1.15);
        chart
            .configure_mesh()
            .x_labels(salaries.len())
            .x_label_formatter(&|x| format!("{}", x.round() as i64))
            .y_desc("Gaji (Miliar Rupiah)")
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Kasus Korupsi")
            .draw()?;

        chart
            .draw_series(AreaSeries::new(
                salaries.iter().map(|&(y, v)| (y as f64, v)),
                0.0,
                salary_color.mix(0.25),
            ))?
            .label("Proyeksi Gaji")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], salary_color.stroke_width(3))
            });
        chart.draw_series(LineSeries::new(
            salaries.iter().map(|&(y, v)| (y as f64, v)),
            salary_color.stroke_width(3),
        ))?;
        chart
            .draw_secondary_series(LineSeries::new(
                cases.iter().map(|&(y, v)| (y as f64, v)),
                case_color.stroke_width(3),
            ))?
            .label("Kasus Korupsi")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], case_color.stroke_width(3))
            });

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .draw()?;
        Ok(())
    }
}

fn year_span(rows: &[(i64, f64)]) -> (f64, f64) {
    let min = rows.iter().map(|&(y, _)| y).min().unwrap_or(0) as f64;
    let max = rows.iter().map(|&(y, _)| y).max().unwrap_or(0) as f64;
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil;

    #[test]
    fn renders_every_chart_to_png_bytes() {
        let bundle = testutil::bundle();
        let simulated = crate::data::apply_simulation(&bundle, 2.0).unwrap();
        let opts = ViewOptions::default();

        let images =
            StaticChartRenderer::render_all(&bundle, &simulated, 2.0, &opts, 640, 480).unwrap();
        assert_eq!(images.len(), ChartKind::ALL.len());
        for (title, png) in &images {
            assert!(!title.is_empty());
            // PNG signature
            assert_eq!(png[..8], [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        }
    }

    #[test]
    fn skips_charts_for_unavailable_tables() {
        let mut bundle = testutil::bundle();
        bundle.roi = None;
        bundle.catastrophic_trend = None;
        bundle.pension_trend = None;
        let simulated = crate::data::apply_simulation(&bundle, 1.0).unwrap();

        let images = StaticChartRenderer::render_all(
            &bundle,
            &simulated,
            1.0,
            &ViewOptions::default(),
            640,
            480,
        )
        .unwrap();
        assert_eq!(images.len(), ChartKind::ALL.len() - 3);
    }
}
