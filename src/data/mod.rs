//! Data module - workbook loading, normalization, and simulation

mod bundle;
mod loader;
mod normalize;
pub mod schema;
mod simulate;

pub use bundle::DataBundle;
pub use loader::{load_workbook, BundleCache, LoadError};
pub use simulate::{apply_simulation, SimulationError};

/// Raw-frame fixtures shaped like the workbook sheets before normalization.
#[cfg(test)]
pub(crate) mod testutil {
    use super::schema::{self, col};
    use polars::prelude::*;
    use std::collections::HashMap;

    pub fn bundle() -> super::DataBundle {
        super::loader::assemble_bundle(raw_tables()).unwrap()
    }

    pub fn raw_tables() -> HashMap<&'static str, DataFrame> {
        let mut raw = HashMap::new();

        raw.insert(
            schema::SALARY_COMPARISON.sheet,
            DataFrame::new(vec![
                Column::new(
                    col::KATEGORI.into(),
                    vec![
                        "Gaji Pokok DPR RI (Setahun)",
                        "Belanja  Pensiun APBN ",
                        "Biaya Penyakit Jantung BPJS",
                    ],
                ),
                Column::new(
                    col::NOMINAL.into(),
                    vec![32_000_000_000.0, 117_000_000_000_000.0, 12_140_000_000_000.0],
                ),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::ELDERLY_CORRELATION.sheet,
            DataFrame::new(vec![
                Column::new(col::TAHUN.into(), vec![2020.0, 2021.0, 2022.0, 2023.0]),
                Column::new(col::LANSIA_JUTA.into(), vec![26.8, 29.3, 30.2, 31.9]),
                Column::new(col::SKOR_KORUPSI.into(), vec![37.0, 38.0, 34.0, 34.0]),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::COUNTRY_BENCHMARK.sheet,
            DataFrame::new(vec![
                Column::new(
                    col::NEGARA.into(),
                    vec!["Indonesia", "Singapura", "Australia"],
                ),
                Column::new(
                    col::GAJI_PEJABAT.into(),
                    vec![658_000_000.0, 2_480_000_000.0, 1_500_000_000.0],
                ),
                Column::new(col::SKOR_KEBERSIHAN.into(), vec![34.0, 83.0, 75.0]),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::DISEASE_SHARE.sheet,
            DataFrame::new(vec![
                Column::new(
                    col::JENIS_PENYAKIT.into(),
                    vec![Some("Jantung"), Some("Kanker"), Some("Stroke"), None],
                ),
                Column::new(
                    col::BIAYA_TRILIUN.into(),
                    vec![Some(12.1), Some(4.5), Some(3.2), Some(0.4)],
                ),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::PROJECTION.sheet,
            DataFrame::new(vec![
                Column::new(
                    col::TAHUN.into(),
                    vec![2023.0, 2024.0, 2025.0, 2026.0, 2027.0],
                ),
                Column::new(
                    col::PROYEKSI_GAJI.into(),
                    vec![
                        500_000_000.0,
                        800_000_000.0,
                        1_200_000_000.0,
                        1_800_000_000.0,
                        2_600_000_000.0,
                    ],
                ),
                Column::new(
                    col::PROYEKSI_KASUS.into(),
                    vec![791.0, 640.0, 470.0, 300.0, 150.0],
                ),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::ROI.sheet,
            DataFrame::new(vec![
                Column::new(
                    col::KOMPONEN.into(),
                    vec!["Biaya Modal", "Penghematan", "Dana Realokasi"],
                ),
                Column::new(
                    col::NOMINAL.into(),
                    vec![25_000_000.0, 4_500_000_000.0, 1_200_000_000.0],
                ),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::CATASTROPHIC_TREND.sheet,
            DataFrame::new(vec![
                Column::new(col::TAHUN.into(), vec![2021.0, 2022.0, 2023.0, 2024.0]),
                Column::new(
                    col::BIAYA.into(),
                    vec![
                        17_900_000_000_000.0,
                        24_100_000_000_000.0,
                        29_700_000_000_000.0,
                        34_800_000_000_000.0,
                    ],
                ),
            ])
            .unwrap(),
        );

        raw.insert(
            schema::PENSION_TREND.sheet,
            DataFrame::new(vec![
                Column::new(col::TAHUN.into(), vec![2018.0, 2020.0, 2022.0, 2024.0]),
                Column::new(col::ANGGARAN_TRILIUN.into(), vec![90.8, 104.9, 119.0, 137.8]),
            ])
            .unwrap(),
        );

        raw
    }
}
