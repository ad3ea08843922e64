//! Workbook Schema Module
//! Declarative description of the workbook sheets and the normalization each
//! table receives. Presentation code reads whichever columns it needs from the
//! resulting bundle; the pipeline itself is driven entirely by these specs.

/// Divisor for columns normalized to millions of rupiah.
pub const MILLIONS: f64 = 1_000_000.0;
/// Divisor for columns normalized to billions of rupiah.
pub const BILLIONS: f64 = 1_000_000_000.0;

/// Projection rows dated after this year are subject to the simulation
/// multiplier; rows at or before it are historical and never rescaled.
pub const CUTOFF_YEAR: i64 = 2023;

/// Multiplier bounds enforced by the control surface (the slider). The
/// transformer itself accepts any positive multiplier.
pub const MULTIPLIER_MIN: f64 = 0.5;
pub const MULTIPLIER_MAX: f64 = 3.0;
pub const MULTIPLIER_STEP: f64 = 0.5;

/// Column names shared between the pipeline and the chart code.
pub mod col {
    pub const KATEGORI: &str = "Kategori";
    pub const NOMINAL: &str = "Nominal";
    pub const TAHUN: &str = "Tahun";
    pub const LANSIA_JUTA: &str = "Jumlah Lansia (Juta Jiwa)";
    pub const SKOR_KORUPSI: &str = "Skor Indeks Korupsi (CPI)";
    pub const NEGARA: &str = "Negara";
    pub const GAJI_PEJABAT: &str = "Gaji Pejabat per Tahun";
    pub const GAJI_PEJABAT_MILIAR: &str = "Gaji Pejabat per Tahun (Miliar Rupiah)";
    pub const SKOR_KEBERSIHAN: &str = "Skor Kebersihan (CPI)";
    pub const JENIS_PENYAKIT: &str = "Jenis Penyakit";
    pub const BIAYA_TRILIUN: &str = "Biaya (Triliun Rupiah)";
    pub const PROYEKSI_GAJI: &str = "Proyeksi Gaji DPR";
    pub const PROYEKSI_GAJI_JUTA: &str = "Proyeksi Gaji DPR (Juta)";
    pub const PROYEKSI_KASUS: &str = "Proyeksi Kasus Korupsi";
    pub const KOMPONEN: &str = "Komponen";
    pub const BIAYA: &str = "Biaya";
    pub const ANGGARAN_TRILIUN: &str = "Anggaran(Triliun)";
}

/// Statistic the unit heuristic compares against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleStat {
    Mean,
    Max,
}

/// Threshold-based unit conversion for a monetary column.
///
/// Raw workbook values are full rupiah (observed range 1e8..1e12), so the
/// statistic clears the threshold on first contact; after one division it
/// lands in the single-to-thousands range and the rule no longer triggers.
/// Detection is by magnitude, never by a flag, which makes the conversion
/// idempotent.
#[derive(Debug, Clone, Copy)]
pub struct UnitRule {
    /// Column name as it appears in the raw sheet.
    pub column: &'static str,
    /// Name carrying the unit suffix after normalization.
    pub renamed: &'static str,
    pub stat: ScaleStat,
    pub threshold: f64,
    /// Lower threshold mapping to the same conversion. The benchmark sheet has
    /// been observed with some entries recorded in millions rather than full
    /// rupiah; those must still land in billions.
    pub secondary_threshold: Option<f64>,
    pub divisor: f64,
}

impl UnitRule {
    pub fn triggers(&self, stat_value: f64) -> bool {
        if stat_value > self.threshold {
            return true;
        }
        matches!(self.secondary_threshold, Some(t) if stat_value > t)
    }
}

/// Identifying label column. Rows without a value are dropped when
/// `drop_missing`; surviving values get whitespace runs collapsed so they can
/// be used as exact-match lookup keys.
#[derive(Debug, Clone, Copy)]
pub struct KeyColumn {
    pub column: &'static str,
    pub drop_missing: bool,
}

/// Normalization recipe for one sheet.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub sheet: &'static str,
    pub required: bool,
    /// Coerced to integer; rows where that fails are dropped.
    pub year_column: Option<&'static str>,
    pub key_column: Option<KeyColumn>,
    pub unit_rule: Option<UnitRule>,
}

pub const SALARY_COMPARISON: TableSpec = TableSpec {
    sheet: "Komparasi Gaji",
    required: true,
    year_column: None,
    key_column: Some(KeyColumn {
        column: col::KATEGORI,
        drop_missing: false,
    }),
    unit_rule: None,
};

pub const ELDERLY_CORRELATION: TableSpec = TableSpec {
    sheet: "Korelasi Lansia",
    required: true,
    year_column: Some(col::TAHUN),
    key_column: None,
    unit_rule: None,
};

pub const COUNTRY_BENCHMARK: TableSpec = TableSpec {
    sheet: "Benchmark Negara",
    required: true,
    year_column: None,
    key_column: Some(KeyColumn {
        column: col::NEGARA,
        drop_missing: false,
    }),
    unit_rule: Some(UnitRule {
        column: col::GAJI_PEJABAT,
        renamed: col::GAJI_PEJABAT_MILIAR,
        stat: ScaleStat::Max,
        threshold: BILLIONS,
        secondary_threshold: Some(MILLIONS),
        divisor: BILLIONS,
    }),
};

pub const DISEASE_SHARE: TableSpec = TableSpec {
    sheet: "Porsi BPJS",
    required: true,
    year_column: None,
    key_column: Some(KeyColumn {
        column: col::JENIS_PENYAKIT,
        drop_missing: true,
    }),
    unit_rule: None,
};

pub const PROJECTION: TableSpec = TableSpec {
    sheet: "Proyeksi Masa Depan",
    required: true,
    year_column: Some(col::TAHUN),
    key_column: None,
    unit_rule: Some(UnitRule {
        column: col::PROYEKSI_GAJI,
        renamed: col::PROYEKSI_GAJI_JUTA,
        stat: ScaleStat::Mean,
        threshold: MILLIONS,
        secondary_threshold: None,
        divisor: MILLIONS,
    }),
};

pub const ROI: TableSpec = TableSpec {
    sheet: "Analisis ROI",
    required: false,
    year_column: None,
    key_column: Some(KeyColumn {
        column: col::KOMPONEN,
        drop_missing: false,
    }),
    unit_rule: None,
};

pub const CATASTROPHIC_TREND: TableSpec = TableSpec {
    sheet: "Tren Katastropik",
    required: false,
    year_column: Some(col::TAHUN),
    key_column: None,
    unit_rule: None,
};

pub const PENSION_TREND: TableSpec = TableSpec {
    sheet: "Belanja Pensiun",
    required: false,
    year_column: Some(col::TAHUN),
    key_column: None,
    unit_rule: None,
};

/// Every sheet the loader looks for, in bundle order.
pub const TABLES: [&TableSpec; 8] = [
    &SALARY_COMPARISON,
    &ELDERLY_CORRELATION,
    &COUNTRY_BENCHMARK,
    &DISEASE_SHARE,
    &PROJECTION,
    &ROI,
    &CATASTROPHIC_TREND,
    &PENSION_TREND,
];
