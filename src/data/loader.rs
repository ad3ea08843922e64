//! Workbook Loader Module
//! Opens the Excel workbook, turns each known sheet into a DataFrame, and
//! assembles the normalized table bundle. Loading is atomic: a missing
//! required sheet or pipeline column fails the whole load and no partial
//! bundle escapes.

use calamine::{open_workbook, DataType as Cell, Reader, Xlsx};
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::bundle::DataBundle;
use super::normalize::normalize_table;
use super::schema::{self, TableSpec};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open workbook '{path}': {source}")]
    SourceUnreachable {
        path: String,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("workbook has no sheet '{sheet}'; every view needs it, so nothing was loaded")]
    MissingTable { sheet: &'static str },
    #[error("sheet '{sheet}' could not be read: {source}")]
    Sheet {
        sheet: &'static str,
        #[source]
        source: calamine::XlsxError,
    },
    #[error("sheet '{sheet}' has no header row")]
    EmptyTable { sheet: &'static str },
    #[error("sheet '{sheet}' is missing column '{column}' needed for normalization")]
    MissingColumn {
        sheet: &'static str,
        column: &'static str,
    },
    #[error("no workbook selected")]
    NoSource,
    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Load and normalize every known sheet of the workbook at `path`.
pub fn load_workbook(path: &Path) -> Result<DataBundle, LoadError> {
    info!("loading workbook {}", path.display());

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|source| LoadError::SourceUnreachable {
            path: path.display().to_string(),
            source,
        })?;

    let mut raw: HashMap<&'static str, DataFrame> = HashMap::new();
    for spec in schema::TABLES {
        let Some(result) = workbook.worksheet_range(spec.sheet) else {
            continue;
        };
        let range = result.map_err(|source| LoadError::Sheet {
            sheet: spec.sheet,
            source,
        })?;
        if let Some(frame) = sheet_to_frame(&range, spec)? {
            debug!("{}: {} rows", spec.sheet, frame.height());
            raw.insert(spec.sheet, frame);
        }
    }

    assemble_bundle(raw)
}

/// Normalize the raw frames into the bundle. Separated from the workbook I/O
/// so the required/optional contract is testable without fixture files.
pub(crate) fn assemble_bundle(
    mut raw: HashMap<&'static str, DataFrame>,
) -> Result<DataBundle, LoadError> {
    let salary_comparison = required_table(&mut raw, &schema::SALARY_COMPARISON)?;
    let elderly_correlation = required_table(&mut raw, &schema::ELDERLY_CORRELATION)?;
    let country_benchmark = required_table(&mut raw, &schema::COUNTRY_BENCHMARK)?;
    let disease_share = required_table(&mut raw, &schema::DISEASE_SHARE)?;
    let projection = required_table(&mut raw, &schema::PROJECTION)?;
    let roi = optional_table(&mut raw, &schema::ROI)?;
    let catastrophic_trend = optional_table(&mut raw, &schema::CATASTROPHIC_TREND)?;
    let pension_trend = optional_table(&mut raw, &schema::PENSION_TREND)?;

    Ok(DataBundle {
        salary_comparison,
        elderly_correlation,
        country_benchmark,
        disease_share,
        projection,
        roi,
        catastrophic_trend,
        pension_trend,
    })
}

fn required_table(
    raw: &mut HashMap<&'static str, DataFrame>,
    spec: &TableSpec,
) -> Result<DataFrame, LoadError> {
    let frame = raw
        .remove(spec.sheet)
        .ok_or(LoadError::MissingTable { sheet: spec.sheet })?;
    normalize_table(frame, spec)
}

fn optional_table(
    raw: &mut HashMap<&'static str, DataFrame>,
    spec: &TableSpec,
) -> Result<Option<DataFrame>, LoadError> {
    match raw.remove(spec.sheet) {
        Some(frame) => normalize_table(frame, spec).map(Some),
        None => {
            info!("{}: sheet absent, table marked unavailable", spec.sheet);
            Ok(None)
        }
    }
}

/// Build a DataFrame from a sheet range. Header labels are trimmed; columns
/// whose header cell is empty (spreadsheet artifacts) are dropped. A column is
/// numeric when every non-empty cell is numeric, otherwise its values are
/// carried as strings.
fn sheet_to_frame(
    range: &calamine::Range<Cell>,
    spec: &TableSpec,
) -> Result<Option<DataFrame>, LoadError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        if spec.required {
            return Err(LoadError::EmptyTable { sheet: spec.sheet });
        }
        warn!("{}: sheet is empty, treating as unavailable", spec.sheet);
        return Ok(None);
    };
    let data_rows: Vec<&[Cell]> = rows.collect();

    let mut columns: Vec<Column> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        let Some(label) = header_label(cell) else {
            continue;
        };
        let cells: Vec<&Cell> = data_rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&Cell::Empty))
            .collect();
        columns.push(build_column(&label, &cells));
    }

    if columns.is_empty() {
        if spec.required {
            return Err(LoadError::EmptyTable { sheet: spec.sheet });
        }
        return Ok(None);
    }
    Ok(Some(DataFrame::new(columns)?))
}

fn header_label(cell: &Cell) -> Option<String> {
    let label = match cell {
        Cell::String(s) => s.trim().to_string(),
        Cell::Int(v) => v.to_string(),
        Cell::Float(v) => {
            if v.fract() == 0.0 {
                format!("{}", *v as i64)
            } else {
                v.to_string()
            }
        }
        _ => return None,
    };
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

fn build_column(label: &str, cells: &[&Cell]) -> Column {
    let numeric = cells
        .iter()
        .all(|c| matches!(c, Cell::Int(_) | Cell::Float(_) | Cell::Empty));
    if numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Cell::Int(v) => Some(*v as f64),
                Cell::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        Column::new(label.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| match c {
                Cell::String(s) => Some(s.clone()),
                Cell::Int(v) => Some(v.to_string()),
                Cell::Float(v) => Some(v.to_string()),
                Cell::Bool(v) => Some(v.to_string()),
                Cell::DateTime(v) => Some(v.to_string()),
                Cell::Empty | Cell::Error(_) => None,
            })
            .collect();
        Column::new(label.into(), values)
    }
}

/// Session-owned cache of the loaded bundle.
///
/// The workbook does not change during a session, so repeated render cycles
/// reuse the cached bundle; invalidation is explicit (the Reset action), never
/// time-based.
#[derive(Default)]
pub struct BundleCache {
    path: Option<PathBuf>,
    bundle: Option<Arc<DataBundle>>,
}

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the cache at a workbook, dropping any cached bundle.
    pub fn set_source(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.bundle = None;
    }

    pub fn source(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self) -> Option<Arc<DataBundle>> {
        self.bundle.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    /// Return the cached bundle, loading it from the current source first if
    /// needed.
    pub fn get_or_load(&mut self) -> Result<Arc<DataBundle>, LoadError> {
        if let Some(bundle) = &self.bundle {
            return Ok(bundle.clone());
        }
        let path = self.path.clone().ok_or(LoadError::NoSource)?;
        let bundle = Arc::new(load_workbook(&path)?);
        self.bundle = Some(bundle.clone());
        Ok(bundle)
    }

    /// Install a bundle that was loaded elsewhere (the GUI loads on a
    /// background thread and hands the result over here).
    pub fn store(&mut self, bundle: DataBundle) -> Arc<DataBundle> {
        let bundle = Arc::new(bundle);
        self.bundle = Some(bundle.clone());
        bundle
    }

    pub fn invalidate(&mut self) {
        self.bundle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil;
    use std::io::Write;

    #[test]
    fn unreachable_workbook_is_an_error() {
        let err = load_workbook(Path::new("/no/such/place/data.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnreachable { .. }));
    }

    #[test]
    fn garbage_file_is_unreachable_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-workbook.xlsx");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();

        let err = load_workbook(&path).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnreachable { .. }));
    }

    #[test]
    fn sheet_headers_are_trimmed_and_blank_headers_dropped() {
        let mut range: calamine::Range<Cell> = calamine::Range::new((0, 0), (2, 3));
        range.set_value((0, 0), Cell::String(" Tahun ".to_string()));
        range.set_value((0, 1), Cell::String("Proyeksi Gaji DPR".to_string()));
        // header cell (0, 2) left blank: a spreadsheet artifact column
        range.set_value((0, 3), Cell::String("Keterangan".to_string()));
        range.set_value((1, 0), Cell::Float(2024.0));
        range.set_value((1, 1), Cell::Float(500_000_000.0));
        range.set_value((1, 2), Cell::String("x".to_string()));
        range.set_value((1, 3), Cell::String("naik".to_string()));
        range.set_value((2, 0), Cell::Int(2025));
        range.set_value((2, 1), Cell::Float(800_000_000.0));

        let df = sheet_to_frame(&range, &schema::PROJECTION).unwrap().unwrap();
        let names: Vec<&str> = df.get_columns().iter().map(|c| c.name().as_str()).collect();
        assert_eq!(names, vec!["Tahun", "Proyeksi Gaji DPR", "Keterangan"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn blank_sheet_fails_required_and_skips_optional() {
        let range: calamine::Range<Cell> = calamine::Range::new((0, 0), (1, 1));

        let err = sheet_to_frame(&range, &schema::PROJECTION).unwrap_err();
        assert!(matches!(err, LoadError::EmptyTable { .. }));

        assert!(sheet_to_frame(&range, &schema::ROI).unwrap().is_none());
    }

    #[test]
    fn missing_required_sheet_fails_the_whole_load() {
        let mut raw = testutil::raw_tables();
        raw.remove(schema::ELDERLY_CORRELATION.sheet);

        let err = assemble_bundle(raw).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingTable {
                sheet: "Korelasi Lansia"
            }
        ));
    }

    #[test]
    fn missing_optional_sheets_load_as_unavailable() {
        let mut raw = testutil::raw_tables();
        raw.remove(schema::ROI.sheet);
        raw.remove(schema::CATASTROPHIC_TREND.sheet);
        raw.remove(schema::PENSION_TREND.sheet);

        let bundle = assemble_bundle(raw).unwrap();
        assert!(bundle.roi.is_none());
        assert!(bundle.catastrophic_trend.is_none());
        assert!(bundle.pension_trend.is_none());
        assert!(bundle.projection.height() > 0);
    }

    #[test]
    fn cache_without_a_source_refuses_to_load() {
        let mut cache = BundleCache::new();
        assert!(matches!(cache.get_or_load(), Err(LoadError::NoSource)));
    }

    #[test]
    fn cache_store_get_invalidate_roundtrip() {
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        let mut cache = BundleCache::new();
        cache.set_source(PathBuf::from("session.xlsx"));
        assert!(!cache.is_loaded());

        cache.store(bundle);
        assert!(cache.is_loaded());
        assert!(cache.get().is_some());

        cache.invalidate();
        assert!(cache.get().is_none());

        // Selecting a source again also drops the cached bundle.
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        cache.store(bundle);
        cache.set_source(PathBuf::from("other.xlsx"));
        assert!(!cache.is_loaded());
    }
}
