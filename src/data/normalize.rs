//! Table Normalization Module
//! Year coercion, key-label cleanup, and the magnitude heuristic that brings
//! monetary columns to a consistent unit.

use log::debug;
use polars::prelude::*;

use super::loader::LoadError;
use super::schema::{KeyColumn, ScaleStat, TableSpec, UnitRule};

/// Run the normalization steps a table's spec asks for, in pipeline order:
/// year coercion (dropping rows that fail), unit scaling, key cleanup.
pub(crate) fn normalize_table(df: DataFrame, spec: &TableSpec) -> Result<DataFrame, LoadError> {
    let mut df = df;
    if let Some(column) = spec.year_column {
        df = coerce_year_rows(&df, spec.sheet, column)?;
    }
    if let Some(rule) = &spec.unit_rule {
        df = apply_unit_rule(&df, spec.sheet, rule)?;
    }
    if let Some(key) = &spec.key_column {
        df = clean_key_column(&df, spec.sheet, key)?;
    }
    Ok(df)
}

/// Replace the year column with an integer column, keeping only rows where a
/// year could actually be read.
fn coerce_year_rows(
    df: &DataFrame,
    sheet: &'static str,
    column: &'static str,
) -> Result<DataFrame, LoadError> {
    let source = df
        .column(column)
        .map_err(|_| LoadError::MissingColumn { sheet, column })?;

    let mut keep: Vec<bool> = Vec::with_capacity(df.height());
    let mut years: Vec<i64> = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let year = source.get(i).ok().and_then(|av| cell_year(&av));
        match year {
            Some(y) => {
                keep.push(true);
                years.push(y);
            }
            None => keep.push(false),
        }
    }

    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped > 0 {
        debug!("{}: dropped {} rows without a usable {}", sheet, dropped, column);
    }

    let mask = BooleanChunked::from_slice("year_mask".into(), &keep);
    let mut out = df.filter(&mask)?;
    out.with_column(Column::new(column.into(), years))?;
    Ok(out)
}

/// Apply the threshold heuristic to a monetary column and rename it with its
/// unit suffix. Accepts the column under either its raw or already-renamed
/// label, so reloading pre-normalized data is a no-op apart from the rename.
fn apply_unit_rule(
    df: &DataFrame,
    sheet: &'static str,
    rule: &UnitRule,
) -> Result<DataFrame, LoadError> {
    let present = if df.column(rule.column).is_ok() {
        rule.column
    } else if df.column(rule.renamed).is_ok() {
        rule.renamed
    } else {
        return Err(LoadError::MissingColumn {
            sheet,
            column: rule.column,
        });
    };

    let values = df.column(present)?.cast(&DataType::Float64)?;
    let ca = values.f64()?;
    let stat_value = match rule.stat {
        ScaleStat::Mean => ca.mean(),
        ScaleStat::Max => ca.max(),
    };

    let divisor = match stat_value {
        Some(v) if rule.triggers(v) => {
            debug!(
                "{}: {} {:?}={:.0} clears threshold, dividing by {}",
                sheet, present, rule.stat, v, rule.divisor
            );
            rule.divisor
        }
        _ => 1.0,
    };

    let scaled: Vec<Option<f64>> = ca.into_iter().map(|v| v.map(|x| x / divisor)).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for c in df.get_columns() {
        if c.name().as_str() == present {
            columns.push(Column::new(rule.renamed.into(), scaled.clone()));
        } else {
            columns.push(c.clone());
        }
    }
    Ok(DataFrame::new(columns)?)
}

/// Collapse whitespace runs in an identifying label column so values work as
/// exact-match keys, dropping rows without a label when the column is marked
/// `drop_missing`.
fn clean_key_column(
    df: &DataFrame,
    sheet: &'static str,
    key: &KeyColumn,
) -> Result<DataFrame, LoadError> {
    let source = df.column(key.column).map_err(|_| LoadError::MissingColumn {
        sheet,
        column: key.column,
    })?;

    let mut keep: Vec<bool> = Vec::with_capacity(df.height());
    let mut labels: Vec<Option<String>> = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let label = source.get(i).ok().and_then(|av| cell_label(&av));
        match label {
            Some(l) => {
                keep.push(true);
                labels.push(Some(l));
            }
            None if key.drop_missing => keep.push(false),
            None => {
                keep.push(true);
                labels.push(None);
            }
        }
    }

    let mask = BooleanChunked::from_slice("key_mask".into(), &keep);
    let mut out = df.filter(&mask)?;
    out.with_column(Column::new(key.column.into(), labels))?;
    Ok(out)
}

fn cell_year(av: &AnyValue) -> Option<i64> {
    match av {
        AnyValue::Int8(v) => Some(*v as i64),
        AnyValue::Int16(v) => Some(*v as i64),
        AnyValue::Int32(v) => Some(*v as i64),
        AnyValue::Int64(v) => Some(*v),
        AnyValue::UInt8(v) => Some(*v as i64),
        AnyValue::UInt16(v) => Some(*v as i64),
        AnyValue::UInt32(v) => Some(*v as i64),
        AnyValue::UInt64(v) => Some(*v as i64),
        AnyValue::Float32(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
        AnyValue::Float64(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
        AnyValue::String(s) => s.trim().parse().ok(),
        AnyValue::StringOwned(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_label(av: &AnyValue) -> Option<String> {
    let raw = match av {
        AnyValue::Null => return None,
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    };
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{self, col};

    fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column)
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn projection_frame(salaries: Vec<f64>) -> DataFrame {
        let years: Vec<i64> = (0..salaries.len()).map(|i| 2024 + i as i64).collect();
        DataFrame::new(vec![
            Column::new(col::TAHUN.into(), years),
            Column::new(col::PROYEKSI_GAJI.into(), salaries),
        ])
        .unwrap()
    }

    #[test]
    fn salary_column_normalizes_to_millions_and_renames() {
        let df = projection_frame(vec![2_000_000_000.0, 2_200_000_000.0]);
        let out = normalize_table(df, &schema::PROJECTION).unwrap();

        assert!(out.column(col::PROYEKSI_GAJI).is_err());
        assert_eq!(
            f64_values(&out, col::PROYEKSI_GAJI_JUTA),
            vec![Some(2000.0), Some(2200.0)]
        );
    }

    #[test]
    fn unit_rule_is_idempotent() {
        let df = projection_frame(vec![2_000_000_000.0, 2_200_000_000.0]);
        let once = normalize_table(df, &schema::PROJECTION).unwrap();
        let twice = normalize_table(once.clone(), &schema::PROJECTION).unwrap();

        assert_eq!(
            f64_values(&once, col::PROYEKSI_GAJI_JUTA),
            f64_values(&twice, col::PROYEKSI_GAJI_JUTA)
        );
    }

    #[test]
    fn small_salary_values_are_left_alone() {
        // Already expressed in millions; the mean sits far below the threshold.
        let df = projection_frame(vec![500.0, 600.0]);
        let out = normalize_table(df, &schema::PROJECTION).unwrap();

        assert_eq!(
            f64_values(&out, col::PROYEKSI_GAJI_JUTA),
            vec![Some(500.0), Some(600.0)]
        );
    }

    #[test]
    fn values_at_the_threshold_are_not_scaled() {
        // The rule is strictly greater-than, so a mean sitting exactly on the
        // threshold stays put.
        let df = projection_frame(vec![1_000_000.0, 1_000_000.0]);
        let out = normalize_table(df, &schema::PROJECTION).unwrap();

        assert_eq!(
            f64_values(&out, col::PROYEKSI_GAJI_JUTA),
            vec![Some(1_000_000.0), Some(1_000_000.0)]
        );
    }

    #[test]
    fn benchmark_secondary_threshold_still_lands_in_billions() {
        // Sub-billion full-rupiah figures must trip the secondary threshold.
        let df = DataFrame::new(vec![
            Column::new(col::NEGARA.into(), vec!["Indonesia", "Australia"]),
            Column::new(col::GAJI_PEJABAT.into(), vec![150_000_000.0, 658_000_000.0]),
        ])
        .unwrap();
        let out = normalize_table(df, &schema::COUNTRY_BENCHMARK).unwrap();

        assert_eq!(
            f64_values(&out, col::GAJI_PEJABAT_MILIAR),
            vec![Some(0.15), Some(0.658)]
        );
    }

    #[test]
    fn rows_without_a_year_are_dropped() {
        let df = DataFrame::new(vec![
            Column::new(
                col::TAHUN.into(),
                vec![Some("2023"), None, Some("n/a"), Some("2024")],
            ),
            Column::new(
                col::LANSIA_JUTA.into(),
                vec![Some(11.0), Some(11.5), Some(12.0), Some(12.4)],
            ),
        ])
        .unwrap();
        let out = normalize_table(df, &schema::ELDERLY_CORRELATION).unwrap();

        assert_eq!(out.height(), 2);
        let years: Vec<Option<i64>> = out
            .column(col::TAHUN)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(years, vec![Some(2023), Some(2024)]);
        assert_eq!(
            f64_values(&out, col::LANSIA_JUTA),
            vec![Some(11.0), Some(12.4)]
        );
    }

    #[test]
    fn key_labels_collapse_whitespace_and_missing_rows_drop() {
        let df = DataFrame::new(vec![
            Column::new(
                col::JENIS_PENYAKIT.into(),
                vec![Some("  Jantung   Koroner "), Some("Kanker"), None],
            ),
            Column::new(
                col::BIAYA_TRILIUN.into(),
                vec![Some(12.1), Some(4.5), Some(1.0)],
            ),
        ])
        .unwrap();
        let out = normalize_table(df, &schema::DISEASE_SHARE).unwrap();

        assert_eq!(out.height(), 2);
        let labels: Vec<Option<String>> = (0..out.height())
            .map(|i| {
                out.column(col::JENIS_PENYAKIT)
                    .unwrap()
                    .get(i)
                    .ok()
                    .and_then(|av| cell_label(&av))
            })
            .collect();
        assert_eq!(
            labels,
            vec![Some("Jantung Koroner".to_string()), Some("Kanker".to_string())]
        );
    }

    #[test]
    fn missing_monetary_column_is_an_error() {
        let df = DataFrame::new(vec![Column::new(
            col::NEGARA.into(),
            vec!["Indonesia", "Singapura"],
        )])
        .unwrap();
        let err = normalize_table(df, &schema::COUNTRY_BENCHMARK).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }
}
