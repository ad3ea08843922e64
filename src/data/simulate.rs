//! Simulation Transformer Module
//! Applies the policy multiplier to the projection and ROI tables, leaving the
//! input bundle untouched for the unscaled comparison view.

use log::debug;
use polars::prelude::*;
use thiserror::Error;

use super::bundle::DataBundle;
use super::schema::{col, CUTOFF_YEAR};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("simulation multiplier must be positive and finite, got {0}")]
    InvalidMultiplier(f64),
    #[error("table '{table}' is missing column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Produce a bundle where projected salaries for years after the cutoff and
/// every ROI nominal amount are scaled by `multiplier`.
///
/// A non-positive multiplier is a caller bug (the slider clamps its range) and
/// is rejected rather than silently corrected. Multiplier 1.0 returns values
/// numerically equal to the input. Untargeted tables are shared by cheap
/// clone; frames are immutable so no deep copy is needed.
pub fn apply_simulation(
    bundle: &DataBundle,
    multiplier: f64,
) -> Result<DataBundle, SimulationError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(SimulationError::InvalidMultiplier(multiplier));
    }
    debug!("applying simulation multiplier {}", multiplier);

    let projection = scale_projection(&bundle.projection, multiplier)?;
    let roi = match &bundle.roi {
        Some(frame) => Some(scale_roi(frame, multiplier)?),
        None => None,
    };

    Ok(DataBundle {
        salary_comparison: bundle.salary_comparison.clone(),
        elderly_correlation: bundle.elderly_correlation.clone(),
        country_benchmark: bundle.country_benchmark.clone(),
        disease_share: bundle.disease_share.clone(),
        projection,
        roi,
        catastrophic_trend: bundle.catastrophic_trend.clone(),
        pension_trend: bundle.pension_trend.clone(),
    })
}

/// Scale the projected-salary column for rows dated after the cutoff year.
/// History stays fixed; only future years respond to the policy lever.
fn scale_projection(df: &DataFrame, multiplier: f64) -> Result<DataFrame, SimulationError> {
    let years = df
        .column(col::TAHUN)
        .map_err(|_| SimulationError::MissingColumn {
            table: "projection",
            column: col::TAHUN,
        })?
        .cast(&DataType::Int64)?;
    let years = years.i64()?;

    let salaries = df
        .column(col::PROYEKSI_GAJI_JUTA)
        .map_err(|_| SimulationError::MissingColumn {
            table: "projection",
            column: col::PROYEKSI_GAJI_JUTA,
        })?
        .cast(&DataType::Float64)?;
    let salaries = salaries.f64()?;

    let scaled: Vec<Option<f64>> = years
        .into_iter()
        .zip(salaries)
        .map(|(year, salary)| match (year, salary) {
            (Some(y), Some(s)) if y > CUTOFF_YEAR => Some(s * multiplier),
            (_, s) => s,
        })
        .collect();

    replace_column(df, col::PROYEKSI_GAJI_JUTA, scaled)
}

/// Scale every nominal amount uniformly, cost and benefit rows alike, so the
/// ratio between any two components is preserved.
fn scale_roi(df: &DataFrame, multiplier: f64) -> Result<DataFrame, SimulationError> {
    let nominals = df
        .column(col::NOMINAL)
        .map_err(|_| SimulationError::MissingColumn {
            table: "roi",
            column: col::NOMINAL,
        })?
        .cast(&DataType::Float64)?;
    let nominals = nominals.f64()?;

    let scaled: Vec<Option<f64>> = nominals
        .into_iter()
        .map(|v| v.map(|x| x * multiplier))
        .collect();

    replace_column(df, col::NOMINAL, scaled)
}

fn replace_column(
    df: &DataFrame,
    name: &str,
    values: Vec<Option<f64>>,
) -> Result<DataFrame, SimulationError> {
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for c in df.get_columns() {
        if c.name().as_str() == name {
            columns.push(Column::new(name.into(), values.clone()));
        } else {
            columns.push(c.clone());
        }
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::assemble_bundle;
    use crate::data::testutil;

    fn column_values(df: &DataFrame, column: &str) -> Vec<f64> {
        df.column(column)
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    #[test]
    fn multiplier_one_is_the_identity() {
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        let out = apply_simulation(&bundle, 1.0).unwrap();

        assert_eq!(
            column_values(&bundle.projection, col::PROYEKSI_GAJI_JUTA),
            column_values(&out.projection, col::PROYEKSI_GAJI_JUTA)
        );
        assert_eq!(
            column_values(bundle.roi.as_ref().unwrap(), col::NOMINAL),
            column_values(out.roi.as_ref().unwrap(), col::NOMINAL)
        );
    }

    #[test]
    fn only_years_after_the_cutoff_scale() {
        let projection = DataFrame::new(vec![
            Column::new(col::TAHUN.into(), vec![2023i64, 2024, 2027]),
            Column::new(col::PROYEKSI_GAJI_JUTA.into(), vec![500.0, 500.0, 600.0]),
        ])
        .unwrap();
        let mut bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        bundle.projection = projection;

        let out = apply_simulation(&bundle, 2.0).unwrap();
        assert_eq!(
            column_values(&out.projection, col::PROYEKSI_GAJI_JUTA),
            vec![500.0, 1000.0, 1200.0]
        );
    }

    #[test]
    fn roi_rows_scale_uniformly_preserving_ratios() {
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        let before = column_values(bundle.roi.as_ref().unwrap(), col::NOMINAL);

        let out = apply_simulation(&bundle, 2.5).unwrap();
        let after = column_values(out.roi.as_ref().unwrap(), col::NOMINAL);

        for (b, a) in before.iter().zip(&after) {
            assert!((a - b * 2.5).abs() < 1e-9);
        }
        assert!((after[0] / after[1] - before[0] / before[1]).abs() < 1e-12);
    }

    #[test]
    fn untargeted_tables_pass_through_unchanged() {
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        let out = apply_simulation(&bundle, 3.0).unwrap();

        assert!(out.salary_comparison.equals(&bundle.salary_comparison));
        assert!(out.country_benchmark.equals(&bundle.country_benchmark));
        assert!(out.disease_share.equals(&bundle.disease_share));
    }

    #[test]
    fn input_bundle_is_not_mutated() {
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        let before = column_values(&bundle.projection, col::PROYEKSI_GAJI_JUTA);

        let _ = apply_simulation(&bundle, 3.0).unwrap();
        assert_eq!(
            column_values(&bundle.projection, col::PROYEKSI_GAJI_JUTA),
            before
        );
    }

    #[test]
    fn missing_roi_table_stays_unavailable() {
        let mut raw = testutil::raw_tables();
        raw.remove(crate::data::schema::ROI.sheet);
        let bundle = assemble_bundle(raw).unwrap();

        let out = apply_simulation(&bundle, 2.0).unwrap();
        assert!(out.roi.is_none());
    }

    #[test]
    fn non_positive_multipliers_are_rejected() {
        let bundle = assemble_bundle(testutil::raw_tables()).unwrap();
        for m in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = apply_simulation(&bundle, m).unwrap_err();
            assert!(matches!(err, SimulationError::InvalidMultiplier(_)));
        }
    }
}
