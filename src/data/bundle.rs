//! Table Bundle Module
//! The fixed set of normalized tables every view reads from.

use polars::prelude::*;

/// Normalized tables loaded from one workbook.
///
/// Built once per load and treated as immutable afterwards; the simulation
/// transformer returns a fresh bundle instead of mutating this one, so the
/// unscaled data stays available for comparison views. Optional tables that
/// were absent from the workbook are `None`, and every consumer renders that
/// as a "data not available" state.
#[derive(Debug, Clone)]
pub struct DataBundle {
    pub salary_comparison: DataFrame,
    pub elderly_correlation: DataFrame,
    pub country_benchmark: DataFrame,
    pub disease_share: DataFrame,
    pub projection: DataFrame,
    pub roi: Option<DataFrame>,
    pub catastrophic_trend: Option<DataFrame>,
    pub pension_trend: Option<DataFrame>,
}
