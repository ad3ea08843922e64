//! Stats module - chart annotation statistics

mod calculator;

pub use calculator::{Correlation, StatsCalculator, TrendLine, SIGNIFICANCE_THRESHOLD};
