//! Statistics and earnings rollups over orders and products.
//!
//! Pure functions over record snapshots; callers load the records.

pub mod earnings;
pub mod statistics;

pub use earnings::{EarningRecord, EarningSource, EarningsHistory};
pub use statistics::{
    Granularity, PeriodValue, Statistics, StatisticsKind, StatisticsWindow, order_count_by_period,
    revenue_by_period, statistics,
};
