//! `salesight-core`
//!
//! **Responsibility:** Data contracts shared by the analytics engine.
//!
//! This crate contains **pure data** primitives (no algorithms, no I/O):
//! pre-aggregated records handed over by the data provider, calendar-month
//! period keys, time-series points and the error model.

pub mod error;
pub mod period;
pub mod record;
pub mod series;

pub use error::{AnalyticsError, AnalyticsResult};
pub use period::PeriodKey;
pub use record::{
    BranchAggregate, CategoryTotals, FeatureRecord, PeriodAggregate, ProductAggregate, RecordKind,
};
pub use series::TimeSeriesPoint;
