//! Monthly sales time series.

use serde::{Deserialize, Serialize};

use crate::period::PeriodKey;
use crate::record::PeriodAggregate;

/// One observed month of sales.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub period: PeriodKey,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(period: PeriodKey, value: f64) -> Self {
        Self { period, value }
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.period.month()
    }

    pub fn year(&self) -> i32 {
        self.period.year()
    }
}

impl From<&PeriodAggregate> for TimeSeriesPoint {
    /// Forecasts run on combined sell-in + sell-out revenue.
    fn from(value: &PeriodAggregate) -> Self {
        Self::new(value.period, value.total_revenue())
    }
}
