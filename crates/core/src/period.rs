//! Calendar-month period keys (`YYYY-MM`).

use core::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// A calendar month, ordered chronologically.
///
/// Serialized as `"YYYY-MM"`, which is also the period key format used by the
/// aggregation layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey(NaiveDate);

impl PeriodKey {
    /// Create a key for `year`/`month` (month is 1-based).
    pub fn new(year: i32, month: u32) -> AnalyticsResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AnalyticsError::invalid_period(format!(
                "month must be within 1..=12, got {month}"
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| AnalyticsError::invalid_period(format!("year {year} out of range")))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The key `months` calendar months after this one.
    pub fn offset(&self, months: u32) -> AnalyticsResult<Self> {
        self.0
            .checked_add_months(Months::new(months))
            .map(Self)
            .ok_or_else(|| {
                AnalyticsError::invalid_period(format!("{self} + {months} months overflows"))
            })
    }

    /// The following calendar month.
    pub fn next(&self) -> AnalyticsResult<Self> {
        self.offset(1)
    }
}

impl core::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for PeriodKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| AnalyticsError::invalid_period(format!("expected YYYY-MM, got {s:?}")))?;
        let year: i32 = year
            .parse()
            .map_err(|e| AnalyticsError::invalid_period(format!("year in {s:?}: {e}")))?;
        let month: u32 = month
            .parse()
            .map_err(|e| AnalyticsError::invalid_period(format!("month in {s:?}: {e}")))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = AnalyticsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(value: PeriodKey) -> Self {
        value.to_string()
    }
}
