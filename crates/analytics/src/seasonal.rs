//! Trend + calendar-month seasonality decomposition of a monthly series.

use serde::Serialize;

use salesight_core::{AnalyticsError, AnalyticsResult, TimeSeriesPoint};

use crate::stats::{mean, stddev_population};

/// Seasonality counts as present when the offsets' spread exceeds this share
/// of mean sales.
pub const SEASONALITY_THRESHOLD: f64 = 0.10;

/// Ordinary least-squares line over the sequence index.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendModel {
    /// Fit `value ~ index` for indices `0..values.len()`.
    ///
    /// A single value yields a flat line through it; no values yield zero.
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len();
        if n < 2 {
            return Self {
                slope: 0.0,
                intercept: values.first().copied().unwrap_or(0.0),
            };
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = mean(values);
        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }

        let slope = sxy / sxx;
        Self {
            slope,
            intercept: y_mean - slope * x_mean,
        }
    }

    pub fn predict(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}

/// Centered per-calendar-month offsets.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SeasonalModel {
    /// Offset for January at `[0]` through December at `[11]`.
    pub offsets: [f64; 12],
    /// Whether the offsets vary enough to call the series seasonal.
    pub seasonal: bool,
}

impl SeasonalModel {
    /// Offset for a calendar month (1..=12); other values get no offset.
    pub fn offset(&self, month: u32) -> f64 {
        month
            .checked_sub(1)
            .and_then(|m| self.offsets.get(m as usize))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Trend and seasonality fitted on one series.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub trend: TrendModel,
    pub seasonal: SeasonalModel,
}

impl Decomposition {
    /// Combined trend + seasonal value at sequence `index` in calendar `month`.
    pub fn fitted(&self, index: f64, month: u32) -> f64 {
        self.trend.predict(index) + self.seasonal.offset(month)
    }
}

/// Split a time-ordered monthly series into a linear trend and centered
/// calendar-month offsets.
pub fn decompose(points: &[TimeSeriesPoint]) -> AnalyticsResult<Decomposition> {
    if points.is_empty() {
        return Err(AnalyticsError::insufficient_data(
            "cannot decompose an empty series",
        ));
    }

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let trend = TrendModel::fit(&values);

    let mut sums = [0.0; 12];
    let mut counts = [0usize; 12];
    for (i, point) in points.iter().enumerate() {
        let slot = (point.month() as usize).saturating_sub(1).min(11);
        sums[slot] += point.value - trend.predict(i as f64);
        counts[slot] += 1;
    }

    let mut offsets = [0.0; 12];
    // Unobserved months keep a raw estimate of zero.
    for ((offset, sum), count) in offsets.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *offset = sum / count as f64;
        }
    }

    let center = mean(&offsets);
    for offset in offsets.iter_mut() {
        *offset -= center;
    }

    let spread = stddev_population(&offsets, mean(&offsets));
    let seasonal = spread > SEASONALITY_THRESHOLD * mean(&values);

    Ok(Decomposition {
        trend,
        seasonal: SeasonalModel { offsets, seasonal },
    })
}
