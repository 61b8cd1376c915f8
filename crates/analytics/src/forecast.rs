//! Monthly sales forecast from trend + seasonality.
//!
//! Model:
//! - Decompose the series into an OLS trend over the sequence index and
//!   centered calendar-month offsets.
//! - Project `trend(index) + offset(month)` for each future month.
//! - Band each estimate by ±1.96 residual standard deviations of the
//!   in-sample combined fit.
//!
//! No randomness: identical input and horizon give identical output.

use serde::Serialize;
use tracing::debug;

use salesight_core::{AnalyticsError, AnalyticsResult, PeriodKey, TimeSeriesPoint};

use crate::seasonal::{Decomposition, decompose};
use crate::stats::{mean, stddev_population};

/// Months projected when the caller does not say otherwise.
pub const DEFAULT_HORIZON: usize = 3;

/// Longest projection accepted, in months.
pub const MAX_HORIZON: u32 = 120;

/// Observed months echoed back with their fitted values.
pub const HISTORY_WINDOW: usize = 12;

/// Two-sided 95% normal quantile.
const Z_95: f64 = 1.96;

/// An observed month next to its in-sample fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedPoint {
    pub period: PeriodKey,
    pub actual: f64,
    /// Trend + seasonal value, floored at zero.
    pub fitted: f64,
}

/// A projected month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub period: PeriodKey,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    /// Confidence percentage in `[0, 100]`.
    pub confidence: f64,
}

/// Goodness of fit of the combined trend + seasonal model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitMetrics {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub rmse: f64,
    /// Population standard deviation of in-sample residuals.
    pub residual_std_dev: f64,
    pub seasonal: bool,
}

/// Reference band of typical monthly totals (mean ± 2σ, floored at zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRange {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Forecast bundle consumed by charts and narrative generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub historical: Vec<FittedPoint>,
    pub predictions: Vec<ForecastPoint>,
    pub metrics: FitMetrics,
    pub range: HistoricalRange,
    pub decomposition: Decomposition,
}

/// Project `horizon` months past the end of `points`.
///
/// `points` must be strictly increasing by period, finite, and at least two
/// long. `horizon` may not exceed [`MAX_HORIZON`].
pub fn forecast(points: &[TimeSeriesPoint], horizon: usize) -> AnalyticsResult<Forecast> {
    validate(points, horizon)?;

    let decomposition = decompose(points)?;
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let fitted: Vec<f64> = points
        .iter()
        .enumerate()
        .map(|(i, p)| decomposition.fitted(i as f64, p.month()))
        .collect();

    let residuals: Vec<f64> = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();
    let rmse = (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt();
    let residual_std_dev = stddev_population(&residuals, mean(&residuals));
    let band = Z_95 * residual_std_dev;

    let metrics = FitMetrics {
        slope: decomposition.trend.slope,
        intercept: decomposition.trend.intercept,
        r_squared: r_squared(&values, &fitted),
        rmse,
        residual_std_dev,
        seasonal: decomposition.seasonal.seasonal,
    };

    let start = points.len().saturating_sub(HISTORY_WINDOW);
    let historical = points[start..]
        .iter()
        .zip(&fitted[start..])
        .map(|(p, &f)| FittedPoint {
            period: p.period,
            actual: p.value,
            fitted: f.max(0.0),
        })
        .collect();

    let last_index = points.len() - 1;
    let last_period = points[last_index].period;
    let mut predictions = Vec::with_capacity(horizon);
    for step in (1..=MAX_HORIZON).take(horizon) {
        let period = last_period.offset(step)?;
        let raw = decomposition.fitted(last_index as f64 + f64::from(step), period.month());
        let estimate = raw.max(0.0);

        predictions.push(ForecastPoint {
            period,
            estimate,
            lower: (estimate - band).max(0.0),
            upper: estimate + band,
            confidence: confidence(rmse, estimate),
        });
    }

    let range = historical_range(&values);

    debug!(
        points = points.len(),
        horizon,
        r_squared = metrics.r_squared,
        rmse,
        seasonal = metrics.seasonal,
        "forecast computed"
    );

    Ok(Forecast {
        historical,
        predictions,
        metrics,
        range,
        decomposition,
    })
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Negative when the fit is worse than predicting the mean. A constant series
/// scores 1 when fitted exactly and 0 otherwise.
pub fn r_squared(actual: &[f64], fitted: &[f64]) -> f64 {
    let y_mean = mean(actual);
    let ss_res: f64 = actual.iter().zip(fitted).map(|(y, f)| (y - f).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|y| (y - y_mean).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res <= f64::EPSILON {
        1.0
    } else {
        0.0
    }
}

fn confidence(rmse: f64, estimate: f64) -> f64 {
    if estimate == 0.0 {
        return if rmse == 0.0 { 100.0 } else { 0.0 };
    }
    (100.0 - (rmse / estimate.abs()) * 100.0).clamp(0.0, 100.0)
}

fn historical_range(values: &[f64]) -> HistoricalRange {
    let m = mean(values);
    let s = stddev_population(values, m);
    HistoricalRange {
        mean: m,
        lower: (m - 2.0 * s).max(0.0),
        upper: m + 2.0 * s,
    }
}

fn validate(points: &[TimeSeriesPoint], horizon: usize) -> AnalyticsResult<()> {
    if horizon > MAX_HORIZON as usize {
        return Err(AnalyticsError::validation(format!(
            "horizon {horizon} exceeds {MAX_HORIZON} months"
        )));
    }
    if points.len() < 2 {
        return Err(AnalyticsError::insufficient_data(format!(
            "forecast needs at least 2 monthly points, got {}",
            points.len()
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
        return Err(AnalyticsError::validation(format!(
            "value for {} is not finite",
            p.period
        )));
    }
    if let Some(w) = points.windows(2).find(|w| w[0].period >= w[1].period) {
        return Err(AnalyticsError::validation(format!(
            "series is not strictly increasing: {} then {}",
            w[0].period, w[1].period
        )));
    }
    Ok(())
}
