//! Per-dimension z-score standardization.

use serde::Serialize;

use salesight_core::{AnalyticsError, AnalyticsResult};

use crate::features::FeatureVector;
use crate::stats::{mean, stddev_population};

/// A feature vector after standardization.
pub type NormalizedVector = Vec<f64>;

/// Column statistics fitted on one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalizer {
    pub means: Vec<f64>,
    /// Population standard deviations, before the zero-variance guard.
    pub std_devs: Vec<f64>,
    /// Rows the statistics were fitted on.
    pub samples: usize,
}

impl Normalizer {
    /// Fit column means and population standard deviations.
    pub fn fit(rows: &[FeatureVector]) -> AnalyticsResult<Self> {
        let dims = check_rectangular(rows)?;

        let mut means = Vec::with_capacity(dims);
        let mut std_devs = Vec::with_capacity(dims);
        let mut column = Vec::with_capacity(rows.len());

        for d in 0..dims {
            column.clear();
            column.extend(rows.iter().map(|row| row[d]));
            let m = mean(&column);
            means.push(m);
            std_devs.push(stddev_population(&column, m));
        }

        Ok(Self {
            means,
            std_devs,
            samples: rows.len(),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.means.len()
    }

    /// Whether dimension `d` has zero variance.
    ///
    /// Spread no larger than the summation error of the column mean
    /// (`n * EPSILON * |mean|`) counts as constant.
    pub fn is_constant(&self, d: usize) -> bool {
        let noise = self.samples as f64 * f64::EPSILON * self.means[d].abs();
        self.std_devs[d] <= noise
    }

    /// Divisor actually applied to dimension `d`; a constant column divides by 1.
    pub fn divisor(&self, d: usize) -> f64 {
        if self.is_constant(d) { 1.0 } else { self.std_devs[d] }
    }

    /// Standardize rows with the fitted statistics.
    pub fn transform(&self, rows: &[FeatureVector]) -> AnalyticsResult<Vec<NormalizedVector>> {
        let mut out = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != self.dimensions() {
                return Err(AnalyticsError::validation(format!(
                    "vector {index} has {} dimensions, expected {}",
                    row.len(),
                    self.dimensions()
                )));
            }
            out.push(
                row.iter()
                    .enumerate()
                    .map(|(d, v)| {
                        if self.is_constant(d) {
                            0.0
                        } else {
                            (v - self.means[d]) / self.divisor(d)
                        }
                    })
                    .collect(),
            );
        }
        Ok(out)
    }
}

/// Fit on `rows` and standardize them in one step.
pub fn normalize(rows: &[FeatureVector]) -> AnalyticsResult<Vec<NormalizedVector>> {
    Normalizer::fit(rows)?.transform(rows)
}

fn check_rectangular(rows: &[FeatureVector]) -> AnalyticsResult<usize> {
    let dims = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(index) = rows.iter().position(|row| row.len() != dims) {
        return Err(AnalyticsError::validation(format!(
            "vector {index} has {} dimensions, expected {dims}",
            rows[index].len()
        )));
    }
    Ok(dims)
}
