use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use salesight_core::{AnalyticsResult, FeatureRecord, PeriodAggregate, RecordKind, TimeSeriesPoint};

use crate::config::AnalyticsConfig;
use crate::forecast::{Forecast, forecast};
use crate::segmentation::{Segmentation, Segmenter};

/// A self-contained analytics computation over a caller-supplied snapshot.
///
/// Jobs never mutate their input; running the same job twice with the same
/// seed yields the same output.
pub trait AnalyticsJob: Send + Sync + 'static {
    type Output: Serialize;

    /// Stable job name, used in logs and insights.
    fn name(&self) -> &'static str;

    fn run(&self) -> AnalyticsResult<Self::Output>;

    /// Human-readable one-line summary of `output`.
    fn explain(&self, output: &Self::Output) -> String;
}

/// Segment one batch of records.
#[derive(Debug, Clone)]
pub struct SegmentationJob {
    records: Vec<FeatureRecord>,
    target_clusters: Option<usize>,
    seed: Option<u64>,
    config: AnalyticsConfig,
}

impl SegmentationJob {
    pub fn new(records: Vec<FeatureRecord>) -> Self {
        Self::from_config(records, &AnalyticsConfig::default())
    }

    /// Job using `config` for the per-kind target, iteration cap and seed.
    pub fn from_config(records: Vec<FeatureRecord>, config: &AnalyticsConfig) -> Self {
        Self {
            records,
            target_clusters: None,
            seed: config.seed,
            config: config.clone(),
        }
    }

    pub fn with_target_clusters(mut self, target_clusters: usize) -> Self {
        self.target_clusters = Some(target_clusters);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Requested segment count: explicit, else the config default for the
    /// batch's kind.
    pub fn target_clusters(&self) -> usize {
        self.target_clusters.unwrap_or_else(|| {
            let kind = self.records.first().map(FeatureRecord::kind).unwrap_or(RecordKind::Product);
            self.config.target_clusters(kind)
        })
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl AnalyticsJob for SegmentationJob {
    type Output = Segmentation;

    fn name(&self) -> &'static str {
        "segmentation"
    }

    fn run(&self) -> AnalyticsResult<Segmentation> {
        let mut rng = self.rng();
        Segmenter::new(self.target_clusters())
            .with_max_iterations(self.config.max_iterations)
            .run(&self.records, &mut rng)
    }

    fn explain(&self, output: &Segmentation) -> String {
        let Some(kind) = output.kind else {
            return "No records to segment.".to_string();
        };
        let segments: Vec<String> = output
            .clusters
            .iter()
            .map(|c| format!("{} ({})", c.name, c.member_count))
            .collect();
        format!(
            "Grouped {} {kind} records into {} segments: {}.",
            output.total_members(),
            output.clusters.len(),
            segments.join(", ")
        )
    }
}

/// Project monthly totals forward.
#[derive(Debug, Clone)]
pub struct ForecastJob {
    points: Vec<TimeSeriesPoint>,
    horizon: usize,
}

impl ForecastJob {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        Self::from_config(points, &AnalyticsConfig::default())
    }

    pub fn from_config(points: Vec<TimeSeriesPoint>, config: &AnalyticsConfig) -> Self {
        Self {
            points,
            horizon: config.forecast_horizon,
        }
    }

    /// Forecast combined sell-in + sell-out revenue per month.
    pub fn from_periods(periods: &[PeriodAggregate]) -> Self {
        Self::new(periods.iter().map(TimeSeriesPoint::from).collect())
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

impl AnalyticsJob for ForecastJob {
    type Output = Forecast;

    fn name(&self) -> &'static str {
        "forecast"
    }

    fn run(&self) -> AnalyticsResult<Forecast> {
        forecast(&self.points, self.horizon)
    }

    fn explain(&self, output: &Forecast) -> String {
        let (Some(first), Some(last)) = (output.predictions.first(), output.predictions.last())
        else {
            return format!("Fitted {} months; no months projected.", self.points.len());
        };
        let direction = if output.metrics.slope >= 0.0 { "up" } else { "down" };
        let seasonality = if output.metrics.seasonal { "seasonal" } else { "no clear seasonality" };
        format!(
            "Projected {} months ({} to {}); trend {direction} {:.2}/month, {seasonality}, \
             R² {:.2}.",
            output.predictions.len(),
            first.period,
            last.period,
            output.metrics.slope.abs(),
            output.metrics.r_squared
        )
    }
}
