//! `salesight-analytics`
//!
//! **Responsibility:** Segmentation and forecasting over pre-aggregated sales
//! and inventory records.
//!
//! - Inputs are caller-supplied snapshots; nothing here reads storage.
//! - Every computation is synchronous and pure, with randomness passed in
//!   explicitly (or created per job run).
//! - Outputs are structured results meant for dashboards and narrative
//!   generation, not text.

pub mod balance;
pub mod config;
pub mod features;
pub mod forecast;
pub mod job;
pub mod kmeans;
pub mod labels;
pub mod normalize;
pub mod result;
pub mod scheduler;
pub mod seasonal;
pub mod segmentation;

mod stats;

pub use balance::{ClusterDraft, balance, rank_and_relabel, split_largest};
pub use config::AnalyticsConfig;
pub use features::{FeatureMatrix, FeatureVector, build_features, feature_names, feature_vector};
pub use forecast::{FitMetrics, FittedPoint, Forecast, ForecastPoint, HistoricalRange, forecast};
pub use job::{AnalyticsJob, ForecastJob, SegmentationJob};
pub use kmeans::{KMeans, KMeansFit};
pub use labels::{SegmentLabel, SellThrough, label_temporal};
pub use normalize::{Normalizer, normalize};
pub use result::Insight;
pub use scheduler::{AnalyticsScheduler, LocalScheduler};
pub use seasonal::{Decomposition, SeasonalModel, TrendModel, decompose};
pub use segmentation::{
    ClusterAssignment, ClusterSummary, FeatureAverage, MIN_CLUSTERS, Segmentation, Segmenter,
    segment,
};

pub use salesight_core::{AnalyticsError, AnalyticsResult};
