//! Segmentation pipeline: features → normalizer → k-means → balancer → labels.
//!
//! The output shape is stable (fixed field names/types): chart rendering and
//! narrative generation both consume it and look segments up by name.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use salesight_core::{AnalyticsError, AnalyticsResult, CategoryTotals, FeatureRecord, RecordKind};

use crate::balance::{
    ClusterDraft, average_metric, balance, drafts_from_assignments, rank_and_relabel,
};
use crate::features::{FeatureMatrix, build_features};
use crate::kmeans::{DEFAULT_MAX_ITERATIONS, KMeans, effective_k};
use crate::labels::{SegmentLabel, SellThrough, label_temporal, ranked_name};
use crate::normalize::{NormalizedVector, normalize};
use crate::stats::mean;

/// Cluster membership of one input record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    /// Position of the record in the input batch.
    pub index: usize,
    /// Period (`YYYY-MM`) or entity name.
    pub key: String,
    pub cluster: usize,
}

/// Average of one raw (un-normalized) feature over a cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureAverage {
    pub feature: &'static str,
    pub value: f64,
}

/// One final, named segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub id: usize,
    pub name: String,
    /// Behaviour label for temporal segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<SegmentLabel>,
    pub member_count: usize,
    /// Mean ranking metric (total sales) of the members.
    pub average_sales: f64,
    pub feature_averages: Vec<FeatureAverage>,
    /// Every member key, highest sales first.
    pub members: Vec<String>,
    /// Mean normalized vector of the members.
    pub centroid: Vec<f64>,
    /// Category totals summed over member periods (temporal only).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryTotals>,
}

impl ClusterSummary {
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.feature_averages
            .iter()
            .find(|f| f.feature == name)
            .map(|f| f.value)
    }
}

/// Result of one segmentation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    /// `None` for an empty batch.
    pub kind: Option<RecordKind>,
    pub requested_clusters: usize,
    /// Cluster count handed to k-means after shrinking for small batches.
    pub effective_clusters: usize,
    pub assignments: Vec<ClusterAssignment>,
    /// Segments ordered by average sales, descending; `clusters[i].id == i`.
    pub clusters: Vec<ClusterSummary>,
    pub iterations: usize,
    pub converged: bool,
    pub inertia: f64,
}

impl Segmentation {
    fn empty(requested_clusters: usize) -> Self {
        Self {
            kind: None,
            requested_clusters,
            effective_clusters: 0,
            assignments: Vec::new(),
            clusters: Vec::new(),
            iterations: 0,
            converged: true,
            inertia: 0.0,
        }
    }

    /// First segment with the given display name.
    ///
    /// Temporal names come from a behaviour label and can repeat across
    /// segments; use [`Segmentation::cluster_by_id`] to reach each one.
    pub fn cluster(&self, name: &str) -> Option<&ClusterSummary> {
        self.clusters.iter().find(|c| c.name == name)
    }

    /// Segment with the given id (its rank, 0 = highest average sales).
    pub fn cluster_by_id(&self, id: usize) -> Option<&ClusterSummary> {
        self.clusters.get(id).filter(|c| c.id == id)
    }

    /// Sum of reported member counts.
    pub fn total_members(&self) -> usize {
        self.clusters.iter().map(|c| c.member_count).sum()
    }
}

/// Smallest target segment count.
pub const MIN_CLUSTERS: usize = 2;

/// Segmentation parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Segmenter {
    target_clusters: usize,
    max_iterations: usize,
}

impl Segmenter {
    pub fn new(target_clusters: usize) -> Self {
        Self {
            target_clusters,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Segment one batch of records of a single kind.
    ///
    /// An empty batch yields an empty result; a single record cannot be
    /// partitioned and yields [`AnalyticsError::InsufficientData`].
    pub fn run<R: Rng + ?Sized>(
        &self,
        records: &[FeatureRecord],
        rng: &mut R,
    ) -> AnalyticsResult<Segmentation> {
        if self.target_clusters < MIN_CLUSTERS {
            return Err(AnalyticsError::validation(format!(
                "target cluster count must be at least {MIN_CLUSTERS}, got {}",
                self.target_clusters
            )));
        }

        let matrix = build_features(records)?;
        let Some(kind) = matrix.kind else {
            return Ok(Segmentation::empty(self.target_clusters));
        };

        let n = matrix.len();
        if n < 2 {
            return Err(AnalyticsError::insufficient_data(format!(
                "{n} {kind} record(s) cannot be partitioned into at least 2 clusters"
            )));
        }

        let k = effective_k(n, self.target_clusters);
        if k != self.target_clusters {
            warn!(
                kind = %kind,
                records = n,
                requested = self.target_clusters,
                effective = k,
                "fewer records than clusters; reducing cluster count"
            );
        }

        let normalized = normalize(&matrix.rows)?;
        let fit = KMeans::new(k)
            .with_max_iterations(self.max_iterations)
            .fit(&normalized, rng);

        let ranking: Vec<f64> = records.iter().map(FeatureRecord::ranking_metric).collect();
        let natural = drafts_from_assignments(&fit.assignments, fit.centroids.len());
        let natural_count = natural.len();
        let (clusters, ids) = rank_and_relabel(balance(natural, k, &ranking), &ranking, n);
        debug!(
            kind = %kind,
            natural = natural_count,
            balanced = clusters.len(),
            "clusters balanced"
        );

        let assignments = records
            .iter()
            .zip(&ids)
            .enumerate()
            .map(|(index, (record, &cluster))| ClusterAssignment {
                index,
                key: record.key(),
                cluster,
            })
            .collect();

        let summaries = clusters
            .iter()
            .enumerate()
            .map(|(id, draft)| summarize(id, kind, draft, records, &matrix, &normalized, &ranking))
            .collect();

        Ok(Segmentation {
            kind: Some(kind),
            requested_clusters: self.target_clusters,
            effective_clusters: k,
            assignments,
            clusters: summaries,
            iterations: fit.iterations,
            converged: fit.converged,
            inertia: fit.inertia,
        })
    }
}

/// Segment `records` into `target_clusters` named segments.
pub fn segment<R: Rng + ?Sized>(
    records: &[FeatureRecord],
    target_clusters: usize,
    rng: &mut R,
) -> AnalyticsResult<Segmentation> {
    Segmenter::new(target_clusters).run(records, rng)
}

fn summarize(
    id: usize,
    kind: RecordKind,
    draft: &ClusterDraft,
    records: &[FeatureRecord],
    matrix: &FeatureMatrix,
    normalized: &[NormalizedVector],
    ranking: &[f64],
) -> ClusterSummary {
    let averages = column_means(&matrix.rows, &draft.members);
    let feature_averages = matrix
        .columns
        .iter()
        .zip(&averages)
        .map(|(&feature, &value)| FeatureAverage { feature, value })
        .collect();

    let (name, label) = match kind {
        RecordKind::Temporal => {
            // Temporal columns start with sell-in and sell-out revenue.
            let stats = SellThrough::new(averages[0], averages[1]);
            let label = label_temporal(&stats);
            (label.to_string(), Some(label))
        }
        RecordKind::Product | RecordKind::Branch => (ranked_name(kind, id), None),
    };

    let mut categories: BTreeMap<String, CategoryTotals> = BTreeMap::new();
    for &member in &draft.members {
        if let Some(FeatureRecord::Temporal(period)) = records.get(member) {
            for (category, totals) in &period.categories {
                categories.entry(category.clone()).or_default().accumulate(totals);
            }
        }
    }

    ClusterSummary {
        id,
        name,
        label,
        member_count: draft.member_count,
        average_sales: average_metric(&draft.members, ranking),
        feature_averages,
        members: draft
            .members
            .iter()
            .filter_map(|&i| records.get(i).map(FeatureRecord::key))
            .collect(),
        centroid: column_means(normalized, &draft.members),
        categories,
    }
}

/// Per-column mean of the selected rows.
fn column_means(rows: &[Vec<f64>], members: &[usize]) -> Vec<f64> {
    let dims = rows.first().map(Vec::len).unwrap_or(0);
    (0..dims)
        .map(|d| {
            let column: Vec<f64> = members
                .iter()
                .filter_map(|&i| rows.get(i).map(|row| row[d]))
                .collect();
            mean(&column)
        })
        .collect()
}
