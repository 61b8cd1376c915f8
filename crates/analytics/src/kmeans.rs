//! K-means clustering with k-means++ seeding.
//!
//! Model:
//! - Seed the first centroid uniformly, each further one with probability
//!   proportional to its squared distance from the nearest chosen centroid.
//! - Alternate nearest-centroid assignment and mean recomputation until the
//!   assignment vector stops changing or the iteration cap is hit.
//!
//! The random source is always supplied by the caller, so two concurrent fits
//! never share a generator and a seeded generator makes a fit reproducible.

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::normalize::NormalizedVector;
use crate::stats::squared_distance;

/// Default refinement cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Cluster count actually used for `n` records when `k` were requested.
///
/// A batch smaller than `k` falls back to `max(2, n / 2)`.
pub fn effective_k(n: usize, k: usize) -> usize {
    if n < k { (n / 2).max(2) } else { k }
}

/// K-means parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KMeans {
    k: usize,
    max_iterations: usize,
}

/// Outcome of one k-means fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KMeansFit {
    /// Cluster id per input point, in input order.
    pub assignments: Vec<usize>,
    /// One centroid per cluster slot; slots that lost every member keep their
    /// last position.
    pub centroids: Vec<Vec<f64>>,
    /// Assignment passes performed.
    pub iterations: usize,
    /// `false` when the iteration cap was reached first.
    pub converged: bool,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

impl KMeansFit {
    fn empty() -> Self {
        Self {
            assignments: Vec::new(),
            centroids: Vec::new(),
            iterations: 0,
            converged: true,
            inertia: 0.0,
        }
    }

    /// Member count per cluster slot (empty slots included).
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &label in &self.assignments {
            if label < sizes.len() {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Partition `points` into `k` clusters.
    ///
    /// An empty batch or `k == 0` yields an empty fit.
    pub fn fit<R: Rng + ?Sized>(&self, points: &[NormalizedVector], rng: &mut R) -> KMeansFit {
        if points.is_empty() || self.k == 0 {
            return KMeansFit::empty();
        }

        let mut centroids = seed_centroids(points, self.k, rng);
        let mut assignments = Vec::new();
        let mut previous: Option<Vec<usize>> = None;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations.max(1) {
            iterations += 1;
            assignments = assign(points, &centroids);

            if previous.as_ref() == Some(&assignments) {
                converged = true;
                break;
            }

            update_centroids(points, &assignments, &mut centroids);
            previous = Some(assignments.clone());
        }

        let inertia = inertia(points, &assignments, &centroids);
        debug!(
            k = self.k,
            points = points.len(),
            iterations,
            converged,
            inertia,
            "k-means fit finished"
        );

        KMeansFit {
            assignments,
            centroids,
            iterations,
            converged,
            inertia,
        }
    }
}

/// k-means++ seeding.
fn seed_centroids<R: Rng + ?Sized>(
    points: &[NormalizedVector],
    k: usize,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)].clone());

    // Squared distance from each point to its nearest chosen centroid.
    let mut nearest = vec![f64::INFINITY; n];

    while centroids.len() < k {
        let latest = &centroids[centroids.len() - 1];
        for (i, point) in points.iter().enumerate() {
            let d = squared_distance(point, latest);
            if d < nearest[i] {
                nearest[i] = d;
            }
        }

        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 && total.is_finite() {
            sample_weighted(&nearest, total, rng)
        } else {
            // Every point coincides with a chosen centroid.
            rng.gen_range(0..n)
        };
        centroids.push(points[next].clone());
    }

    centroids
}

/// Draw an index with probability `weights[i] / total`.
fn sample_weighted<R: Rng + ?Sized>(weights: &[f64], total: f64, rng: &mut R) -> usize {
    let mut target = rng.gen_range(0.0..total);
    for (i, &w) in weights.iter().enumerate() {
        if target < w {
            return i;
        }
        target -= w;
    }
    // Float drift past the last bucket.
    weights.iter().rposition(|&w| w > 0.0).unwrap_or(0)
}

/// Nearest centroid per point; ties go to the lowest cluster id.
fn assign(points: &[NormalizedVector], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (idx, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(point, centroid);
                if d < best_distance {
                    best_distance = d;
                    best = idx;
                }
            }
            best
        })
        .collect()
}

/// Move each centroid to the mean of its members; memberless centroids stay put.
fn update_centroids(
    points: &[NormalizedVector],
    assignments: &[usize],
    centroids: &mut [Vec<f64>],
) {
    let dims = points.first().map(Vec::len).unwrap_or(0);
    let mut sums = vec![vec![0.0; dims]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (s, v) in sums[cluster].iter_mut().zip(point) {
            *s += v;
        }
    }

    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count == 0 {
            continue;
        }
        *centroid = sum.into_iter().map(|s| s / count as f64).collect();
    }
}

fn inertia(points: &[NormalizedVector], assignments: &[usize], centroids: &[Vec<f64>]) -> f64 {
    points
        .iter()
        .zip(assignments)
        .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
        .sum()
}
