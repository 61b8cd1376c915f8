//! Forcing a natural k-means partition to a fixed display count.
//!
//! Dashboards show an exact number of named segments, but k-means may leave
//! slots empty. The balancer repeatedly splits the largest cluster into the
//! top and bottom halves of its members (by ranking metric) until the target
//! count is reached or nothing is left to split.
//!
//! Every function here is pure: it takes a cluster list and returns a new one.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::stats::mean;

/// A cluster under construction: member record indices plus the reported count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterDraft {
    pub members: Vec<usize>,
    pub member_count: usize,
}

impl ClusterDraft {
    pub fn new(members: Vec<usize>) -> Self {
        let member_count = members.len();
        Self {
            members,
            member_count,
        }
    }

    fn is_splittable(&self) -> bool {
        self.members.len() > 1
    }
}

/// Group record indices by cluster slot, dropping empty slots.
///
/// Drafts keep slot order; members keep input order.
pub fn drafts_from_assignments(assignments: &[usize], slots: usize) -> Vec<ClusterDraft> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); slots];
    for (index, &slot) in assignments.iter().enumerate() {
        if let Some(bucket) = members.get_mut(slot) {
            bucket.push(index);
        }
    }
    members
        .into_iter()
        .filter(|m| !m.is_empty())
        .map(ClusterDraft::new)
        .collect()
}

/// Split the largest splittable cluster into top/bottom halves.
///
/// Returns a new list where the chosen cluster is replaced by its top half and
/// the bottom half is appended, or `None` when no cluster has more than one
/// member. Reported counts are split by the halves' share of the membership;
/// the bottom half takes the remainder so the total is preserved exactly.
pub fn split_largest(clusters: &[ClusterDraft], ranking: &[f64]) -> Option<Vec<ClusterDraft>> {
    let (target, largest) = clusters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_splittable())
        // First cluster wins ties.
        .max_by(|(ia, a), (ib, b)| a.member_count.cmp(&b.member_count).then(ib.cmp(ia)))?;

    let ranked = rank_members(&largest.members, ranking);
    let midpoint = ranked.len().div_ceil(2);
    let (top, bottom) = ranked.split_at(midpoint);

    let share = top.len() as f64 / ranked.len() as f64;
    let top_count = (largest.member_count as f64 * share).round() as usize;
    let top_count = top_count.min(largest.member_count);
    let bottom_count = largest.member_count - top_count;

    debug!(
        cluster = target,
        members = ranked.len(),
        top = top.len(),
        bottom = bottom.len(),
        "splitting largest cluster"
    );

    let mut next = clusters.to_vec();
    next[target] = ClusterDraft {
        members: top.to_vec(),
        member_count: top_count,
    };
    next.push(ClusterDraft {
        members: bottom.to_vec(),
        member_count: bottom_count,
    });
    Some(next)
}

/// Split until `target` non-empty clusters exist or no cluster can be split.
///
/// Returns fewer than `target` clusters only when splitting became impossible.
/// Lists already at or above `target` are returned without empty clusters but
/// otherwise unchanged.
pub fn balance(clusters: Vec<ClusterDraft>, target: usize, ranking: &[f64]) -> Vec<ClusterDraft> {
    let mut current: Vec<ClusterDraft> = clusters
        .into_iter()
        .filter(|c| !c.members.is_empty())
        .collect();

    while current.len() < target {
        match split_largest(&current, ranking) {
            Some(next) => current = next,
            None => {
                debug!(clusters = current.len(), target, "no cluster left to split");
                break;
            }
        }
    }

    current
}

/// Order clusters by average ranking metric (descending) and rank each
/// cluster's members the same way.
pub fn rank_clusters(clusters: Vec<ClusterDraft>, ranking: &[f64]) -> Vec<ClusterDraft> {
    let mut scored: Vec<(f64, ClusterDraft)> = clusters
        .into_iter()
        .map(|c| {
            let members = rank_members(&c.members, ranking);
            let avg = average_metric(&members, ranking);
            (
                avg,
                ClusterDraft {
                    members,
                    member_count: c.member_count,
                },
            )
        })
        .collect();

    // Stable: equal averages keep their previous order.
    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.into_iter().map(|(_, c)| c).collect()
}

/// Rank clusters with [`rank_clusters`] and rewrite the per-record assignment
/// so cluster ids are `0..clusters.len()` in the new order.
pub fn rank_and_relabel(
    clusters: Vec<ClusterDraft>,
    ranking: &[f64],
    records: usize,
) -> (Vec<ClusterDraft>, Vec<usize>) {
    let ranked = rank_clusters(clusters, ranking);
    let assignments = assignments_for(&ranked, records);
    (ranked, assignments)
}

/// Cluster id per record, where a cluster's id is its position in `clusters`.
pub fn assignments_for(clusters: &[ClusterDraft], records: usize) -> Vec<usize> {
    let mut assignments = vec![0; records];
    for (id, cluster) in clusters.iter().enumerate() {
        for &member in &cluster.members {
            if let Some(slot) = assignments.get_mut(member) {
                *slot = id;
            }
        }
    }
    assignments
}

/// Mean ranking metric of `members`.
pub fn average_metric(members: &[usize], ranking: &[f64]) -> f64 {
    let values: Vec<f64> = members.iter().map(|&i| metric(ranking, i)).collect();
    mean(&values)
}

fn rank_members(members: &[usize], ranking: &[f64]) -> Vec<usize> {
    let mut ranked = members.to_vec();
    ranked.sort_by(|&a, &b| by_metric_desc(ranking, a, b));
    ranked
}

fn by_metric_desc(ranking: &[f64], a: usize, b: usize) -> Ordering {
    metric(ranking, b).total_cmp(&metric(ranking, a)).then(a.cmp(&b))
}

fn metric(ranking: &[f64], index: usize) -> f64 {
    ranking.get(index).copied().unwrap_or(0.0)
}
