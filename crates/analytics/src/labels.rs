//! Human-facing names for final clusters.
//!
//! Temporal segments are named by an ordered rule table over average sell-in
//! and sell-out; the first matching rule wins, so boundary values resolve to
//! the earlier rule. Product and branch segments get fixed names by rank.

use serde::{Deserialize, Serialize};

use salesight_core::RecordKind;

/// Name of a temporal behaviour pattern.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentLabel {
    HighStock,
    HighDemand,
    SalesPeak,
    LowPerformance,
    StablePerformance,
}

impl SegmentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentLabel::HighStock => "High Stock",
            SegmentLabel::HighDemand => "High Demand",
            SegmentLabel::SalesPeak => "Sales Peak",
            SegmentLabel::LowPerformance => "Low Performance",
            SegmentLabel::StablePerformance => "Stable Performance",
        }
    }
}

impl core::fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Averages a temporal cluster is judged on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SellThrough {
    pub avg_sell_in: f64,
    pub avg_sell_out: f64,
    /// Volume the combined average is compared against for the peak/low
    /// rules. Defaults to the cluster's own mean of its two averages.
    pub reference: f64,
}

impl SellThrough {
    pub fn new(avg_sell_in: f64, avg_sell_out: f64) -> Self {
        Self {
            avg_sell_in,
            avg_sell_out,
            reference: (avg_sell_in + avg_sell_out) / 2.0,
        }
    }

    /// Compare volume against an external reference (e.g. a batch-wide mean).
    pub fn with_reference(mut self, reference: f64) -> Self {
        self.reference = reference;
        self
    }

    fn combined(&self) -> f64 {
        self.avg_sell_in + self.avg_sell_out
    }
}

/// One row of the naming table.
#[derive(Debug, Copy, Clone)]
pub struct LabelRule {
    pub label: SegmentLabel,
    pub matches: fn(&SellThrough) -> bool,
}

/// Ordered naming rules; evaluated top to bottom.
pub const TEMPORAL_RULES: &[LabelRule] = &[
    LabelRule {
        label: SegmentLabel::HighStock,
        matches: |s| s.avg_sell_in > s.avg_sell_out * 1.2,
    },
    LabelRule {
        label: SegmentLabel::HighDemand,
        matches: |s| s.avg_sell_out > s.avg_sell_in * 1.2,
    },
    LabelRule {
        label: SegmentLabel::SalesPeak,
        matches: |s| s.combined() > s.reference * 1.5,
    },
    LabelRule {
        label: SegmentLabel::LowPerformance,
        matches: |s| s.combined() < s.reference * 0.5,
    },
];

/// Label when no rule matches.
pub const FALLBACK_LABEL: SegmentLabel = SegmentLabel::StablePerformance;

/// Name a temporal cluster with [`TEMPORAL_RULES`].
pub fn label_temporal(stats: &SellThrough) -> SegmentLabel {
    TEMPORAL_RULES
        .iter()
        .find(|rule| (rule.matches)(stats))
        .map(|rule| rule.label)
        .unwrap_or(FALLBACK_LABEL)
}

pub const PRODUCT_SEGMENT_NAMES: &[&str] =
    &["Top Sellers", "Steady Sellers", "Slow Movers", "Low Rotation"];

pub const BRANCH_SEGMENT_NAMES: &[&str] = &[
    "Flagship Branches",
    "High Volume Branches",
    "Regular Branches",
    "Low Activity Branches",
];

/// Fixed display name for the segment at `rank` (0 = highest average sales).
///
/// Ranks past the end of the table are named `Segment N` (1-based).
pub fn ranked_name(kind: RecordKind, rank: usize) -> String {
    let table = match kind {
        RecordKind::Product => PRODUCT_SEGMENT_NAMES,
        RecordKind::Branch => BRANCH_SEGMENT_NAMES,
        RecordKind::Temporal => &[],
    };
    table
        .get(rank)
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| format!("Segment {}", rank + 1))
}
