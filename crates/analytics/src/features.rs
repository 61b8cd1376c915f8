//! Projection of typed aggregates into fixed-order numeric feature vectors.
//!
//! This is the single place that knows which fields of each record kind take
//! part in distance comparisons, and in which order.

use serde::Serialize;

use salesight_core::{AnalyticsError, AnalyticsResult, FeatureRecord, RecordKind};

/// Fixed-order numeric representation of one record.
pub type FeatureVector = Vec<f64>;

pub const TEMPORAL_FEATURES: &[&str] = &[
    "sell_in_revenue",
    "sell_out_revenue",
    "sell_in_units",
    "sell_out_units",
];
pub const PRODUCT_FEATURES: &[&str] = &["sales", "units", "average_price"];
pub const BRANCH_FEATURES: &[&str] = &["sales", "units", "stock"];

/// Column names, in vector order, for a record kind.
pub fn feature_names(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Temporal => TEMPORAL_FEATURES,
        RecordKind::Product => PRODUCT_FEATURES,
        RecordKind::Branch => BRANCH_FEATURES,
    }
}

/// Feature vector of a single record.
pub fn feature_vector(record: &FeatureRecord) -> FeatureVector {
    match record {
        FeatureRecord::Temporal(p) => vec![
            p.sell_in_revenue,
            p.sell_out_revenue,
            p.sell_in_units,
            p.sell_out_units,
        ],
        FeatureRecord::Product(p) => vec![p.sales, p.units, p.average_price()],
        FeatureRecord::Branch(b) => vec![b.sales, b.units, b.stock],
    }
}

/// A batch of feature vectors of one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    /// `None` for an empty batch.
    pub kind: Option<RecordKind>,
    pub columns: &'static [&'static str],
    pub rows: Vec<FeatureVector>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.columns.len()
    }
}

/// Build one feature vector per record.
///
/// All records must share one kind; every produced vector therefore has the
/// same length. Non-finite values are rejected.
pub fn build_features(records: &[FeatureRecord]) -> AnalyticsResult<FeatureMatrix> {
    let Some(first) = records.first() else {
        return Ok(FeatureMatrix {
            kind: None,
            columns: &[],
            rows: Vec::new(),
        });
    };

    let kind = first.kind();
    let mut rows = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if record.kind() != kind {
            return Err(AnalyticsError::validation(format!(
                "record {index} is {} but batch is {kind}",
                record.kind()
            )));
        }
        let row = feature_vector(record);
        if row.iter().any(|v| !v.is_finite()) {
            return Err(AnalyticsError::validation(format!(
                "record {index} ({}) has a non-finite feature",
                record.key()
            )));
        }
        rows.push(row);
    }

    Ok(FeatureMatrix {
        kind: Some(kind),
        columns: feature_names(kind),
        rows,
    })
}
