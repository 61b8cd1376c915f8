//! Pre-aggregated source records consumed by the segmentation pipeline.
//!
//! The data provider hands over one batch of a single [`RecordKind`]. Each kind
//! has its own explicit shape; the analytics crate owns the mapping from shape
//! to numeric feature vector.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::period::PeriodKey;

/// Which entity a record (and therefore a whole batch) describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// One calendar month of sell-in/sell-out activity.
    Temporal,
    /// One product (silhouette) across the whole range.
    Product,
    /// One branch across the whole range.
    Branch,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Temporal => "temporal",
            RecordKind::Product => "product",
            RecordKind::Branch => "branch",
        }
    }
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Revenue/units of one product category within a period.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub revenue: f64,
    pub units: f64,
}

impl CategoryTotals {
    pub fn new(revenue: f64, units: f64) -> Self {
        Self { revenue, units }
    }

    pub fn accumulate(&mut self, other: &CategoryTotals) {
        self.revenue += other.revenue;
        self.units += other.units;
    }
}

/// Monthly sell-in/sell-out totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub period: PeriodKey,
    pub sell_in_revenue: f64,
    pub sell_out_revenue: f64,
    pub sell_in_units: f64,
    pub sell_out_units: f64,
    /// Optional per-category breakdown of the month (e.g. by gender line).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryTotals>,
}

impl PeriodAggregate {
    pub fn new(
        period: PeriodKey,
        sell_in_revenue: f64,
        sell_out_revenue: f64,
        sell_in_units: f64,
        sell_out_units: f64,
    ) -> Self {
        Self {
            period,
            sell_in_revenue,
            sell_out_revenue,
            sell_in_units,
            sell_out_units,
            categories: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, name: impl Into<String>, totals: CategoryTotals) -> Self {
        self.categories.insert(name.into(), totals);
        self
    }

    /// Combined sell-in + sell-out revenue.
    pub fn total_revenue(&self) -> f64 {
        self.sell_in_revenue + self.sell_out_revenue
    }
}

/// Whole-range totals for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub name: String,
    pub sales: f64,
    pub units: f64,
}

impl ProductAggregate {
    pub fn new(name: impl Into<String>, sales: f64, units: f64) -> Self {
        Self {
            name: name.into(),
            sales,
            units,
        }
    }

    /// Average selling price; zero when no units were sold.
    pub fn average_price(&self) -> f64 {
        if self.units == 0.0 { 0.0 } else { self.sales / self.units }
    }
}

/// Whole-range totals for one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchAggregate {
    pub name: String,
    pub sales: f64,
    pub units: f64,
    /// Units on hand at the latest inventory snapshot.
    pub stock: f64,
}

impl BranchAggregate {
    pub fn new(name: impl Into<String>, sales: f64, units: f64, stock: f64) -> Self {
        Self {
            name: name.into(),
            sales,
            units,
            stock,
        }
    }
}

/// A source-provided aggregate of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureRecord {
    Temporal(PeriodAggregate),
    Product(ProductAggregate),
    Branch(BranchAggregate),
}

impl FeatureRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            FeatureRecord::Temporal(_) => RecordKind::Temporal,
            FeatureRecord::Product(_) => RecordKind::Product,
            FeatureRecord::Branch(_) => RecordKind::Branch,
        }
    }

    /// Display key: the period (`YYYY-MM`) or the entity name.
    pub fn key(&self) -> String {
        match self {
            FeatureRecord::Temporal(p) => p.period.to_string(),
            FeatureRecord::Product(p) => p.name.clone(),
            FeatureRecord::Branch(b) => b.name.clone(),
        }
    }

    /// Dominant sales metric used to rank members and order segments.
    pub fn ranking_metric(&self) -> f64 {
        match self {
            FeatureRecord::Temporal(p) => p.total_revenue(),
            FeatureRecord::Product(p) => p.sales,
            FeatureRecord::Branch(b) => b.sales,
        }
    }
}

impl From<PeriodAggregate> for FeatureRecord {
    fn from(value: PeriodAggregate) -> Self {
        FeatureRecord::Temporal(value)
    }
}

impl From<ProductAggregate> for FeatureRecord {
    fn from(value: ProductAggregate) -> Self {
        FeatureRecord::Product(value)
    }
}

impl From<BranchAggregate> for FeatureRecord {
    fn from(value: BranchAggregate) -> Self {
        FeatureRecord::Branch(value)
    }
}
