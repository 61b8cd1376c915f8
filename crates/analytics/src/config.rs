use std::str::FromStr;

use serde::{Deserialize, Serialize};

use salesight_core::{AnalyticsError, AnalyticsResult, RecordKind};

use crate::forecast::DEFAULT_HORIZON;
use crate::kmeans::DEFAULT_MAX_ITERATIONS;

pub const ENV_TEMPORAL_CLUSTERS: &str = "SALESIGHT_TEMPORAL_CLUSTERS";
pub const ENV_PROFILE_CLUSTERS: &str = "SALESIGHT_PROFILE_CLUSTERS";
pub const ENV_FORECAST_HORIZON: &str = "SALESIGHT_FORECAST_HORIZON";
pub const ENV_MAX_ITERATIONS: &str = "SALESIGHT_MAX_ITERATIONS";
pub const ENV_SEED: &str = "SALESIGHT_SEED";

/// Engine defaults shared by jobs.
///
/// Missing fields in a serialized config fall back to [`Default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Target segment count for monthly (temporal) batches.
    pub temporal_clusters: usize,
    /// Target segment count for product and branch batches.
    pub profile_clusters: usize,
    pub forecast_horizon: usize,
    pub max_iterations: usize,
    /// Fixed RNG seed for reproducible segmentation; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            temporal_clusters: 5,
            profile_clusters: 4,
            forecast_horizon: DEFAULT_HORIZON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl AnalyticsConfig {
    /// Defaults overridden by `SALESIGHT_*` environment variables.
    pub fn from_env() -> AnalyticsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable name.
    pub fn from_lookup<F>(lookup: F) -> AnalyticsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, ENV_TEMPORAL_CLUSTERS)? {
            config.temporal_clusters = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_PROFILE_CLUSTERS)? {
            config.profile_clusters = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_FORECAST_HORIZON)? {
            config.forecast_horizon = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MAX_ITERATIONS)? {
            config.max_iterations = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SEED)? {
            config.seed = Some(v);
        }
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Default segment count for a batch of `kind` records.
    pub fn target_clusters(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Temporal => self.temporal_clusters,
            RecordKind::Product | RecordKind::Branch => self.profile_clusters,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> AnalyticsResult<Option<T>>
where
    T: FromStr,
    T::Err: core::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AnalyticsError::config(format!("{key}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.temporal_clusters, 5);
        assert_eq!(config.profile_clusters, 4);
        assert_eq!(config.forecast_horizon, 3);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.seed, None);
        assert_eq!(config.target_clusters(RecordKind::Temporal), 5);
        assert_eq!(config.target_clusters(RecordKind::Branch), 4);
    }

    #[test]
    fn variables_override_defaults() {
        let config = AnalyticsConfig::from_lookup(lookup(&[
            (ENV_PROFILE_CLUSTERS, "6"),
            (ENV_FORECAST_HORIZON, " 12 "),
            (ENV_SEED, "42"),
        ]))
        .unwrap();
        assert_eq!(config.profile_clusters, 6);
        assert_eq!(config.forecast_horizon, 12);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.temporal_clusters, 5);
    }

    #[test]
    fn blank_variables_are_ignored() {
        let config = AnalyticsConfig::from_lookup(lookup(&[(ENV_SEED, "")])).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
    }

    #[test]
    fn unparsable_variable_is_a_config_error() {
        let err =
            AnalyticsConfig::from_lookup(lookup(&[(ENV_MAX_ITERATIONS, "lots")])).unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(msg) if msg.contains(ENV_MAX_ITERATIONS)));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnalyticsConfig = serde_json::from_str(r#"{"temporal_clusters": 3}"#).unwrap();
        assert_eq!(config.temporal_clusters, 3);
        assert_eq!(config.profile_clusters, 4);
    }
}
