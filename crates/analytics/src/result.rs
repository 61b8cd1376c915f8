use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use salesight_core::{AnalyticsError, AnalyticsResult};

/// Structured output of an analytics job, ready for narrative generation.
///
/// This is not a report. Higher layers turn it into text or charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Name of the job that produced this insight.
    pub job: String,

    /// Optional human-readable one-liner.
    pub explanation: Option<String>,

    /// The job output as JSON.
    pub payload: JsonValue,
}

impl Insight {
    pub fn new(job: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            job: job.into(),
            explanation: None,
            payload,
        }
    }

    /// Encode a job output as the payload.
    pub fn from_output<T: Serialize>(job: impl Into<String>, output: &T) -> AnalyticsResult<Self> {
        let payload = serde_json::to_value(output)
            .map_err(|e| AnalyticsError::internal(format!("encoding job output: {e}")))?;
        Ok(Self::new(job, payload))
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Output {
        clusters: usize,
    }

    #[test]
    fn from_output_encodes_payload() {
        let insight = Insight::from_output("segmentation", &Output { clusters: 4 })
            .unwrap()
            .with_explanation("4 segments");
        assert_eq!(insight.payload, json!({ "clusters": 4 }));
        assert_eq!(insight.explanation.as_deref(), Some("4 segments"));

        let encoded = serde_json::to_value(&insight).unwrap();
        let back: Insight = serde_json::from_value(encoded).unwrap();
        assert_eq!(back, insight);
    }
}
