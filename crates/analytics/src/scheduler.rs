use std::time::Instant;

use tracing::{info, info_span, warn};

use salesight_core::AnalyticsResult;

use crate::job::AnalyticsJob;
use crate::result::Insight;

/// Executor for analytics jobs.
///
/// Runtime agnostic: implementations decide where jobs run, the default
/// methods decide how they are logged.
pub trait AnalyticsScheduler: Send + Sync + 'static {
    fn run<J: AnalyticsJob>(&self, job: &J) -> AnalyticsResult<J::Output> {
        let span = info_span!("analytics_job", job = job.name());
        let _guard = span.enter();

        let started = Instant::now();
        let result = job.run();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => info!(elapsed_ms, "job completed"),
            Err(err) if err.is_insufficient_data() => info!(elapsed_ms, %err, "job skipped"),
            Err(err) => warn!(elapsed_ms, %err, "job failed"),
        }
        result
    }

    /// Run `job` and wrap its output as an [`Insight`].
    fn run_insight<J: AnalyticsJob>(&self, job: &J) -> AnalyticsResult<Insight> {
        let output = self.run(job)?;
        Ok(Insight::from_output(job.name(), &output)?.with_explanation(job.explain(&output)))
    }
}

/// Synchronous scheduler that runs jobs immediately in-process.
#[derive(Debug, Default, Copy, Clone)]
pub struct LocalScheduler;

impl LocalScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl AnalyticsScheduler for LocalScheduler {}
