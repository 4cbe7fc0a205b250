use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use drift_core::model::ExamOutcome;

/// Receives each finished exam exactly once.
#[async_trait]
pub trait ResultsSink: Send + Sync {
    async fn record(&self, outcome: &ExamOutcome);
}

/// Writes outcomes to the log as a structured event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingResultsSink;

#[async_trait]
impl ResultsSink for TracingResultsSink {
    async fn record(&self, outcome: &ExamOutcome) {
        match serde_json::to_string(outcome) {
            Ok(payload) => info!(
                reason = ?outcome.reason(),
                verdict = ?outcome.verdict(),
                correct = outcome.correct(),
                wrong = outcome.wrong(),
                total = outcome.total_questions(),
                %payload,
                "exam finished"
            ),
            Err(err) => warn!(error = %err, "failed to serialize exam outcome"),
        }
    }
}

/// Keeps outcomes in memory; handy for tests and for showing a history.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResultsSink {
    outcomes: Arc<Mutex<Vec<ExamOutcome>>>,
}

impl InMemoryResultsSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn outcomes(&self) -> Vec<ExamOutcome> {
        self.outcomes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultsSink for InMemoryResultsSink {
    async fn record(&self, outcome: &ExamOutcome) {
        match self.outcomes.lock() {
            Ok(mut guard) => guard.push(outcome.clone()),
            Err(err) => warn!(error = %err, "results sink lock poisoned"),
        }
    }
}
