//! Run reporting: outcome entries and suite-level summaries.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scenario::TestOutcome;

/// The record of one finished scenario
#[derive(Debug, Clone)]
pub struct OutcomeEntry {
    /// Scenario name
    pub name: String,
    /// Terminal status
    pub outcome: TestOutcome,
    /// Wall-clock duration of the run
    pub duration: Duration,
    /// Steps recorded before the scenario ended
    pub steps: Vec<String>,
    /// When the scenario finished
    pub finished_at: DateTime<Utc>,
}

impl OutcomeEntry {
    /// Create an entry stamped with the current time
    #[must_use]
    pub fn new(name: String, outcome: TestOutcome, duration: Duration, steps: Vec<String>) -> Self {
        Self {
            name,
            outcome,
            duration,
            steps,
            finished_at: Utc::now(),
        }
    }
}

/// Collects outcome entries across a run
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    entries: Vec<OutcomeEntry>,
}

impl Reporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished scenario
    pub fn record(&mut self, entry: OutcomeEntry) {
        tracing::info!(
            scenario = %entry.name,
            outcome = %entry.outcome,
            duration_ms = entry.duration.as_millis() as u64,
            "recorded"
        );
        self.entries.push(entry);
    }

    /// All recorded entries, in recording order
    #[must_use]
    pub fn entries(&self) -> &[OutcomeEntry] {
        &self.entries
    }

    /// Number of recorded scenarios
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_passed()).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failed()).count()
    }

    /// Number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_skipped()).count()
    }

    /// Whether no scenario failed (skips do not count against the run)
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// The failed entries, for post-run triage
    #[must_use]
    pub fn failures(&self) -> Vec<&OutcomeEntry> {
        self.entries.iter().filter(|e| e.outcome.is_failed()).collect()
    }

    /// One-line run summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} scenarios: {} passed, {} failed, {} skipped",
            self.total(),
            self.passed_count(),
            self.failed_count(),
            self.skipped_count()
        )
    }
}
