//! Scenario runner: named scenarios, hooks, step recording, and a
//! per-scenario timeout watchdog.
//!
//! A scenario body receives a [`ScenarioContext`] and returns a
//! [`HarnessResult`]; the runner turns whatever happened into exactly one
//! [`TestOutcome`], runs teardown hooks no matter what, and trips the
//! session's cancellation token if the scenario overruns its budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::reporter::OutcomeEntry;
use crate::result::{HarnessError, HarnessResult};
use crate::session::Session;

/// Default per-scenario time budget (30 seconds)
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 30_000;

/// Terminal status of one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    /// Everything held
    Passed,
    /// A step, hook, assertion, or the watchdog failed the scenario
    Failed {
        /// What went wrong
        reason: String,
    },
    /// The scenario was not run
    Skipped {
        /// Why it was not run
        reason: String,
    },
}

impl TestOutcome {
    /// Whether the scenario passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Whether the scenario failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Whether the scenario was skipped
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// A named scenario with tags and a time budget
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    tags: Vec<String>,
    timeout_ms: u64,
    skipped: Option<String>,
}

impl Scenario {
    /// Create a scenario with the default timeout
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            timeout_ms: DEFAULT_SCENARIO_TIMEOUT_MS,
            skipped: None,
        }
    }

    /// Attach a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Override the time budget
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Mark the scenario skipped with a reason; its body will not run
    #[must_use]
    pub fn skip_because(mut self, reason: impl Into<String>) -> Self {
        self.skipped = Some(reason.into());
        self
    }

    /// Scenario name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenario tags
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Time budget in milliseconds
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

/// Execution context handed to hooks and the scenario body
pub struct ScenarioContext {
    /// The live session
    pub session: Session,
    steps: Vec<String>,
}

impl ScenarioContext {
    fn new(session: Session) -> Self {
        Self {
            session,
            steps: Vec::new(),
        }
    }

    /// Run and record a named step
    pub fn step<R>(
        &mut self,
        name: impl Into<String>,
        f: impl FnOnce(&mut Self) -> HarnessResult<R>,
    ) -> HarnessResult<R> {
        let name = name.into();
        tracing::info!(step = %name, "step");
        self.steps.push(name);
        f(self)
    }

    /// Names of the steps recorded so far
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }
}

impl std::fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("session", &self.session)
            .field("steps", &self.steps)
            .finish()
    }
}

type Hook = Box<dyn FnMut(&mut ScenarioContext) -> HarnessResult<()>>;

/// Runs scenarios with setup/teardown hooks and a timeout watchdog
#[derive(Default)]
pub struct ScenarioRunner {
    before_each: Vec<Hook>,
    after_each: Vec<Hook>,
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("before_each", &self.before_each.len())
            .field("after_each", &self.after_each.len())
            .finish()
    }
}

impl ScenarioRunner {
    /// Create a runner with no hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setup hook. Hooks run in registration order before the
    /// body; the first failure fails the scenario and skips the body.
    pub fn before_each(
        &mut self,
        hook: impl FnMut(&mut ScenarioContext) -> HarnessResult<()> + 'static,
    ) -> &mut Self {
        self.before_each.push(Box::new(hook));
        self
    }

    /// Register a teardown hook. All teardown hooks run after the body
    /// even when setup or the body failed.
    pub fn after_each(
        &mut self,
        hook: impl FnMut(&mut ScenarioContext) -> HarnessResult<()> + 'static,
    ) -> &mut Self {
        self.after_each.push(Box::new(hook));
        self
    }

    /// Run one scenario against a fresh session and produce its entry.
    ///
    /// The body never sees the watchdog directly: on overrun the
    /// session's cancellation token trips, in-flight polls abandon with
    /// [`HarnessError::Cancelled`], and the outcome reports the timeout.
    pub fn run(
        &mut self,
        scenario: &Scenario,
        session: Session,
        body: impl FnOnce(&mut ScenarioContext) -> HarnessResult<()>,
    ) -> OutcomeEntry {
        let started = Instant::now();
        tracing::info!(scenario = %scenario.name, "scenario start");

        if let Some(reason) = &scenario.skipped {
            tracing::info!(scenario = %scenario.name, reason = %reason, "scenario skipped");
            return OutcomeEntry::new(
                scenario.name.clone(),
                TestOutcome::Skipped {
                    reason: reason.clone(),
                },
                started.elapsed(),
                Vec::new(),
            );
        }

        let done = Arc::new(AtomicBool::new(false));
        let timed_out = Arc::new(AtomicBool::new(false));
        let watchdog = {
            let done = Arc::clone(&done);
            let timed_out = Arc::clone(&timed_out);
            let cancel = session.cancel_token();
            let budget = Duration::from_millis(scenario.timeout_ms);
            std::thread::spawn(move || {
                let deadline = Instant::now() + budget;
                while !done.load(Ordering::SeqCst) {
                    if Instant::now() >= deadline {
                        timed_out.store(true, Ordering::SeqCst);
                        cancel.cancel();
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
            })
        };

        let mut context = ScenarioContext::new(session);
        let mut failure: Option<HarnessError> = None;

        for hook in &mut self.before_each {
            if let Err(err) = hook(&mut context) {
                failure = Some(err);
                break;
            }
        }

        if failure.is_none() {
            failure = body(&mut context).err();
        }

        for hook in &mut self.after_each {
            if let Err(err) = hook(&mut context) {
                tracing::warn!(scenario = %scenario.name, error = %err, "teardown hook failed");
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }

        done.store(true, Ordering::SeqCst);
        if watchdog.join().is_err() {
            tracing::warn!(scenario = %scenario.name, "watchdog thread panicked");
        }

        let outcome = match failure {
            None => TestOutcome::Passed,
            Some(HarnessError::Cancelled { context: what }) if timed_out.load(Ordering::SeqCst) => {
                TestOutcome::Failed {
                    reason: format!(
                        "scenario timed out after {}ms while {what}",
                        scenario.timeout_ms
                    ),
                }
            }
            Some(err) => TestOutcome::Failed {
                reason: err.to_string(),
            },
        };

        tracing::info!(scenario = %scenario.name, outcome = %outcome, "scenario end");
        OutcomeEntry::new(
            scenario.name.clone(),
            outcome,
            started.elapsed(),
            context.steps,
        )
    }
}
