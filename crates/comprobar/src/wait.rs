//! Condition polling.
//!
//! Every assertion that reads dynamic state goes through one mechanism:
//! a [`Poller`] repeatedly evaluating a [`Condition`] until it is first
//! observed true, the policy's timeout elapses, or the owning scenario is
//! cancelled. Transient evaluation errors (a storage key momentarily
//! absent during a reload, an element mid-replacement) count as "not yet
//! true" rather than aborting the poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::result::{HarnessError, HarnessResult};

/// Default timeout for polled conditions (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Timing policy for a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total time budget in milliseconds
    pub timeout_ms: u64,
    /// Interval between evaluations in milliseconds
    pub interval_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PollPolicy {
    /// Create a policy with the default timeout and interval
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval in milliseconds
    #[must_use]
    pub const fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Interval as a [`Duration`]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Cooperative cancellation flag shared between a scenario and its polls.
///
/// Cloning yields a handle to the same flag. A poll observes the token
/// between evaluations and abandons immediately once tripped, so no
/// background polling outlives its scenario.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, untripped token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the token has been tripped
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One evaluation of a condition.
///
/// `observed` carries a human-readable snapshot of what was seen (the
/// actual text, the current count) for the timeout diagnostic.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Whether the condition held
    pub satisfied: bool,
    /// What was observed, for diagnostics
    pub observed: Option<String>,
}

impl Observation {
    /// The condition held
    #[must_use]
    pub const fn satisfied() -> Self {
        Self {
            satisfied: true,
            observed: None,
        }
    }

    /// The condition did not hold yet; record what was seen instead
    #[must_use]
    pub fn pending(observed: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            observed: Some(observed.into()),
        }
    }

    /// The condition did not hold and there is nothing useful to report
    #[must_use]
    pub const fn pending_silent() -> Self {
        Self {
            satisfied: false,
            observed: None,
        }
    }
}

/// A side-effect-free predicate over observable application state.
///
/// Implementations must be safely re-evaluable: the poller calls
/// [`Condition::evaluate`] repeatedly until it reports satisfied.
pub trait Condition {
    /// Evaluate the condition against live state.
    ///
    /// An `Err` is treated as a transient failure ("not yet true"), not
    /// as a fatal poll error.
    fn evaluate(&self) -> HarnessResult<Observation>;

    /// Describe what is being waited for, for diagnostics
    fn describe(&self) -> String;
}

/// A closure-based condition
pub struct FnCondition<F: Fn() -> HarnessResult<Observation>> {
    func: F,
    description: String,
}

impl<F: Fn() -> HarnessResult<Observation>> FnCondition<F> {
    /// Create a condition from a closure
    pub fn new(description: impl Into<String>, func: F) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: Fn() -> HarnessResult<Observation>> std::fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: Fn() -> HarnessResult<Observation>> Condition for FnCondition<F> {
    fn evaluate(&self) -> HarnessResult<Observation> {
        (self.func)()
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Build a condition from a plain boolean predicate
pub fn predicate<F: Fn() -> bool>(
    description: impl Into<String>,
    func: F,
) -> FnCondition<impl Fn() -> HarnessResult<Observation>> {
    FnCondition::new(description, move || {
        Ok(if func() {
            Observation::satisfied()
        } else {
            Observation::pending_silent()
        })
    })
}

/// Evaluates conditions on a fixed interval until true, timeout, or
/// cancellation.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    cancel: CancelToken,
}

impl Poller {
    /// Create a poller with no cancellation source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a poller observing a scenario's cancellation token
    #[must_use]
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Poll a condition under a policy.
    ///
    /// Returns `Ok(())` the instant the condition is first observed true.
    /// Returns [`HarnessError::Timeout`] carrying the last observed value
    /// once `timeout_ms` elapses: no earlier than the timeout and no
    /// later than the timeout plus one interval (plus evaluation cost).
    /// Returns [`HarnessError::Cancelled`] as soon as the token trips.
    pub fn poll<C: Condition + ?Sized>(
        &self,
        condition: &C,
        policy: PollPolicy,
    ) -> HarnessResult<()> {
        let start = Instant::now();
        let mut last_observed: Option<String> = None;

        loop {
            if self.cancel.is_cancelled() {
                return Err(HarnessError::Cancelled {
                    context: format!("waiting for {}", condition.describe()),
                });
            }

            match condition.evaluate() {
                Ok(observation) if observation.satisfied => return Ok(()),
                Ok(observation) => {
                    if observation.observed.is_some() {
                        last_observed = observation.observed;
                    }
                }
                // Transient evaluation failure: condition not yet true.
                Err(err) => last_observed = Some(format!("evaluation error: {err}")),
            }

            if start.elapsed() >= policy.timeout() {
                tracing::debug!(
                    condition = %condition.describe(),
                    last_observed = last_observed.as_deref(),
                    "condition timed out"
                );
                return Err(HarnessError::Timeout {
                    ms: policy.timeout_ms,
                    last_observed,
                });
            }
            std::thread::sleep(policy.interval());
        }
    }
}

/// Wait for a plain predicate with a given timeout and default interval,
/// observing `cancel` between evaluations like every other poll. Callers
/// outside any scenario can pass a fresh [`CancelToken`].
pub fn wait_until<F: Fn() -> bool>(
    description: impl Into<String>,
    func: F,
    timeout_ms: u64,
    cancel: &CancelToken,
) -> HarnessResult<()> {
    let condition = predicate(description, func);
    Poller::with_cancel(cancel.clone())
        .poll(&condition, PollPolicy::new().with_timeout(timeout_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod policy_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let policy = PollPolicy::default();
            assert_eq!(policy.timeout_ms, 5_000);
            assert_eq!(policy.interval_ms, 50);
        }

        #[test]
        fn test_builders() {
            let policy = PollPolicy::new().with_timeout(200).with_interval(10);
            assert_eq!(policy.timeout(), Duration::from_millis(200));
            assert_eq!(policy.interval(), Duration::from_millis(10));
        }
    }

    mod poll_tests {
        use super::*;
        use std::sync::atomic::AtomicUsize;

        #[test]
        fn test_immediate_success() {
            let condition = predicate("always true", || true);
            let result = Poller::new().poll(&condition, PollPolicy::new().with_timeout(100));
            assert!(result.is_ok());
        }

        #[test]
        fn test_success_after_a_few_iterations() {
            let counter = AtomicUsize::new(0);
            let condition = predicate("third time lucky", || {
                counter.fetch_add(1, Ordering::SeqCst) >= 2
            });
            let policy = PollPolicy::new().with_timeout(1_000).with_interval(5);
            assert!(Poller::new().poll(&condition, policy).is_ok());
            assert!(counter.load(Ordering::SeqCst) >= 3);
        }

        #[test]
        fn test_timeout_window() {
            // An always-false condition must time out no earlier than T and
            // no later than T plus one interval (plus evaluation cost).
            let timeout_ms = 120;
            let interval_ms = 20;
            let condition = predicate("never", || false);
            let policy = PollPolicy::new()
                .with_timeout(timeout_ms)
                .with_interval(interval_ms);

            let start = Instant::now();
            let result = Poller::new().poll(&condition, policy);
            let elapsed = start.elapsed();

            assert!(matches!(result, Err(HarnessError::Timeout { ms, .. }) if ms == timeout_ms));
            assert!(elapsed >= Duration::from_millis(timeout_ms));
            // Generous slack for evaluation cost and scheduler jitter.
            assert!(elapsed < Duration::from_millis(timeout_ms + interval_ms + 100));
        }

        #[test]
        fn test_timeout_carries_last_observed() {
            let condition = FnCondition::new("counter text", || {
                Ok(Observation::pending("text = \"2 items left\""))
            });
            let policy = PollPolicy::new().with_timeout(50).with_interval(10);
            match Poller::new().poll(&condition, policy) {
                Err(HarnessError::Timeout { last_observed, .. }) => {
                    assert_eq!(last_observed.as_deref(), Some("text = \"2 items left\""));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_transient_errors_are_not_fatal() {
            // Errors during evaluation behave like "false", and the poll
            // still succeeds once the condition recovers.
            let attempts = AtomicUsize::new(0);
            let condition = FnCondition::new("storage settles", || {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(HarnessError::driver("storage unavailable mid-reload"))
                } else {
                    Ok(Observation::satisfied())
                }
            });
            let policy = PollPolicy::new().with_timeout(1_000).with_interval(5);
            assert!(Poller::new().poll(&condition, policy).is_ok());
        }

        #[test]
        fn test_persistent_errors_surface_in_diagnostic() {
            let condition = FnCondition::new("storage settles", || {
                Err(HarnessError::driver("storage unavailable"))
            });
            let policy = PollPolicy::new().with_timeout(50).with_interval(10);
            match Poller::new().poll(&condition, policy) {
                Err(HarnessError::Timeout { last_observed, .. }) => {
                    assert!(last_observed.unwrap().contains("storage unavailable"));
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_cancellation_aborts_poll() {
            let cancel = CancelToken::new();
            let poller = Poller::with_cancel(cancel.clone());

            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                cancel.cancel();
            });

            let condition = predicate("never", || false);
            let policy = PollPolicy::new().with_timeout(10_000).with_interval(5);
            let start = Instant::now();
            let result = poller.poll(&condition, policy);
            handle.join().unwrap();

            assert!(matches!(result, Err(HarnessError::Cancelled { .. })));
            // Abandoned long before the ten-second budget.
            assert!(start.elapsed() < Duration::from_secs(1));
        }

        #[test]
        fn test_already_cancelled_token_short_circuits() {
            let cancel = CancelToken::new();
            cancel.cancel();
            let poller = Poller::with_cancel(cancel);
            let condition = predicate("anything", || true);
            let result = poller.poll(&condition, PollPolicy::default());
            assert!(matches!(result, Err(HarnessError::Cancelled { .. })));
        }
    }

    mod convenience_tests {
        use super::*;

        #[test]
        fn test_wait_until_success() {
            assert!(wait_until("true", || true, 100, &CancelToken::new()).is_ok());
        }

        #[test]
        fn test_wait_until_timeout() {
            assert!(wait_until("false", || false, 60, &CancelToken::new()).is_err());
        }

        #[test]
        fn test_wait_until_observes_cancellation() {
            let cancel = CancelToken::new();
            cancel.cancel();
            let result = wait_until("false", || false, 10_000, &cancel);
            assert!(matches!(result, Err(HarnessError::Cancelled { .. })));
        }
    }
}
