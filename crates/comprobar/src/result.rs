//! Result and error types for Comprobar.

use thiserror::Error;

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving a UI scenario
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A singular action found no matching element
    #[error("no element matched selector {selector}")]
    ElementNotFound {
        /// Description of the selector that failed to resolve
        selector: String,
    },

    /// A singular action found more than one matching element
    #[error("selector {selector} matched {count} elements where exactly one was expected")]
    AmbiguousMatch {
        /// Description of the ambiguous selector
        selector: String,
        /// How many elements matched
        count: usize,
    },

    /// A polled condition never became true
    #[error("condition not met within {ms}ms (last observed: {})", last_observed.as_deref().unwrap_or("nothing"))]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Last value observed before the deadline, if any
        last_observed: Option<String>,
    },

    /// The owning scenario was aborted while an operation was in flight
    #[error("cancelled while {context}")]
    Cancelled {
        /// What was being waited on when the abort was observed
        context: String,
    },

    /// Navigation error
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Opaque passthrough from the driver
    #[error("driver command failed: {message}")]
    DriverCommand {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Setup or teardown hook failed
    #[error("fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarnessError {
    /// Shorthand for an opaque driver failure.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::DriverCommand {
            message: message.into(),
        }
    }

    /// True for the timeout and cancellation variants, which carry a
    /// timing diagnostic rather than a structural one.
    #[must_use]
    pub const fn is_timing(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled { .. })
    }
}
