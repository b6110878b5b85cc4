//! Comprobar: Polling Assertion and Page-Object Harness
//!
//! Comprobar (Spanish: "to verify") is a deterministic harness for
//! end-to-end UI scenarios: locators that re-resolve on every use,
//! assertions that poll until true or timeout, page objects that name an
//! app's surface once, and a scenario runner with hooks, a timeout
//! watchdog, and per-run reporting.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   COMPROBAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐         │
//! │   │ Scenario   │    │ Page       │    │ Session    │         │
//! │   │ Runner     │───►│ Objects    │───►│ + Expect   │         │
//! │   └────────────┘    └────────────┘    └─────┬──────┘         │
//! │                                             │                │
//! │   ┌────────────┐    ┌────────────┐    ┌─────▼──────┐         │
//! │   │ Reporter   │◄───│ Poller     │◄───│ Driver     │         │
//! │   │            │    │ (wait)     │    │ (trait)    │         │
//! │   └────────────┘    └────────────┘    └────────────┘         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every dynamic assertion flows through one [`Poller`]: first observed
//! true wins, timeouts carry the last observed value, and a scenario's
//! [`CancelToken`] aborts all of its in-flight polls at once.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod driver;
mod locator;
/// In-memory driver and app model for harness tests
pub mod mock;
/// Page objects: named locators plus domain operations
pub mod page;
mod reporter;
mod result;
mod scenario;
mod session;
mod wait;

pub use driver::{Driver, ElementHandle};
pub use locator::{Locator, Selector};
pub use page::{Credentials, DashboardPage, Filter, LoginPage, PageObject, TodoPage};
pub use reporter::{OutcomeEntry, Reporter};
pub use result::{HarnessError, HarnessResult};
pub use scenario::{
    Scenario, ScenarioContext, ScenarioRunner, TestOutcome, DEFAULT_SCENARIO_TIMEOUT_MS,
};
pub use session::{Expect, Session, UrlPattern};
pub use wait::{
    predicate, wait_until, CancelToken, Condition, FnCondition, Observation, PollPolicy, Poller,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};

/// Install a `tracing` subscriber reading `RUST_LOG`, once per process.
///
/// Safe to call from every test; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Prelude for convenient imports
pub mod prelude {
    pub use super::driver::{Driver, ElementHandle};
    pub use super::locator::{Locator, Selector};
    pub use super::mock::{
        AppContext, AppEvent, DocumentBuilder, ElementSpec, MockApp, MockDriver,
    };
    pub use super::page::{
        Credentials, DashboardPage, Filter, LoginPage, PageObject, TodoPage,
    };
    pub use super::reporter::{OutcomeEntry, Reporter};
    pub use super::result::{HarnessError, HarnessResult};
    pub use super::scenario::{Scenario, ScenarioContext, ScenarioRunner, TestOutcome};
    pub use super::session::{Expect, Session, UrlPattern};
    pub use super::wait::{
        predicate, wait_until, CancelToken, Condition, FnCondition, Observation, PollPolicy,
        Poller,
    };
}
