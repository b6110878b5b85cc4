//! Page objects: named locators and domain-level operations over a page.
//!
//! A page object owns no session state. It knows its URL, a landmark
//! locator that proves the page has loaded, and domain operations
//! expressed in terms of [`Locator`]s and [`Session`] calls.

use crate::locator::Locator;
use crate::result::HarnessResult;
use crate::session::Session;

mod dashboard;
mod login;
mod todo;

pub use dashboard::DashboardPage;
pub use login::{Credentials, LoginPage};
pub use todo::{Filter, TodoPage};

/// A navigable page with a load landmark
pub trait PageObject {
    /// The page's URL
    fn url(&self) -> &str;

    /// A locator that is visible once the page has loaded
    fn landmark(&self) -> Locator;

    /// Human-readable page name
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Navigate to the page and wait for its landmark
    fn open(&self, session: &Session) -> HarnessResult<()> {
        tracing::debug!(page = self.name(), url = self.url(), "open page");
        session.goto(self.url())?;
        self.assert_loaded(session)
    }

    /// Wait for the page's landmark to be visible
    fn assert_loaded(&self, session: &Session) -> HarnessResult<()> {
        session.expect(&self.landmark()).to_be_visible()
    }
}
