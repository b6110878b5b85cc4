//! Page object for the post-login dashboard of an HR-suite style app.

use crate::locator::Locator;
use crate::page::PageObject;
use crate::result::HarnessResult;
use crate::session::{Session, UrlPattern};

/// Dashboard page object
#[derive(Debug, Clone)]
pub struct DashboardPage {
    base_url: String,
}

impl DashboardPage {
    /// Create a page object rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn breadcrumb_header(&self) -> Locator {
        Locator::css("h6.oxd-text.oxd-text--h6.oxd-topbar-header-breadcrumb-module")
    }

    /// Login landed here: breadcrumb reads "Dashboard" and the URL says so
    pub fn assert_on_dashboard(&self, session: &Session) -> HarnessResult<()> {
        session
            .expect(&self.breadcrumb_header())
            .to_have_text("Dashboard")?;
        session.expect_url(&UrlPattern::Contains("dashboard".to_string()))
    }
}

impl PageObject for DashboardPage {
    fn url(&self) -> &str {
        &self.base_url
    }

    fn landmark(&self) -> Locator {
        self.breadcrumb_header()
    }

    fn name(&self) -> &str {
        "dashboard"
    }
}
