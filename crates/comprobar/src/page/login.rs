//! Page object for a classic username/password login form with a flash
//! message area.

use crate::locator::Locator;
use crate::page::PageObject;
use crate::result::HarnessResult;
use crate::session::{Session, UrlPattern};

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Credentials {
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credentials pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Login form page object
#[derive(Debug, Clone)]
pub struct LoginPage {
    base_url: String,
}

impl LoginPage {
    /// Create a page object rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn username_field(&self) -> Locator {
        Locator::css("#username")
    }

    fn password_field(&self) -> Locator {
        Locator::css("#password")
    }

    fn submit_button(&self) -> Locator {
        Locator::css("button[type='submit']")
    }

    fn flash(&self) -> Locator {
        Locator::css("#flash")
    }

    /// Fill both fields and submit
    pub fn login(&self, session: &Session, credentials: &Credentials) -> HarnessResult<()> {
        session.fill(&self.username_field(), &credentials.username)?;
        session.fill(&self.password_field(), &credentials.password)?;
        session.click(&self.submit_button())
    }

    /// The flash message contains `needle`
    pub fn assert_flash_contains(&self, session: &Session, needle: &str) -> HarnessResult<()> {
        session.expect(&self.flash()).to_contain_text(needle)
    }

    /// Submission was rejected: the form is still shown at the login URL
    pub fn assert_still_on_login(&self, session: &Session) -> HarnessResult<()> {
        self.assert_loaded(session)?;
        session.expect_url(&UrlPattern::Prefix(self.base_url.clone()))
    }
}

impl PageObject for LoginPage {
    fn url(&self) -> &str {
        &self.base_url
    }

    fn landmark(&self) -> Locator {
        self.username_field()
    }

    fn name(&self) -> &str {
        "login"
    }
}
