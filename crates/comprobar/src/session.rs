//! Driver session: actions, queries, and polled expectations.
//!
//! A [`Session`] owns one [`Driver`] behind a mutex, resolves [`Locator`]s
//! to live element handles at the moment of use, and exposes two surfaces:
//! auto-retrying actions (`click`, `fill`, ...) and the [`Expect`] builder
//! whose assertions poll until true or timeout.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use uuid::Uuid;

use crate::driver::{Driver, ElementHandle};
use crate::locator::Locator;
use crate::result::{HarnessError, HarnessResult};
use crate::wait::{CancelToken, FnCondition, Observation, PollPolicy, Poller};

/// How a session matches the current URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact string match
    Exact(String),
    /// URL starts with the prefix
    Prefix(String),
    /// URL contains the substring
    Contains(String),
    /// URL matches the regular expression
    Regex(String),
}

impl UrlPattern {
    /// Check a URL against this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => url == expected,
            Self::Prefix(prefix) => url.starts_with(prefix.as_str()),
            Self::Contains(substring) => url.contains(substring.as_str()),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(url))
                .unwrap_or(false),
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "url == {s:?}"),
            Self::Prefix(s) => write!(f, "url starts with {s:?}"),
            Self::Contains(s) => write!(f, "url contains {s:?}"),
            Self::Regex(s) => write!(f, "url matches /{s}/"),
        }
    }
}

/// A live driver session
pub struct Session {
    id: Uuid,
    driver: Arc<Mutex<dyn Driver>>,
    cancel: CancelToken,
    policy: PollPolicy,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Open a session over a driver with the default polling policy
    pub fn new(driver: impl Driver + 'static) -> Self {
        Self::with_policy(driver, PollPolicy::default())
    }

    /// Open a session with an explicit polling policy
    pub fn with_policy(driver: impl Driver + 'static, policy: PollPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            driver: Arc::new(Mutex::new(driver)),
            cancel: CancelToken::new(),
            policy,
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The session's cancellation token
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Trip the session's cancellation token
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The session's polling policy
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        self.policy
    }

    fn lock(&self) -> HarnessResult<MutexGuard<'_, dyn Driver + 'static>> {
        self.driver.lock().map_err(|_| HarnessError::DriverCommand {
            message: "driver mutex poisoned".to_string(),
        })
    }

    /// Resolve a locator to all matching handles, honoring scope and `nth`
    fn resolve_all(
        driver: &MutexGuard<'_, dyn Driver + 'static>,
        locator: &Locator,
    ) -> HarnessResult<Vec<ElementHandle>> {
        let scope = match locator.parent() {
            Some(parent) => Some(Self::resolve_one(driver, parent)?),
            None => None,
        };
        let handles = driver.query(locator.selector(), scope.as_ref())?;
        match locator.index() {
            Some(index) => Ok(handles.get(index).copied().into_iter().collect()),
            None => Ok(handles),
        }
    }

    /// Resolve a locator to exactly one handle.
    ///
    /// Zero matches is [`HarnessError::ElementNotFound`]; more than one
    /// without an `nth` narrowing is [`HarnessError::AmbiguousMatch`].
    fn resolve_one(
        driver: &MutexGuard<'_, dyn Driver + 'static>,
        locator: &Locator,
    ) -> HarnessResult<ElementHandle> {
        let handles = Self::resolve_all(driver, locator)?;
        match handles.len() {
            0 => Err(HarnessError::ElementNotFound {
                selector: locator.to_string(),
            }),
            1 => Ok(handles[0]),
            count => Err(HarnessError::AmbiguousMatch {
                selector: locator.to_string(),
                count,
            }),
        }
    }

    /// Run an operation against a freshly resolved, visible element,
    /// retrying resolution until the policy's timeout.
    ///
    /// Each attempt re-resolves from scratch, so elements replaced by a
    /// render between attempts are picked up rather than going stale.
    fn act<R>(
        &self,
        locator: &Locator,
        what: &str,
        op: impl Fn(&mut MutexGuard<'_, dyn Driver + 'static>, ElementHandle) -> HarnessResult<R>,
    ) -> HarnessResult<R> {
        let start = Instant::now();
        loop {
            if self.cancel.is_cancelled() {
                return Err(HarnessError::Cancelled {
                    context: format!("{what} on {locator}"),
                });
            }

            let attempt = (|| {
                let mut driver = self.lock()?;
                let handle = Self::resolve_one(&driver, locator)?;
                if !driver.is_visible(&handle)? {
                    return Err(HarnessError::DriverCommand {
                        message: format!("element {locator} is not visible"),
                    });
                }
                op(&mut driver, handle)
            })();

            match attempt {
                Ok(value) => return Ok(value),
                Err(err) if start.elapsed() >= self.policy.timeout() => return Err(err),
                Err(err) => {
                    tracing::trace!(action = what, locator = %locator, error = %err, "retrying action");
                }
            }
            std::thread::sleep(self.policy.interval());
        }
    }

    // --- navigation ---

    /// Navigate to a URL
    pub fn goto(&self, url: &str) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, url, "goto");
        self.lock()?.navigate(url)
    }

    /// Reload the current page
    pub fn reload(&self) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, "reload");
        self.lock()?.reload()
    }

    /// Navigate back in history
    pub fn go_back(&self) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, "go_back");
        self.lock()?.go_back()
    }

    /// The current URL
    pub fn current_url(&self) -> HarnessResult<String> {
        self.lock()?.current_url()
    }

    // --- actions (auto-retrying) ---

    /// Click the element
    pub fn click(&self, locator: &Locator) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, "click");
        self.act(locator, "click", |driver, handle| driver.click(&handle))
    }

    /// Double-click the element
    pub fn dblclick(&self, locator: &Locator) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, "dblclick");
        self.act(locator, "dblclick", |driver, handle| driver.dblclick(&handle))
    }

    /// Hover over the element
    pub fn hover(&self, locator: &Locator) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, "hover");
        self.act(locator, "hover", |driver, handle| driver.hover(&handle))
    }

    /// Replace the element's value with `text`
    pub fn fill(&self, locator: &Locator, text: &str) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, text, "fill");
        self.act(locator, "fill", |driver, handle| driver.fill(&handle, text))
    }

    /// Press a key while the element is focused
    pub fn press(&self, locator: &Locator, key: &str) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, key, "press");
        self.act(locator, "press", |driver, handle| driver.press(&handle, key))
    }

    /// Ensure a checkbox is checked
    pub fn check(&self, locator: &Locator) -> HarnessResult<()> {
        self.set_checked(locator, true)
    }

    /// Ensure a checkbox is unchecked
    pub fn uncheck(&self, locator: &Locator) -> HarnessResult<()> {
        self.set_checked(locator, false)
    }

    /// Set a checkbox to an explicit state
    pub fn set_checked(&self, locator: &Locator, checked: bool) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, checked, "set_checked");
        self.act(locator, "set_checked", |driver, handle| {
            driver.set_checked(&handle, checked)
        })
    }

    /// Dispatch a synthetic event (e.g. `"blur"`) on the element
    pub fn dispatch_event(&self, locator: &Locator, event: &str) -> HarnessResult<()> {
        tracing::debug!(session = %self.id, locator = %locator, event, "dispatch_event");
        self.act(locator, "dispatch_event", |driver, handle| {
            driver.dispatch_event(&handle, event)
        })
    }

    // --- one-shot reads (no polling) ---

    /// Read the element's text content
    pub fn text(&self, locator: &Locator) -> HarnessResult<String> {
        let driver = self.lock()?;
        let handle = Self::resolve_one(&driver, locator)?;
        driver.read_text(&handle)
    }

    /// Read an attribute of the element
    pub fn attribute(&self, locator: &Locator, name: &str) -> HarnessResult<Option<String>> {
        let driver = self.lock()?;
        let handle = Self::resolve_one(&driver, locator)?;
        driver.read_attribute(&handle, name)
    }

    /// Read the element's current input value
    pub fn value(&self, locator: &Locator) -> HarnessResult<String> {
        let driver = self.lock()?;
        let handle = Self::resolve_one(&driver, locator)?;
        driver.read_value(&handle)
    }

    /// Count matching elements right now
    pub fn count(&self, locator: &Locator) -> HarnessResult<usize> {
        let driver = self.lock()?;
        Ok(Self::resolve_all(&driver, locator)?.len())
    }

    /// Whether the element is visible right now
    pub fn is_visible(&self, locator: &Locator) -> HarnessResult<bool> {
        let driver = self.lock()?;
        let handle = Self::resolve_one(&driver, locator)?;
        driver.is_visible(&handle)
    }

    /// Whether the checkbox is checked right now
    pub fn is_checked(&self, locator: &Locator) -> HarnessResult<bool> {
        let driver = self.lock()?;
        let handle = Self::resolve_one(&driver, locator)?;
        driver.is_checked(&handle)
    }

    /// Read a storage item right now
    pub fn storage_item(&self, key: &str) -> HarnessResult<Option<String>> {
        self.lock()?.read_storage_item(key)
    }

    // --- polled expectations ---

    /// Start a polled expectation against a locator
    #[must_use]
    pub fn expect<'a>(&'a self, locator: &Locator) -> Expect<'a> {
        Expect {
            session: self,
            locator: locator.clone(),
            policy: self.policy,
        }
    }

    /// Poll until the current URL matches the pattern
    pub fn expect_url(&self, pattern: &UrlPattern) -> HarnessResult<()> {
        let condition = FnCondition::new(pattern.to_string(), || {
            let url = self.current_url()?;
            Ok(if pattern.matches(&url) {
                Observation::satisfied()
            } else {
                Observation::pending(format!("url = {url:?}"))
            })
        });
        Poller::with_cancel(self.cancel.clone()).poll(&condition, self.policy)
    }

    /// Poll until the storage item at `key` parses as JSON and satisfies
    /// a predicate. A missing key or unparseable value counts as "not
    /// yet", with the raw value retained for the timeout diagnostic.
    pub fn expect_storage(
        &self,
        key: &str,
        description: &str,
        predicate: impl Fn(&serde_json::Value) -> bool,
    ) -> HarnessResult<()> {
        let condition = FnCondition::new(format!("storage[{key:?}]: {description}"), || {
            let Some(raw) = self.storage_item(key)? else {
                return Ok(Observation::pending(format!("storage[{key:?}] is unset")));
            };
            match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(value) if predicate(&value) => Ok(Observation::satisfied()),
                Ok(value) => Ok(Observation::pending(format!("storage[{key:?}] = {value}"))),
                Err(_) => Ok(Observation::pending(format!("storage[{key:?}] = {raw:?} (not JSON)"))),
            }
        });
        Poller::with_cancel(self.cancel.clone()).poll(&condition, self.policy)
    }
}

/// Polled assertion builder returned by [`Session::expect`].
///
/// Every assertion evaluates through the session's poller: it passes the
/// moment the condition is first observed true and fails with a
/// [`HarnessError::Timeout`] carrying the last observed value otherwise.
#[derive(Debug)]
pub struct Expect<'a> {
    session: &'a Session,
    locator: Locator,
    policy: PollPolicy,
}

impl Expect<'_> {
    /// Override the timeout for this one assertion
    #[must_use]
    pub const fn within(mut self, timeout_ms: u64) -> Self {
        self.policy = self.policy.with_timeout(timeout_ms);
        self
    }

    fn poll(
        &self,
        description: String,
        eval: impl Fn() -> HarnessResult<Observation>,
    ) -> HarnessResult<()> {
        let condition = FnCondition::new(description, eval);
        Poller::with_cancel(self.session.cancel_token()).poll(&condition, self.policy)
    }

    fn read_one<R>(
        &self,
        read: impl Fn(&MutexGuard<'_, dyn Driver + 'static>, ElementHandle) -> HarnessResult<R>,
    ) -> HarnessResult<R> {
        let driver = self.session.lock()?;
        let handle = Session::resolve_one(&driver, &self.locator)?;
        read(&driver, handle)
    }

    /// Element's trimmed text equals `expected`
    pub fn to_have_text(&self, expected: &str) -> HarnessResult<()> {
        self.poll(
            format!("{} to have text {expected:?}", self.locator),
            || {
                let text = self.read_one(|driver, handle| driver.read_text(&handle))?;
                Ok(if text.trim() == expected {
                    Observation::satisfied()
                } else {
                    Observation::pending(format!("text = {text:?}"))
                })
            },
        )
    }

    /// All matching elements' trimmed texts equal `expected`, in order
    pub fn to_have_texts(&self, expected: &[&str]) -> HarnessResult<()> {
        self.poll(
            format!("{} to have texts {expected:?}", self.locator),
            || {
                let texts: Vec<String> = {
                    let driver = self.session.lock()?;
                    let handles = Session::resolve_all(&driver, &self.locator)?;
                    handles
                        .iter()
                        .map(|handle| driver.read_text(handle).map(|t| t.trim().to_string()))
                        .collect::<HarnessResult<_>>()?
                };
                Ok(if texts == expected {
                    Observation::satisfied()
                } else {
                    Observation::pending(format!("texts = {texts:?}"))
                })
            },
        )
    }

    /// Element's text contains `needle`
    pub fn to_contain_text(&self, needle: &str) -> HarnessResult<()> {
        self.poll(
            format!("{} to contain text {needle:?}", self.locator),
            || {
                let text = self.read_one(|driver, handle| driver.read_text(&handle))?;
                Ok(if text.contains(needle) {
                    Observation::satisfied()
                } else {
                    Observation::pending(format!("text = {text:?}"))
                })
            },
        )
    }

    /// Exactly `expected` elements match the locator
    pub fn to_have_count(&self, expected: usize) -> HarnessResult<()> {
        self.poll(format!("{} to have count {expected}", self.locator), || {
            let count = self.session.count(&self.locator)?;
            Ok(if count == expected {
                Observation::satisfied()
            } else {
                Observation::pending(format!("count = {count}"))
            })
        })
    }

    /// Element exists and is visible
    pub fn to_be_visible(&self) -> HarnessResult<()> {
        self.poll(format!("{} to be visible", self.locator), || {
            let visible = self.read_one(|driver, handle| driver.is_visible(&handle))?;
            Ok(if visible {
                Observation::satisfied()
            } else {
                Observation::pending("element present but not visible")
            })
        })
    }

    /// Element is absent or invisible.
    ///
    /// Zero matches satisfies this assertion; an ambiguous match does not
    /// fail it as long as no matching element is visible.
    pub fn to_be_hidden(&self) -> HarnessResult<()> {
        self.poll(format!("{} to be hidden", self.locator), || {
            let driver = self.session.lock()?;
            let handles = Session::resolve_all(&driver, &self.locator)?;
            let mut visible = 0usize;
            for handle in &handles {
                if driver.is_visible(handle)? {
                    visible += 1;
                }
            }
            Ok(if visible == 0 {
                Observation::satisfied()
            } else {
                Observation::pending(format!("{visible} visible element(s)"))
            })
        })
    }

    /// Checkbox is checked
    pub fn to_be_checked(&self) -> HarnessResult<()> {
        self.poll(format!("{} to be checked", self.locator), || {
            let checked = self.read_one(|driver, handle| driver.is_checked(&handle))?;
            Ok(if checked {
                Observation::satisfied()
            } else {
                Observation::pending("checked = false")
            })
        })
    }

    /// Checkbox is unchecked
    pub fn to_not_be_checked(&self) -> HarnessResult<()> {
        self.poll(format!("{} to not be checked", self.locator), || {
            let checked = self.read_one(|driver, handle| driver.is_checked(&handle))?;
            Ok(if checked {
                Observation::pending("checked = true")
            } else {
                Observation::satisfied()
            })
        })
    }

    /// Input's value equals `expected`
    pub fn to_have_value(&self, expected: &str) -> HarnessResult<()> {
        self.poll(
            format!("{} to have value {expected:?}", self.locator),
            || {
                let value = self.read_one(|driver, handle| driver.read_value(&handle))?;
                Ok(if value == expected {
                    Observation::satisfied()
                } else {
                    Observation::pending(format!("value = {value:?}"))
                })
            },
        )
    }

    /// Input's value is empty
    pub fn to_be_empty(&self) -> HarnessResult<()> {
        self.to_have_value("")
    }

    /// Element has keyboard focus
    pub fn to_be_focused(&self) -> HarnessResult<()> {
        self.poll(format!("{} to be focused", self.locator), || {
            let focused = self.read_one(|driver, handle| driver.is_focused(&handle))?;
            Ok(if focused {
                Observation::satisfied()
            } else {
                Observation::pending("focused = false")
            })
        })
    }

    /// Attribute `name` equals `expected`
    pub fn to_have_attribute(&self, name: &str, expected: &str) -> HarnessResult<()> {
        self.poll(
            format!("{} to have attribute {name}={expected:?}", self.locator),
            || {
                let actual =
                    self.read_one(|driver, handle| driver.read_attribute(&handle, name))?;
                Ok(if actual.as_deref() == Some(expected) {
                    Observation::satisfied()
                } else {
                    Observation::pending(format!("{name} = {actual:?}"))
                })
            },
        )
    }

    /// The `class` attribute, split on whitespace, contains `class_name`
    pub fn to_have_class(&self, class_name: &str) -> HarnessResult<()> {
        self.poll(
            format!("{} to have class {class_name:?}", self.locator),
            || {
                let classes = self.class_list()?;
                Ok(if classes.iter().any(|c| c == class_name) {
                    Observation::satisfied()
                } else {
                    Observation::pending(format!("class = {classes:?}"))
                })
            },
        )
    }

    /// The `class` attribute does not contain `class_name`
    pub fn to_not_have_class(&self, class_name: &str) -> HarnessResult<()> {
        self.poll(
            format!("{} to not have class {class_name:?}", self.locator),
            || {
                let classes = self.class_list()?;
                Ok(if classes.iter().any(|c| c == class_name) {
                    Observation::pending(format!("class = {classes:?}"))
                } else {
                    Observation::satisfied()
                })
            },
        )
    }

    fn class_list(&self) -> HarnessResult<Vec<String>> {
        let attr = self.read_one(|driver, handle| driver.read_attribute(&handle, "class"))?;
        Ok(attr
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}
