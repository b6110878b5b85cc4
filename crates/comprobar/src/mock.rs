//! In-memory driver for testing harness code without a real UI.
//!
//! A [`MockApp`] renders a [`MockDocument`] for the current URL and
//! reacts to delivered events, optionally mutating storage or
//! navigating. [`MockDriver`] wires an app behind the [`Driver`] trait:
//! navigation rebuilds the document under a new generation, so handles
//! resolved before a navigation are rejected as stale afterwards.

use std::collections::HashMap;

use crate::driver::{Driver, ElementHandle};
use crate::locator::Selector;
use crate::result::{HarnessError, HarnessResult};

/// One element in a mock document
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Generation-local identifier
    pub id: u64,
    /// App-chosen stable key, the address events are delivered to
    pub key: String,
    /// Parent element id, if nested
    pub parent: Option<u64>,
    /// ARIA-style role
    pub role: Option<String>,
    /// Accessible name
    pub accessible_name: Option<String>,
    /// Test id
    pub test_id: Option<String>,
    /// Placeholder text
    pub placeholder: Option<String>,
    /// Associated label text
    pub label: Option<String>,
    /// CSS selector strings this element answers to
    pub css_keys: Vec<String>,
    /// Text content
    pub text: String,
    /// Input value
    pub value: String,
    /// Checkbox state
    pub checked: bool,
    /// Whether the element is visible
    pub visible: bool,
    /// Whether the element has keyboard focus
    pub focused: bool,
    /// Plain attributes (`class` included)
    pub attributes: HashMap<String, String>,
}

impl MockElement {
    fn matches(&self, selector: &Selector) -> bool {
        match selector {
            Selector::Role { role, name } => {
                self.role.as_deref() == Some(role.as_str())
                    && name
                        .as_ref()
                        .map_or(true, |n| self.accessible_name.as_deref() == Some(n.as_str()))
            }
            Selector::TestId(id) => self.test_id.as_deref() == Some(id.as_str()),
            Selector::Placeholder(text) => self.placeholder.as_deref() == Some(text.as_str()),
            Selector::Label(text) => self.label.as_deref() == Some(text.as_str()),
            Selector::Css(css) => self.css_keys.iter().any(|k| k == css),
        }
    }
}

/// Declarative description of one element, consumed by
/// [`DocumentBuilder::push`]
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    key: String,
    parent: Option<u64>,
    role: Option<String>,
    accessible_name: Option<String>,
    test_id: Option<String>,
    placeholder: Option<String>,
    label: Option<String>,
    css_keys: Vec<String>,
    text: String,
    value: String,
    checked: bool,
    hidden: bool,
    focused: bool,
    attributes: HashMap<String, String>,
}

impl ElementSpec {
    /// Start a spec with the app-chosen event key
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the ARIA role
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the accessible name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.accessible_name = Some(name.into());
        self
    }

    /// Set the test id
    #[must_use]
    pub fn test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Set the placeholder text
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Set the label text
    #[must_use]
    pub fn label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(text.into());
        self
    }

    /// Add a CSS selector this element answers to
    #[must_use]
    pub fn css(mut self, selector: impl Into<String>) -> Self {
        self.css_keys.push(selector.into());
        self
    }

    /// Set the text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the input value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the checkbox state
    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Mark the element invisible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark the element focused
    #[must_use]
    pub const fn focused(mut self) -> Self {
        self.focused = true;
        self
    }

    /// Set an attribute (`class` included)
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Nest under a previously pushed element
    #[must_use]
    pub const fn child_of(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Accumulates elements for one render, in document order
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    elements: Vec<MockElement>,
    next_id: u64,
}

impl DocumentBuilder {
    /// Start an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its id, for use with
    /// [`ElementSpec::child_of`]
    pub fn push(&mut self, spec: ElementSpec) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.elements.push(MockElement {
            id,
            key: spec.key,
            parent: spec.parent,
            role: spec.role,
            accessible_name: spec.accessible_name,
            test_id: spec.test_id,
            placeholder: spec.placeholder,
            label: spec.label,
            css_keys: spec.css_keys,
            text: spec.text,
            value: spec.value,
            checked: spec.checked,
            visible: !spec.hidden,
            focused: spec.focused,
            attributes: spec.attributes,
        });
        id
    }

    fn into_elements(self) -> Vec<MockElement> {
        self.elements
    }
}

/// The rendered document for the current URL
#[derive(Debug, Default)]
struct MockDocument {
    generation: u64,
    elements: Vec<MockElement>,
}

impl MockDocument {
    fn is_descendant(&self, element: &MockElement, ancestor: u64) -> bool {
        let mut current = element.parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self
                .elements
                .iter()
                .find(|e| e.id == id)
                .and_then(|e| e.parent);
        }
        false
    }
}

/// An input event delivered to a [`MockApp`], addressed by element key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent<'a> {
    /// Single click
    Click,
    /// Double click
    DblClick,
    /// Pointer hover
    Hover,
    /// Replace the input's value
    Fill(&'a str),
    /// Key press while focused
    Press(&'a str),
    /// Drive a checkbox to an explicit state
    SetChecked(bool),
    /// Synthetic DOM-style event by name (e.g. `"blur"`)
    Dispatch(&'a str),
}

/// Side-channel handed to [`MockApp::handle`]: storage access plus a
/// navigation request slot
#[derive(Debug)]
pub struct AppContext<'a> {
    storage: &'a mut HashMap<String, String>,
    navigate_to: Option<String>,
}

impl AppContext<'_> {
    /// Read a storage item
    #[must_use]
    pub fn storage_get(&self, key: &str) -> Option<&str> {
        self.storage.get(key).map(String::as_str)
    }

    /// Write a storage item
    pub fn storage_set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.storage.insert(key.into(), value.into());
    }

    /// Request navigation to `url` once the event handler returns
    pub fn goto(&mut self, url: impl Into<String>) {
        self.navigate_to = Some(url.into());
    }
}

/// An application simulated behind [`MockDriver`]
pub trait MockApp: Send {
    /// Called when a URL is (re)loaded, before the first render, with
    /// read access to storage
    fn on_load(&mut self, url: &str, storage: &HashMap<String, String>) {
        let _ = (url, storage);
    }

    /// Produce the document for `url`
    fn render(&self, url: &str, doc: &mut DocumentBuilder);

    /// React to an event on the element with `key`
    fn handle(&mut self, key: &str, event: AppEvent<'_>, ctx: &mut AppContext<'_>) {
        let _ = (key, event, ctx);
    }
}

/// [`Driver`] implementation over a [`MockApp`]
pub struct MockDriver {
    app: Box<dyn MockApp>,
    document: MockDocument,
    storage: HashMap<String, String>,
    url: String,
    history: Vec<String>,
    call_log: Vec<String>,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver")
            .field("url", &self.url)
            .field("generation", &self.document.generation)
            .field("elements", &self.document.elements.len())
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Wrap an app. The document stays blank until the first `navigate`.
    pub fn new(app: impl MockApp + 'static) -> Self {
        Self {
            app: Box::new(app),
            document: MockDocument::default(),
            storage: HashMap::new(),
            url: "about:blank".to_string(),
            history: Vec::new(),
            call_log: Vec::new(),
        }
    }

    /// Seed a storage item before the first navigation
    pub fn seed_storage(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.storage.insert(key.into(), value.into());
    }

    /// Events delivered so far, newest last
    #[must_use]
    pub fn call_log(&self) -> &[String] {
        &self.call_log
    }

    fn load(&mut self, url: String) {
        self.document.generation += 1;
        self.url = url;
        self.app.on_load(&self.url, &self.storage);
        self.render();
    }

    /// Rebuild the document in place, same generation
    fn render(&mut self) {
        let mut builder = DocumentBuilder::new();
        self.app.render(&self.url, &mut builder);
        self.document.elements = builder.into_elements();
    }

    fn element(&self, handle: &ElementHandle) -> HarnessResult<&MockElement> {
        if handle.generation != self.document.generation {
            return Err(HarnessError::DriverCommand {
                message: format!(
                    "stale element handle (generation {} != {})",
                    handle.generation, self.document.generation
                ),
            });
        }
        self.document
            .elements
            .iter()
            .find(|e| e.id == handle.id)
            .ok_or_else(|| HarnessError::DriverCommand {
                message: format!("element {} no longer in the document", handle.id),
            })
    }

    fn deliver(&mut self, handle: &ElementHandle, event: AppEvent<'_>) -> HarnessResult<()> {
        let key = self.element(handle)?.key.clone();
        self.call_log.push(format!("{event:?} -> {key}"));
        let mut ctx = AppContext {
            storage: &mut self.storage,
            navigate_to: None,
        };
        self.app.handle(&key, event, &mut ctx);
        match ctx.navigate_to {
            Some(url) => {
                self.history.push(self.url.clone());
                self.load(url);
            }
            None => self.render(),
        }
        Ok(())
    }
}

impl Driver for MockDriver {
    fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        if self.url != "about:blank" {
            self.history.push(self.url.clone());
        }
        self.load(url.to_string());
        Ok(())
    }

    fn reload(&mut self) -> HarnessResult<()> {
        let url = self.url.clone();
        self.load(url);
        Ok(())
    }

    fn go_back(&mut self) -> HarnessResult<()> {
        let previous = self.history.pop().ok_or_else(|| HarnessError::Navigation {
            url: self.url.clone(),
            message: "no history to go back to".to_string(),
        })?;
        self.load(previous);
        Ok(())
    }

    fn current_url(&self) -> HarnessResult<String> {
        Ok(self.url.clone())
    }

    fn query(
        &self,
        selector: &Selector,
        scope: Option<&ElementHandle>,
    ) -> HarnessResult<Vec<ElementHandle>> {
        let scope_id = match scope {
            Some(handle) => Some(self.element(handle)?.id),
            None => None,
        };
        Ok(self
            .document
            .elements
            .iter()
            .filter(|e| e.matches(selector))
            .filter(|e| scope_id.map_or(true, |id| self.document.is_descendant(e, id)))
            .map(|e| ElementHandle::new(e.id, self.document.generation))
            .collect())
    }

    fn read_text(&self, handle: &ElementHandle) -> HarnessResult<String> {
        Ok(self.element(handle)?.text.clone())
    }

    fn read_attribute(&self, handle: &ElementHandle, name: &str) -> HarnessResult<Option<String>> {
        Ok(self.element(handle)?.attributes.get(name).cloned())
    }

    fn read_value(&self, handle: &ElementHandle) -> HarnessResult<String> {
        Ok(self.element(handle)?.value.clone())
    }

    fn is_visible(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        Ok(self.element(handle)?.visible)
    }

    fn is_checked(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        Ok(self.element(handle)?.checked)
    }

    fn is_focused(&self, handle: &ElementHandle) -> HarnessResult<bool> {
        Ok(self.element(handle)?.focused)
    }

    fn click(&mut self, handle: &ElementHandle) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::Click)
    }

    fn dblclick(&mut self, handle: &ElementHandle) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::DblClick)
    }

    fn hover(&mut self, handle: &ElementHandle) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::Hover)
    }

    fn fill(&mut self, handle: &ElementHandle, text: &str) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::Fill(text))
    }

    fn press(&mut self, handle: &ElementHandle, key: &str) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::Press(key))
    }

    fn set_checked(&mut self, handle: &ElementHandle, checked: bool) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::SetChecked(checked))
    }

    fn dispatch_event(&mut self, handle: &ElementHandle, event: &str) -> HarnessResult<()> {
        self.deliver(handle, AppEvent::Dispatch(event))
    }

    fn read_storage_item(&self, key: &str) -> HarnessResult<Option<String>> {
        Ok(self.storage.get(key).cloned())
    }
}
