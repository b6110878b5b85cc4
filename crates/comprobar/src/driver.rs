//! Abstract driver boundary for browser automation.
//!
//! The harness never reimplements navigation, element location, or event
//! dispatch; it wraps a [`Driver`] supplied by the embedding project. The
//! trait is synchronous: driver calls are opaque blocking operations with
//! a driver-defined timeout, which is all the orchestration layer needs.
//!
//! Production drivers adapt a real automation backend behind this trait;
//! [`crate::mock::MockDriver`] implements it over an in-memory document
//! model for tests.

use serde::{Deserialize, Serialize};

use crate::locator::Selector;
use crate::result::HarnessResult;

/// Opaque handle to one resolved element.
///
/// Handles are tagged with the document generation they were resolved
/// against. Navigation, reload, and history traversal recreate the
/// document; drivers must reject handles from an earlier generation
/// rather than silently acting on a recreated element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned element identifier
    pub id: u64,
    /// Document generation the handle was resolved against
    pub generation: u64,
}

impl ElementHandle {
    /// Create a handle for an element in a given document generation
    #[must_use]
    pub const fn new(id: u64, generation: u64) -> Self {
        Self { id, generation }
    }
}

/// Browser automation primitives consumed by the harness.
///
/// Every method is fallible. Implementations surface their own failures
/// as [`crate::HarnessError::DriverCommand`] (or `Navigation` for
/// navigation-class failures); the harness passes those through opaquely.
pub trait Driver: Send {
    /// Navigate to a URL
    fn navigate(&mut self, url: &str) -> HarnessResult<()>;

    /// Reload the current document
    fn reload(&mut self) -> HarnessResult<()>;

    /// Go back one entry in history
    fn go_back(&mut self) -> HarnessResult<()>;

    /// Get the current URL
    fn current_url(&self) -> HarnessResult<String>;

    /// Resolve a selector to the elements currently matching it, in
    /// document order, optionally scoped to descendants of `scope`.
    /// An empty result is not an error.
    fn query(
        &self,
        selector: &Selector,
        scope: Option<&ElementHandle>,
    ) -> HarnessResult<Vec<ElementHandle>>;

    /// Read the visible text content of an element
    fn read_text(&self, handle: &ElementHandle) -> HarnessResult<String>;

    /// Read an attribute value, `None` if absent
    fn read_attribute(&self, handle: &ElementHandle, name: &str)
        -> HarnessResult<Option<String>>;

    /// Read the current value of an input element
    fn read_value(&self, handle: &ElementHandle) -> HarnessResult<String>;

    /// Whether the element is currently visible
    fn is_visible(&self, handle: &ElementHandle) -> HarnessResult<bool>;

    /// Whether a checkbox-like element is checked
    fn is_checked(&self, handle: &ElementHandle) -> HarnessResult<bool>;

    /// Whether the element currently holds focus
    fn is_focused(&self, handle: &ElementHandle) -> HarnessResult<bool>;

    /// Click an element
    fn click(&mut self, handle: &ElementHandle) -> HarnessResult<()>;

    /// Double-click an element
    fn dblclick(&mut self, handle: &ElementHandle) -> HarnessResult<()>;

    /// Hover over an element
    fn hover(&mut self, handle: &ElementHandle) -> HarnessResult<()>;

    /// Replace the value of an input element
    fn fill(&mut self, handle: &ElementHandle, text: &str) -> HarnessResult<()>;

    /// Press a named key (e.g., "Enter", "Escape") with the element focused
    fn press(&mut self, handle: &ElementHandle, key: &str) -> HarnessResult<()>;

    /// Set the checked state of a checkbox-like element
    fn set_checked(&mut self, handle: &ElementHandle, checked: bool) -> HarnessResult<()>;

    /// Dispatch a raw DOM event (e.g., "blur") on an element
    fn dispatch_event(&mut self, handle: &ElementHandle, event: &str) -> HarnessResult<()>;

    /// Read an item from the session's persisted storage, `None` if the
    /// key is absent
    fn read_storage_item(&self, key: &str) -> HarnessResult<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_generation_tagging() {
        let before = ElementHandle::new(7, 1);
        let after = ElementHandle::new(7, 2);
        assert_ne!(before, after);
        assert_eq!(before, ElementHandle::new(7, 1));
    }

    #[test]
    fn test_element_handle_serializes() {
        let handle = ElementHandle::new(3, 5);
        let json = serde_json::to_string(&handle).unwrap();
        let back: ElementHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(handle, back);
    }
}
