//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a re-resolvable reference to UI elements, not a cached
//! element handle. Construction is pure: no driver traffic, no waiting,
//! no failure for selectors that currently match nothing. Absence is only
//! discovered when the locator is later queried or acted upon.

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// ARIA role with an optional accessible name
    /// (e.g., role "button" named "Clear completed")
    Role {
        /// ARIA role
        role: String,
        /// Accessible name; `None` matches any name
        name: Option<String>,
    },
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Placeholder text of an input
    Placeholder(String),
    /// Associated label text
    Label(String),
    /// CSS selector (e.g., "button.primary")
    Css(String),
}

impl Selector {
    /// Create a role selector matching any accessible name
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: None,
        }
    }

    /// Create a role selector with an exact accessible name
    #[must_use]
    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Create a label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name:?}]"),
            Self::TestId(id) => write!(f, "test-id={id}"),
            Self::Placeholder(text) => write!(f, "placeholder={text:?}"),
            Self::Label(text) => write!(f, "label={text:?}"),
            Self::Css(css) => write!(f, "css={css}"),
        }
    }
}

/// A re-resolvable reference to zero or more elements.
///
/// Wraps a [`Selector`] plus an optional ordinal index and an optional
/// parent locator for scoping. Re-resolved lazily on every operation;
/// never holds a live element handle, because the underlying document
/// mutates between actions.
#[derive(Debug, Clone)]
pub struct Locator {
    selector: Selector,
    index: Option<usize>,
    parent: Option<Box<Locator>>,
}

impl Locator {
    /// Create a locator from a selector. Pure: returns immediately and
    /// never fails for a non-matching selector.
    #[must_use]
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            index: None,
            parent: None,
        }
    }

    /// Shorthand for a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Selector::css(selector))
    }

    /// Shorthand for a test-id locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::new(Selector::test_id(id))
    }

    /// Shorthand for a placeholder locator
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::new(Selector::placeholder(text))
    }

    /// Shorthand for a label locator
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::new(Selector::label(text))
    }

    /// Shorthand for a role locator
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::new(Selector::role(role))
    }

    /// Shorthand for a named role locator
    #[must_use]
    pub fn role_named(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(Selector::role_named(role, name))
    }

    /// Narrow this locator to the nth match (0-based)
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Create a locator scoped to descendants of this one
    #[must_use]
    pub fn child(&self, selector: Selector) -> Self {
        Self {
            selector,
            index: None,
            parent: Some(Box::new(self.clone())),
        }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the ordinal index, if narrowed
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Get the parent scope, if any
    #[must_use]
    pub fn parent(&self) -> Option<&Locator> {
        self.parent.as_deref()
    }

    /// Whether the caller explicitly requested first/nth semantics
    #[must_use]
    pub const fn is_narrowed(&self) -> bool {
        self.index.is_some()
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(index) = self.index {
            write!(f, ":nth({index})")?;
        }
        Ok(())
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}
