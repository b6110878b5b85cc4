//! Page object for a TodoMVC-style task list.
//!
//! Encodes the app's accessible surface (placeholder text, test ids,
//! role names) once, so scenarios speak in terms of `add`, `toggle`,
//! `edit`, and storage-level assertions rather than raw selectors.

use crate::locator::{Locator, Selector};
use crate::page::PageObject;
use crate::result::HarnessResult;
use crate::session::Session;

/// The visibility filters offered by the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Show everything
    All,
    /// Show incomplete items
    Active,
    /// Show completed items
    Completed,
}

impl Filter {
    /// The accessible name of the filter's footer link
    #[must_use]
    pub const fn link_name(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

/// TodoMVC page object
#[derive(Debug, Clone)]
pub struct TodoPage {
    base_url: String,
    storage_key: String,
}

impl TodoPage {
    /// Create a page object rooted at `base_url`, persisting under
    /// `storage_key`
    pub fn new(base_url: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            storage_key: storage_key.into(),
        }
    }

    // --- locators ---

    /// The new-todo input box
    #[must_use]
    pub fn new_todo_input(&self) -> Locator {
        Locator::placeholder("What needs to be done?")
    }

    /// All todo list items
    #[must_use]
    pub fn items(&self) -> Locator {
        Locator::test_id("todo-item")
    }

    /// All todo title labels
    #[must_use]
    pub fn titles(&self) -> Locator {
        Locator::test_id("todo-title")
    }

    /// The items-remaining counter
    #[must_use]
    pub fn counter(&self) -> Locator {
        Locator::test_id("todo-count")
    }

    /// The item at `index`
    #[must_use]
    pub fn item(&self, index: usize) -> Locator {
        self.items().nth(index)
    }

    fn toggle_of(&self, index: usize) -> Locator {
        self.item(index).child(Selector::role("checkbox"))
    }

    fn edit_box_of(&self, index: usize) -> Locator {
        self.item(index).child(Selector::role_named("textbox", "Edit"))
    }

    fn delete_button_of(&self, index: usize) -> Locator {
        self.item(index).child(Selector::role_named("button", "Delete"))
    }

    fn toggle_all(&self) -> Locator {
        Locator::label("Mark all as complete")
    }

    fn clear_completed_button(&self) -> Locator {
        Locator::role_named("button", "Clear completed")
    }

    fn filter_link(&self, filter: Filter) -> Locator {
        Locator::role_named("link", filter.link_name())
    }

    // --- actions ---

    /// Add one todo via the input box
    pub fn add(&self, session: &Session, title: &str) -> HarnessResult<()> {
        let input = self.new_todo_input();
        session.fill(&input, title)?;
        session.press(&input, "Enter")
    }

    /// Add several todos in order
    pub fn add_all(&self, session: &Session, titles: &[&str]) -> HarnessResult<()> {
        for title in titles {
            self.add(session, title)?;
        }
        Ok(())
    }

    /// Flip the completion checkbox of the item at `index`
    pub fn toggle(&self, session: &Session, index: usize) -> HarnessResult<()> {
        session.click(&self.toggle_of(index))
    }

    /// Drive the item at `index` to an explicit completion state
    pub fn set_completed(&self, session: &Session, index: usize, completed: bool) -> HarnessResult<()> {
        session.set_checked(&self.toggle_of(index), completed)
    }

    /// Drive every item to an explicit completion state via the
    /// mark-all toggle
    pub fn set_all_completed(&self, session: &Session, completed: bool) -> HarnessResult<()> {
        session.set_checked(&self.toggle_all(), completed)
    }

    /// Rewrite the title of the item at `index` and commit with Enter
    pub fn edit(&self, session: &Session, index: usize, new_title: &str) -> HarnessResult<()> {
        session.dblclick(&self.titles().nth(index))?;
        let edit_box = self.edit_box_of(index);
        session.fill(&edit_box, new_title)?;
        session.press(&edit_box, "Enter")
    }

    /// Start an edit, type a draft, then abandon it with Escape
    pub fn cancel_edit(&self, session: &Session, index: usize, draft: &str) -> HarnessResult<()> {
        session.dblclick(&self.titles().nth(index))?;
        let edit_box = self.edit_box_of(index);
        session.fill(&edit_box, draft)?;
        session.press(&edit_box, "Escape")
    }

    /// Rewrite the title of the item at `index` and commit by blurring
    pub fn blur_edit(&self, session: &Session, index: usize, new_title: &str) -> HarnessResult<()> {
        session.dblclick(&self.titles().nth(index))?;
        let edit_box = self.edit_box_of(index);
        session.fill(&edit_box, new_title)?;
        session.dispatch_event(&edit_box, "blur")
    }

    /// Delete the item at `index` via its hover-revealed button
    pub fn delete(&self, session: &Session, index: usize) -> HarnessResult<()> {
        session.hover(&self.item(index))?;
        session.click(&self.delete_button_of(index))
    }

    /// Remove all completed items
    pub fn clear_completed(&self, session: &Session) -> HarnessResult<()> {
        session.click(&self.clear_completed_button())
    }

    /// Switch the footer filter
    pub fn filter(&self, session: &Session, filter: Filter) -> HarnessResult<()> {
        session.click(&self.filter_link(filter))
    }

    // --- assertions ---

    /// Visible item titles equal `expected`, in order
    pub fn assert_titles(&self, session: &Session, expected: &[&str]) -> HarnessResult<()> {
        session.expect(&self.titles()).to_have_texts(expected)
    }

    /// Exactly `expected` items are in the list
    pub fn assert_count(&self, session: &Session, expected: usize) -> HarnessResult<()> {
        session.expect(&self.items()).to_have_count(expected)
    }

    /// The item at `index` carries (or lacks) the completed styling
    pub fn assert_completed(
        &self,
        session: &Session,
        index: usize,
        completed: bool,
    ) -> HarnessResult<()> {
        let expect = session.expect(&self.item(index));
        if completed {
            expect.to_have_class("completed")
        } else {
            expect.to_not_have_class("completed")
        }
    }

    /// The item's toggle reflects `checked`
    pub fn assert_toggle(
        &self,
        session: &Session,
        index: usize,
        checked: bool,
    ) -> HarnessResult<()> {
        let expect = session.expect(&self.toggle_of(index));
        if checked {
            expect.to_be_checked()
        } else {
            expect.to_not_be_checked()
        }
    }

    /// The mark-all toggle reflects `checked`
    pub fn assert_toggle_all(&self, session: &Session, checked: bool) -> HarnessResult<()> {
        let expect = session.expect(&self.toggle_all());
        if checked {
            expect.to_be_checked()
        } else {
            expect.to_not_be_checked()
        }
    }

    /// The counter reads exactly `expected` (e.g. `"2 items left"`)
    pub fn assert_counter_text(&self, session: &Session, expected: &str) -> HarnessResult<()> {
        session.expect(&self.counter()).to_have_text(expected)
    }

    /// The counter is absent, as it is when the list is empty
    pub fn assert_counter_hidden(&self, session: &Session) -> HarnessResult<()> {
        session.expect(&self.counter()).to_be_hidden()
    }

    /// The input box has been cleared after a commit
    pub fn assert_input_empty(&self, session: &Session) -> HarnessResult<()> {
        session.expect(&self.new_todo_input()).to_be_empty()
    }

    /// The input box keeps focus between commits
    pub fn assert_input_focused(&self, session: &Session) -> HarnessResult<()> {
        session.expect(&self.new_todo_input()).to_be_focused()
    }

    /// The Clear-completed button is not offered
    pub fn assert_clear_completed_hidden(&self, session: &Session) -> HarnessResult<()> {
        session.expect(&self.clear_completed_button()).to_be_hidden()
    }

    /// The footer link for `filter` is (or is not) highlighted
    pub fn assert_filter_selected(
        &self,
        session: &Session,
        filter: Filter,
        selected: bool,
    ) -> HarnessResult<()> {
        let expect = session.expect(&self.filter_link(filter));
        if selected {
            expect.to_have_class("selected")
        } else {
            expect.to_not_have_class("selected")
        }
    }

    // --- storage assertions ---

    /// Persisted array holds exactly `expected` entries
    pub fn assert_stored_count(&self, session: &Session, expected: usize) -> HarnessResult<()> {
        session.expect_storage(
            &self.storage_key,
            &format!("{expected} stored item(s)"),
            move |value| value.as_array().is_some_and(|items| items.len() == expected),
        )
    }

    /// Persisted array holds exactly `expected` completed entries
    pub fn assert_stored_completed_count(
        &self,
        session: &Session,
        expected: usize,
    ) -> HarnessResult<()> {
        session.expect_storage(
            &self.storage_key,
            &format!("{expected} stored completed item(s)"),
            move |value| {
                value.as_array().is_some_and(|items| {
                    items
                        .iter()
                        .filter(|item| {
                            item.get("completed").and_then(serde_json::Value::as_bool)
                                == Some(true)
                        })
                        .count()
                        == expected
                })
            },
        )
    }

    /// Persisted entry at `index` has the given completion state
    pub fn assert_stored_completed(
        &self,
        session: &Session,
        index: usize,
        completed: bool,
    ) -> HarnessResult<()> {
        session.expect_storage(
            &self.storage_key,
            &format!("item {index} stored as completed={completed}"),
            move |value| {
                value
                    .get(index)
                    .and_then(|item| item.get("completed"))
                    .and_then(serde_json::Value::as_bool)
                    == Some(completed)
            },
        )
    }

    /// Persisted entry at `index` has the given title
    pub fn assert_stored_title(
        &self,
        session: &Session,
        index: usize,
        title: &str,
    ) -> HarnessResult<()> {
        let title = title.to_string();
        session.expect_storage(
            &self.storage_key,
            &format!("item {index} stored with title {title:?}"),
            move |value| {
                value
                    .get(index)
                    .and_then(|item| item.get("title"))
                    .and_then(serde_json::Value::as_str)
                    == Some(title.as_str())
            },
        )
    }
}

impl PageObject for TodoPage {
    fn url(&self) -> &str {
        &self.base_url
    }

    fn landmark(&self) -> Locator {
        self.new_todo_input()
    }

    fn name(&self) -> &str {
        "todo"
    }
}
