//! Mock applications driven by the integration scenarios: a TodoMVC
//! clone persisting to storage, a flash-message login form, and an
//! HR-suite login landing on a dashboard.

// Each integration binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use comprobar::prelude::*;

pub const TODO_URL: &str = "https://todo.test/";
pub const STORAGE_KEY: &str = "react-todos";

pub const AUTH_URL: &str = "https://auth.test/login";
pub const AUTH_SECURE_URL: &str = "https://auth.test/secure";
pub const AUTH_USER: &str = "practice";
pub const AUTH_PASSWORD: &str = "SuperSecretPassword!";

pub const HR_URL: &str = "https://hr.test/web/index.php/auth/login";
pub const HR_DASHBOARD_URL: &str = "https://hr.test/web/index.php/dashboard/index";
pub const HR_USER: &str = "Admin";
pub const HR_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Todo {
    title: String,
    completed: bool,
}

/// TodoMVC clone: footer filters via URL fragments, persistence under
/// [`STORAGE_KEY`] as a JSON array of `{title, completed}` objects.
#[derive(Debug, Default)]
pub struct TodoApp {
    todos: Vec<Todo>,
    input: String,
    editing: Option<(usize, String)>,
    hovered: Option<usize>,
}

impl TodoApp {
    pub fn new() -> Self {
        Self::default()
    }

    fn visible(&self, url: &str) -> Vec<usize> {
        (0..self.todos.len())
            .filter(|&i| {
                if url.ends_with("#/active") {
                    !self.todos[i].completed
                } else if url.ends_with("#/completed") {
                    self.todos[i].completed
                } else {
                    true
                }
            })
            .collect()
    }

    fn persist(&self, ctx: &mut AppContext<'_>) {
        if let Ok(json) = serde_json::to_string(&self.todos) {
            ctx.storage_set(STORAGE_KEY, json);
        }
    }

    fn commit_edit(&mut self, ctx: &mut AppContext<'_>) {
        if let Some((index, draft)) = self.editing.take() {
            let trimmed = draft.trim();
            if trimmed.is_empty() {
                self.todos.remove(index);
            } else {
                self.todos[index].title = trimmed.to_string();
            }
            self.persist(ctx);
        }
    }

    fn remaining(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }
}

fn key_index(key: &str, prefix: &str) -> Option<usize> {
    key.strip_prefix(prefix).and_then(|s| s.parse().ok())
}

impl MockApp for TodoApp {
    fn on_load(&mut self, _url: &str, storage: &HashMap<String, String>) {
        self.todos = storage
            .get(STORAGE_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();
        self.input.clear();
        self.editing = None;
        self.hovered = None;
    }

    fn render(&self, url: &str, doc: &mut DocumentBuilder) {
        let input = ElementSpec::new("new-todo")
            .role("textbox")
            .placeholder("What needs to be done?")
            .value(self.input.clone());
        doc.push(if self.editing.is_none() {
            input.focused()
        } else {
            input
        });

        for index in self.visible(url) {
            let todo = &self.todos[index];
            let editing_this = self.editing.as_ref().is_some_and(|(i, _)| *i == index);
            let mut class = String::new();
            if todo.completed {
                class.push_str("completed");
            }
            if editing_this {
                if !class.is_empty() {
                    class.push(' ');
                }
                class.push_str("editing");
            }
            let li = doc.push(
                ElementSpec::new(format!("item-{index}"))
                    .test_id("todo-item")
                    .text(todo.title.clone())
                    .attr("class", class),
            );

            let toggle = ElementSpec::new(format!("toggle-{index}"))
                .role("checkbox")
                .checked(todo.completed)
                .child_of(li);
            doc.push(if editing_this { toggle.hidden() } else { toggle });

            let title = ElementSpec::new(format!("title-{index}"))
                .test_id("todo-title")
                .text(todo.title.clone())
                .child_of(li);
            doc.push(if editing_this { title.hidden() } else { title });

            if editing_this {
                let draft = self.editing.as_ref().map(|(_, d)| d.clone()).unwrap_or_default();
                doc.push(
                    ElementSpec::new(format!("edit-{index}"))
                        .role("textbox")
                        .named("Edit")
                        .value(draft)
                        .focused()
                        .child_of(li),
                );
            }

            let delete = ElementSpec::new(format!("delete-{index}"))
                .role("button")
                .named("Delete")
                .child_of(li);
            doc.push(if self.hovered == Some(index) {
                delete
            } else {
                delete.hidden()
            });
        }

        if !self.todos.is_empty() {
            doc.push(
                ElementSpec::new("toggle-all")
                    .role("checkbox")
                    .label("Mark all as complete")
                    .checked(self.remaining() == 0),
            );

            let n = self.remaining();
            let noun = if n == 1 { "item" } else { "items" };
            doc.push(
                ElementSpec::new("counter")
                    .test_id("todo-count")
                    .text(format!("{n} {noun} left")),
            );

            for (key, name, suffix) in [
                ("filter-all", "All", ""),
                ("filter-active", "Active", "#/active"),
                ("filter-completed", "Completed", "#/completed"),
            ] {
                let selected = if suffix.is_empty() {
                    !url.contains('#') || url.ends_with("#/")
                } else {
                    url.ends_with(suffix)
                };
                let link = ElementSpec::new(key).role("link").named(name);
                doc.push(if selected { link.attr("class", "selected") } else { link });
            }

            if self.todos.iter().any(|t| t.completed) {
                doc.push(
                    ElementSpec::new("clear-completed")
                        .role("button")
                        .named("Clear completed"),
                );
            }
        }
    }

    fn handle(&mut self, key: &str, event: AppEvent<'_>, ctx: &mut AppContext<'_>) {
        match (key, event) {
            ("new-todo", AppEvent::Fill(text)) => self.input = text.to_string(),
            ("new-todo", AppEvent::Press("Enter")) => {
                let trimmed = self.input.trim().to_string();
                if !trimmed.is_empty() {
                    self.todos.push(Todo {
                        title: trimmed,
                        completed: false,
                    });
                    self.persist(ctx);
                }
                self.input.clear();
            }
            ("toggle-all", AppEvent::Click) => {
                let target = self.remaining() != 0;
                for todo in &mut self.todos {
                    todo.completed = target;
                }
                self.persist(ctx);
            }
            ("toggle-all", AppEvent::SetChecked(target)) => {
                for todo in &mut self.todos {
                    todo.completed = target;
                }
                self.persist(ctx);
            }
            ("clear-completed", AppEvent::Click) => {
                self.todos.retain(|t| !t.completed);
                self.hovered = None;
                self.persist(ctx);
            }
            ("filter-all", AppEvent::Click) => ctx.goto(TODO_URL),
            ("filter-active", AppEvent::Click) => ctx.goto(format!("{TODO_URL}#/active")),
            ("filter-completed", AppEvent::Click) => ctx.goto(format!("{TODO_URL}#/completed")),
            _ => {
                if let Some(index) = key_index(key, "toggle-") {
                    match event {
                        AppEvent::Click => {
                            self.todos[index].completed = !self.todos[index].completed;
                            self.persist(ctx);
                        }
                        AppEvent::SetChecked(target) => {
                            self.todos[index].completed = target;
                            self.persist(ctx);
                        }
                        _ => {}
                    }
                } else if let Some(index) = key_index(key, "title-") {
                    if event == AppEvent::DblClick {
                        self.editing = Some((index, self.todos[index].title.clone()));
                    }
                } else if key_index(key, "edit-").is_some() {
                    match event {
                        AppEvent::Fill(text) => {
                            if let Some((_, draft)) = &mut self.editing {
                                *draft = text.to_string();
                            }
                        }
                        AppEvent::Press("Enter") | AppEvent::Dispatch("blur") => {
                            self.commit_edit(ctx);
                        }
                        AppEvent::Press("Escape") => self.editing = None,
                        _ => {}
                    }
                } else if let Some(index) = key_index(key, "item-") {
                    if event == AppEvent::Hover {
                        self.hovered = Some(index);
                    }
                } else if let Some(index) = key_index(key, "delete-") {
                    if event == AppEvent::Click {
                        self.todos.remove(index);
                        self.hovered = None;
                        self.persist(ctx);
                    }
                }
            }
        }
    }
}

/// Flash-message login form: wrong username and wrong password produce
/// distinct messages, success navigates to a secure area.
#[derive(Debug, Default)]
pub struct AuthApp {
    username: String,
    password: String,
    flash: Option<String>,
}

impl AuthApp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MockApp for AuthApp {
    fn on_load(&mut self, _url: &str, _storage: &HashMap<String, String>) {
        self.username.clear();
        self.password.clear();
        // The flash message survives the redirect to /secure.
    }

    fn render(&self, url: &str, doc: &mut DocumentBuilder) {
        if url == AUTH_SECURE_URL {
            doc.push(ElementSpec::new("secure-header").role("heading").text("Secure Area"));
        } else {
            doc.push(
                ElementSpec::new("username")
                    .role("textbox")
                    .css("#username")
                    .value(self.username.clone()),
            );
            doc.push(
                ElementSpec::new("password")
                    .role("textbox")
                    .css("#password")
                    .value(self.password.clone()),
            );
            doc.push(
                ElementSpec::new("submit")
                    .role("button")
                    .named("Login")
                    .css("button[type='submit']"),
            );
        }
        if let Some(flash) = &self.flash {
            doc.push(ElementSpec::new("flash").css("#flash").text(flash.clone()));
        }
    }

    fn handle(&mut self, key: &str, event: AppEvent<'_>, ctx: &mut AppContext<'_>) {
        match (key, event) {
            ("username", AppEvent::Fill(text)) => self.username = text.to_string(),
            ("password", AppEvent::Fill(text)) => self.password = text.to_string(),
            ("submit", AppEvent::Click) => {
                if self.username != AUTH_USER {
                    self.flash = Some("Your username is invalid!".to_string());
                } else if self.password != AUTH_PASSWORD {
                    self.flash = Some("Your password is invalid!".to_string());
                } else {
                    self.flash = Some("You logged into a secure area!".to_string());
                    ctx.goto(AUTH_SECURE_URL);
                }
            }
            _ => {}
        }
    }
}

/// HR-suite login: valid credentials land on a dashboard whose
/// breadcrumb header reads "Dashboard".
#[derive(Debug, Default)]
pub struct HrApp {
    username: String,
    password: String,
    flash: Option<String>,
}

impl HrApp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MockApp for HrApp {
    fn on_load(&mut self, _url: &str, _storage: &HashMap<String, String>) {
        self.username.clear();
        self.password.clear();
    }

    fn render(&self, url: &str, doc: &mut DocumentBuilder) {
        if url == HR_DASHBOARD_URL {
            doc.push(
                ElementSpec::new("breadcrumb")
                    .role("heading")
                    .css("h6.oxd-text.oxd-text--h6.oxd-topbar-header-breadcrumb-module")
                    .text("Dashboard"),
            );
            return;
        }
        doc.push(
            ElementSpec::new("username")
                .role("textbox")
                .css("#username")
                .value(self.username.clone()),
        );
        doc.push(
            ElementSpec::new("password")
                .role("textbox")
                .css("#password")
                .value(self.password.clone()),
        );
        doc.push(
            ElementSpec::new("submit")
                .role("button")
                .named("Login")
                .css("button[type='submit']"),
        );
        if let Some(flash) = &self.flash {
            doc.push(ElementSpec::new("flash").css("#flash").text(flash.clone()));
        }
    }

    fn handle(&mut self, key: &str, event: AppEvent<'_>, ctx: &mut AppContext<'_>) {
        match (key, event) {
            ("username", AppEvent::Fill(text)) => self.username = text.to_string(),
            ("password", AppEvent::Fill(text)) => self.password = text.to_string(),
            ("submit", AppEvent::Click) => {
                if self.username == HR_USER && self.password == HR_PASSWORD {
                    self.flash = None;
                    ctx.goto(HR_DASHBOARD_URL);
                } else {
                    self.flash = Some("Invalid credentials".to_string());
                }
            }
            _ => {}
        }
    }
}

/// A session over a fresh Todo app with a short poll budget, so failing
/// assertions surface quickly in tests
pub fn todo_session() -> Session {
    comprobar::init_tracing();
    Session::with_policy(
        MockDriver::new(TodoApp::new()),
        PollPolicy::new().with_timeout(1_000).with_interval(10),
    )
}

pub fn auth_session() -> Session {
    comprobar::init_tracing();
    Session::with_policy(
        MockDriver::new(AuthApp::new()),
        PollPolicy::new().with_timeout(1_000).with_interval(10),
    )
}

pub fn hr_session() -> Session {
    comprobar::init_tracing();
    Session::with_policy(
        MockDriver::new(HrApp::new()),
        PollPolicy::new().with_timeout(1_000).with_interval(10),
    )
}
