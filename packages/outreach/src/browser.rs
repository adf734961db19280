//! Browser session seam.
//!
//! The pass engine drives a remote browser through this trait and never
//! touches a driver directly. Implementations adapt whatever automation
//! backend the embedding application uses; tests use the scripted
//! [`crate::testing::MockBrowser`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserResult;

/// Opaque handle to a located element.
///
/// Valid only for the page state it was located in; a navigation or a
/// pane close may stale it, in which case operations on it fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Backend-scoped identifier
    pub id: String,

    /// Selector that located the element
    pub selector: String,
}

impl Element {
    /// Create an element handle.
    pub fn new(id: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            selector: selector.into(),
        }
    }
}

/// Conditions [`BrowserSession::wait_until`] can block on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// Current URL contains the fragment
    UrlContains(String),

    /// An element matching the selector exists
    ElementPresent(String),

    /// An element matching the selector exists and accepts clicks
    ElementClickable(String),
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::UrlContains(fragment) => write!(f, "url containing `{fragment}`"),
            WaitCondition::ElementPresent(selector) => write!(f, "element `{selector}`"),
            WaitCondition::ElementClickable(selector) => {
                write!(f, "clickable element `{selector}`")
            }
        }
    }
}

/// A live, authenticated-or-not browser session.
///
/// All operations act on the session's single current page. `type_text`
/// sends keystrokes to the element; a trailing newline submits the
/// enclosing form, matching driver conventions.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load a URL.
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// URL of the current page.
    async fn current_url(&self) -> BrowserResult<String>;

    /// Full markup of the current page.
    async fn page_source(&self) -> BrowserResult<String>;

    /// Locate the first element matching a CSS selector.
    async fn find(&self, selector: &str) -> BrowserResult<Element>;

    /// Locate every element matching a CSS selector, in document order.
    async fn find_all(&self, selector: &str) -> BrowserResult<Vec<Element>>;

    /// Click an element.
    async fn click(&self, element: &Element) -> BrowserResult<()>;

    /// Send keystrokes to an element.
    async fn type_text(&self, element: &Element, text: &str) -> BrowserResult<()>;

    /// Visible text of an element.
    async fn text(&self, element: &Element) -> BrowserResult<String>;

    /// Execute JavaScript in the page, returning its JSON result.
    async fn execute_script(&self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Block until the condition holds or the timeout elapses.
    async fn wait_until(&self, condition: WaitCondition, timeout: Duration) -> BrowserResult<()>;

    /// Find-and-click convenience.
    async fn click_selector(&self, selector: &str) -> BrowserResult<()> {
        let element = self.find(selector).await?;
        self.click(&element).await
    }

    /// Find-and-type convenience.
    async fn type_into(&self, selector: &str, text: &str) -> BrowserResult<()> {
        let element = self.find(selector).await?;
        self.type_text(&element, text).await
    }
}
