//! Testing utilities including a scripted browser session.
//!
//! [`MockBrowser`] resolves every operation against configured page
//! state, instantly and deterministically: waits never sleep, they
//! succeed or time out based on what the test registered. This keeps
//! pass-engine tests free of real drivers and real clocks.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{BrowserSession, Element, WaitCondition};
use crate::error::{BrowserError, BrowserResult};
use crate::types::config::PageMarkers;

/// Record of a call made to the mock browser.
#[derive(Debug, Clone)]
pub enum MockBrowserCall {
    Navigate { url: String },
    Click { element_id: String },
    TypeText { selector: String, text: String },
    Script { script: String },
    Wait { condition: String },
}

/// A scripted browser session for testing.
#[derive(Default)]
pub struct MockBrowser {
    current_url: Arc<RwLock<String>>,

    page_source: Arc<RwLock<String>>,

    /// Present elements by selector, with a count for `find_all`
    elements: Arc<RwLock<HashMap<String, usize>>>,

    /// Visible text by selector
    texts: Arc<RwLock<HashMap<String, String>>>,

    /// Clicking any element of the selector navigates to the URL
    click_navigations: Arc<RwLock<HashMap<String, String>>>,

    /// Element ids whose click times out
    failing_clicks: Arc<RwLock<HashSet<String>>>,

    /// Script results by script text
    script_results: Arc<RwLock<HashMap<String, serde_json::Value>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockBrowserCall>>>,
}

impl MockBrowser {
    /// Create an empty mock with no page state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one present element.
    pub fn with_element(self, selector: impl Into<String>) -> Self {
        self.with_elements(selector, 1)
    }

    /// Register `count` present elements for the selector.
    pub fn with_elements(self, selector: impl Into<String>, count: usize) -> Self {
        self.elements.write().unwrap().insert(selector.into(), count);
        self
    }

    /// Set the visible text of a selector's element.
    pub fn with_text(self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.write().unwrap().insert(selector.into(), text.into());
        self
    }

    /// Set the current page markup.
    pub fn with_page_source(self, html: impl Into<String>) -> Self {
        *self.page_source.write().unwrap() = html.into();
        self
    }

    /// Make clicking the selector navigate to the URL.
    pub fn with_click_navigation(
        self,
        selector: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.click_navigations
            .write()
            .unwrap()
            .insert(selector.into(), url.into());
        self
    }

    /// Make clicking the `index`-th element of the selector time out.
    pub fn fail_click(self, selector: &str, index: usize) -> Self {
        self.failing_clicks
            .write()
            .unwrap()
            .insert(element_id(selector, index));
        self
    }

    /// Set the result of a script.
    pub fn with_script_result(
        self,
        script: impl Into<String>,
        result: serde_json::Value,
    ) -> Self {
        self.script_results
            .write()
            .unwrap()
            .insert(script.into(), result);
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockBrowserCall> {
        self.calls.read().unwrap().clone()
    }

    /// Texts typed into elements of the selector, in order.
    pub fn typed_into(&self, selector: &str) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockBrowserCall::TypeText { selector: s, text } if s == selector => {
                    Some(text.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Ids of every clicked element, in order.
    pub fn clicked(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                MockBrowserCall::Click { element_id } => Some(element_id.clone()),
                _ => None,
            })
            .collect()
    }

    fn count_of(&self, selector: &str) -> usize {
        self.elements
            .read()
            .unwrap()
            .get(selector)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, call: MockBrowserCall) {
        self.calls.write().unwrap().push(call);
    }
}

fn element_id(selector: &str, index: usize) -> String {
    format!("{selector}#{index}")
}

#[async_trait]
impl BrowserSession for MockBrowser {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.record(MockBrowserCall::Navigate {
            url: url.to_string(),
        });
        *self.current_url.write().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> BrowserResult<String> {
        Ok(self.current_url.read().unwrap().clone())
    }

    async fn page_source(&self) -> BrowserResult<String> {
        Ok(self.page_source.read().unwrap().clone())
    }

    async fn find(&self, selector: &str) -> BrowserResult<Element> {
        if self.count_of(selector) == 0 {
            return Err(BrowserError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        Ok(Element::new(element_id(selector, 0), selector))
    }

    async fn find_all(&self, selector: &str) -> BrowserResult<Vec<Element>> {
        let count = self.count_of(selector);
        Ok((0..count)
            .map(|i| Element::new(element_id(selector, i), selector))
            .collect())
    }

    async fn click(&self, element: &Element) -> BrowserResult<()> {
        self.record(MockBrowserCall::Click {
            element_id: element.id.clone(),
        });

        if self.failing_clicks.read().unwrap().contains(&element.id) {
            return Err(BrowserError::Timeout {
                condition: format!("click on `{}`", element.id),
            });
        }

        let target = self
            .click_navigations
            .read()
            .unwrap()
            .get(&element.selector)
            .cloned();
        if let Some(url) = target {
            *self.current_url.write().unwrap() = url;
        }
        Ok(())
    }

    async fn type_text(&self, element: &Element, text: &str) -> BrowserResult<()> {
        self.record(MockBrowserCall::TypeText {
            selector: element.selector.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn text(&self, element: &Element) -> BrowserResult<String> {
        Ok(self
            .texts
            .read()
            .unwrap()
            .get(&element.selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn execute_script(&self, script: &str) -> BrowserResult<serde_json::Value> {
        self.record(MockBrowserCall::Script {
            script: script.to_string(),
        });
        Ok(self
            .script_results
            .read()
            .unwrap()
            .get(script)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn wait_until(
        &self,
        condition: WaitCondition,
        _timeout: Duration,
    ) -> BrowserResult<()> {
        self.record(MockBrowserCall::Wait {
            condition: condition.to_string(),
        });

        let satisfied = match &condition {
            WaitCondition::UrlContains(fragment) => {
                self.current_url.read().unwrap().contains(fragment)
            }
            WaitCondition::ElementPresent(selector)
            | WaitCondition::ElementClickable(selector) => self.count_of(selector) > 0,
        };

        if satisfied {
            Ok(())
        } else {
            Err(BrowserError::Timeout {
                condition: condition.to_string(),
            })
        }
    }
}

/// A mock pre-wired for the whole happy path: login succeeds, search UI
/// is present, and the results page carries `button_count` message
/// buttons over the given markup.
pub fn logged_in_browser(
    markers: &PageMarkers,
    results_html: impl Into<String>,
    button_count: usize,
) -> MockBrowser {
    MockBrowser::new()
        .with_element(&markers.username_field)
        .with_element(&markers.password_field)
        .with_element(&markers.login_submit)
        .with_click_navigation(
            &markers.login_submit,
            format!(
                "https://www.example-network.com/{}",
                markers.authenticated_url_marker
            ),
        )
        .with_element(&markers.authenticated_marker)
        .with_element(&markers.search_open_button)
        .with_element(&markers.search_input)
        .with_element(&markers.results_container)
        .with_element(&markers.people_filter)
        .with_element(&markers.first_degree_filter)
        .with_elements(&markers.message_button, button_count)
        .with_element(&markers.chat_input)
        .with_element(&markers.send_button)
        .with_element(&markers.send_confirmation)
        .with_element(&markers.chat_close_button)
        .with_page_source(results_html)
}

/// Build a results-page fixture with one card per `(profile_url, name)`
/// pair, matching the default extractor selectors.
pub fn results_page(profiles: &[(&str, &str)]) -> String {
    let cards: String = profiles
        .iter()
        .map(|(url, name)| {
            format!(
                r#"<li class="reusable-search__result-container">
                     <a class="app-aware-link" href="{url}">
                       <span aria-hidden="true">{name}</span>
                     </a>
                   </li>"#
            )
        })
        .collect();
    format!("<html><body><ul>{cards}</ul></body></html>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_missing_element_fails() {
        let browser = MockBrowser::new();
        let result = browser.find("div.missing").await;
        assert!(matches!(
            result,
            Err(BrowserError::ElementNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_wait_resolves_against_state() {
        let browser = MockBrowser::new().with_element("div.present");

        assert!(browser
            .wait_until(
                WaitCondition::ElementPresent("div.present".to_string()),
                Duration::from_secs(1),
            )
            .await
            .is_ok());

        let err = browser
            .wait_until(
                WaitCondition::ElementPresent("div.absent".to_string()),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_click_navigation_updates_url() {
        let browser = MockBrowser::new()
            .with_element("button.go")
            .with_click_navigation("button.go", "https://site.example/feed");

        browser.click_selector("button.go").await.unwrap();
        assert_eq!(
            browser.current_url().await.unwrap(),
            "https://site.example/feed"
        );
    }

    #[tokio::test]
    async fn test_failing_click() {
        let browser = MockBrowser::new()
            .with_elements("button.msg", 2)
            .fail_click("button.msg", 1);

        let buttons = browser.find_all("button.msg").await.unwrap();
        assert!(browser.click(&buttons[0]).await.is_ok());
        assert!(browser.click(&buttons[1]).await.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_typed_into_records_in_order() {
        let browser = MockBrowser::new().with_element("input.q");
        browser.type_into("input.q", "first").await.unwrap();
        browser.type_into("input.q", "second").await.unwrap();
        assert_eq!(browser.typed_into("input.q"), vec!["first", "second"]);
    }

    #[test]
    fn test_results_page_matches_default_selectors() {
        let html = results_page(&[("https://site.example/in/a", "A"), ("https://site.example/in/b", "B")]);
        let extractor = crate::extract::ProfileExtractor::new();
        let candidates = extractor.extract(&html);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "A");
    }
}
