//! Configuration for the outreach pass.

use std::time::Duration;

use crate::security::Credentials;

/// Configuration for one outreach campaign.
#[derive(Debug, Clone)]
pub struct OutreachConfig {
    /// Account credentials for login
    pub credentials: Credentials,

    /// Job-title search string producing the candidate list
    pub query_title: String,

    /// Message text sent to each candidate
    pub message_body: String,

    /// Maximum sends per calendar day. Default: 10.
    pub max_messages_per_day: usize,

    /// Pause between consecutive sends. Default: 10 seconds.
    pub delay_between_messages: Duration,

    /// Wait through a manually-solved challenge page during login.
    ///
    /// Default: true.
    pub manual_captcha: bool,

    /// Budget for the whole login sequence, challenge included.
    ///
    /// Default: 120 seconds.
    pub login_timeout: Duration,

    /// Budget for each per-candidate UI step (open chat, type, submit,
    /// close). Default: 10 seconds.
    pub step_timeout: Duration,

    /// Settle time after each scroll while loading the full results list.
    ///
    /// Default: 2 seconds.
    pub scroll_settle: Duration,

    /// Page structure markers (selectors and URL fragments)
    pub markers: PageMarkers,
}

impl OutreachConfig {
    /// Create a config with the required campaign inputs and defaults
    /// elsewhere.
    pub fn new(
        credentials: Credentials,
        query_title: impl Into<String>,
        message_body: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            query_title: query_title.into(),
            message_body: message_body.into(),
            max_messages_per_day: 10,
            delay_between_messages: Duration::from_secs(10),
            manual_captcha: true,
            login_timeout: Duration::from_secs(120),
            step_timeout: Duration::from_secs(10),
            scroll_settle: Duration::from_secs(2),
            markers: PageMarkers::default(),
        }
    }

    /// Set the daily send cap.
    pub fn with_max_messages_per_day(mut self, max: usize) -> Self {
        self.max_messages_per_day = max;
        self
    }

    /// Set the pause between consecutive sends.
    pub fn with_delay_between_messages(mut self, delay: Duration) -> Self {
        self.delay_between_messages = delay;
        self
    }

    /// Enable or disable waiting through a manual challenge during login.
    pub fn with_manual_captcha(mut self, enabled: bool) -> Self {
        self.manual_captcha = enabled;
        self
    }

    /// Set the login budget.
    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    /// Set the per-candidate step budget.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Set the scroll settle time.
    pub fn with_scroll_settle(mut self, settle: Duration) -> Self {
        self.scroll_settle = settle;
        self
    }

    /// Replace the page markers.
    pub fn with_markers(mut self, markers: PageMarkers) -> Self {
        self.markers = markers;
        self
    }
}

/// Selectors and URL fragments locating the network's UI surfaces.
///
/// Defaults match the layout the pass was written against; class names on
/// the live site churn, so operators can override any marker without
/// touching the pass logic.
#[derive(Debug, Clone)]
pub struct PageMarkers {
    /// Login page URL
    pub login_url: String,

    /// Username input on the login page
    pub username_field: String,

    /// Password input on the login page
    pub password_field: String,

    /// Login form submit button
    pub login_submit: String,

    /// Element present when credentials were rejected
    pub credential_error: String,

    /// URL fragment of the post-login landing page
    pub authenticated_url_marker: String,

    /// URL fragment of the manual challenge page
    pub challenge_url_marker: String,

    /// Element present only in an authenticated session
    pub authenticated_marker: String,

    /// Button that opens the global search input
    pub search_open_button: String,

    /// Global search input
    pub search_input: String,

    /// Search results list container
    pub results_container: String,

    /// Filter button restricting results to people
    pub people_filter: String,

    /// Filter button restricting results to first-degree connections
    pub first_degree_filter: String,

    /// Per-result message button
    pub message_button: String,

    /// Message composer inside an open chat pane
    pub chat_input: String,

    /// Chat send button
    pub send_button: String,

    /// Element confirming the message left the composer
    pub send_confirmation: String,

    /// Button closing the chat pane
    pub chat_close_button: String,
}

impl Default for PageMarkers {
    fn default() -> Self {
        Self {
            login_url: "https://www.example-network.com/login".to_string(),
            username_field: "input#username".to_string(),
            password_field: "input#password".to_string(),
            login_submit: "button[type='submit']".to_string(),
            credential_error: "div#error-for-password".to_string(),
            authenticated_url_marker: "feed".to_string(),
            challenge_url_marker: "checkpoint/challenge".to_string(),
            authenticated_marker: "input[aria-label='Search']".to_string(),
            search_open_button: "button[aria-label='Click to start a search']".to_string(),
            search_input: "input[aria-label='Search']".to_string(),
            results_container: "div.search-results-container".to_string(),
            people_filter: "button[aria-label='People']".to_string(),
            first_degree_filter: "button[aria-label='1st']".to_string(),
            message_button: "button[aria-label^='Message']".to_string(),
            chat_input: "div.msg-form__contenteditable[role='textbox']".to_string(),
            send_button: "button.msg-form__send-button[type='submit']".to_string(),
            send_confirmation: "div.msg-s-event-listitem__body".to_string(),
            chat_close_button: "button.msg-overlay-bubble-header__control--close".to_string(),
        }
    }
}
