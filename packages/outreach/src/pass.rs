//! The outreach pass: login → search → scroll → send loop.
//!
//! One pass is strictly sequential. Per candidate the order is fixed:
//! duplicate check, then send, then append, never interleaved across candidates,
//! since both the daily cap and the duplicate check read the ledger's
//! current state. A mutex serializes whole passes so a scheduler firing
//! mid-run cannot start a second one.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::browser::{BrowserSession, Element, WaitCondition};
use crate::error::{BrowserResult, PassError, PassResult};
use crate::extract::ProfileExtractor;
use crate::ledger::Ledger;
use crate::policy;
use crate::types::candidate::CandidateProfile;
use crate::types::config::OutreachConfig;
use crate::types::record::SentMessage;

const SCROLL_HEIGHT_SCRIPT: &str = "return document.body.scrollHeight";
const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Counters for one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Messages sent and recorded
    pub sent: usize,

    /// Candidates skipped as already contacted
    pub duplicates: usize,

    /// Candidates abandoned after a step failure or timeout
    pub errors: usize,
}

/// Result of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The cap check failed before anything started; nothing was done
    CapAlreadyReached,

    /// The pass ran to the end (possibly with per-candidate errors)
    Completed(PassStats),
}

/// What happened to a single candidate inside the send loop.
enum CandidateOutcome {
    Sent,
    Duplicate,
    Failed,
}

fn auth_failure(error: crate::error::BrowserError) -> PassError {
    PassError::Authentication {
        reason: error.to_string(),
    }
}

/// Drives outreach passes against a browser session.
pub struct OutreachEngine<L> {
    ledger: Arc<L>,
    extractor: ProfileExtractor,
    config: OutreachConfig,
    pass_guard: Mutex<()>,
}

impl<L: Ledger> OutreachEngine<L> {
    /// Create an engine with the default extractor.
    pub fn new(ledger: Arc<L>, config: OutreachConfig) -> Self {
        Self {
            ledger,
            extractor: ProfileExtractor::new(),
            config,
            pass_guard: Mutex::new(()),
        }
    }

    /// Replace the profile extractor.
    pub fn with_extractor(mut self, extractor: ProfileExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The ledger backing this engine.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Execute one full outreach pass.
    ///
    /// Concurrent invocations (manual or scheduler-fired) queue on an
    /// internal mutex: exactly one pass is active at a time. Candidate-
    /// local failures are counted and skipped; login and ledger-write
    /// failures abort the pass.
    pub async fn run_pass<B: BrowserSession + ?Sized>(
        &self,
        browser: &B,
    ) -> PassResult<PassOutcome> {
        let _active = self.pass_guard.lock().await;

        let today = Local::now().date_naive();
        let max = self.config.max_messages_per_day;

        if policy::has_reached_cap(&*self.ledger, today, max).await {
            info!(max, "Daily cap already reached; skipping pass");
            return Ok(PassOutcome::CapAlreadyReached);
        }

        self.login(browser).await?;
        self.search(browser).await?;
        self.scroll_to_load(browser).await?;

        let html = browser.page_source().await?;
        let candidates = self.extractor.extract(&html);
        if candidates.is_empty() {
            warn!("No profiles found in search results");
            return Ok(PassOutcome::Completed(PassStats::default()));
        }
        info!(count = candidates.len(), "Extracted candidate profiles");

        let buttons = browser.find_all(&self.config.markers.message_button).await?;

        // Candidates and buttons come from independent reads of the same
        // page; pair them positionally and let the shorter sequence win.
        if buttons.len() != candidates.len() {
            warn!(
                candidates = candidates.len(),
                buttons = buttons.len(),
                "Profile cards and message buttons disagree; pairing up to the shorter"
            );
        }

        let quota = policy::remaining_quota(&*self.ledger, today, max).await;
        let limit = candidates.len().min(buttons.len()).min(quota);
        info!(limit, quota, "Starting send loop");

        let mut stats = PassStats::default();
        for (index, (candidate, button)) in
            candidates.iter().zip(buttons.iter()).take(limit).enumerate()
        {
            match self.message_candidate(browser, index, candidate, button).await? {
                CandidateOutcome::Sent => stats.sent += 1,
                CandidateOutcome::Duplicate => stats.duplicates += 1,
                CandidateOutcome::Failed => stats.errors += 1,
            }
        }

        info!(
            sent = stats.sent,
            duplicates = stats.duplicates,
            errors = stats.errors,
            "Pass completed"
        );
        Ok(PassOutcome::Completed(stats))
    }

    /// Log into the network.
    ///
    /// Any failure to reach an authenticated state within the login
    /// budget aborts the pass before a single send; an explicit
    /// credential-error element upgrades the reason.
    async fn login<B: BrowserSession + ?Sized>(&self, browser: &B) -> PassResult<()> {
        let markers = &self.config.markers;
        info!("Logging in");

        let attempt: BrowserResult<()> = async {
            browser.navigate(&markers.login_url).await?;
            browser
                .wait_until(
                    WaitCondition::ElementPresent(markers.username_field.clone()),
                    self.config.step_timeout,
                )
                .await?;
            browser
                .type_into(&markers.username_field, &self.config.credentials.email)
                .await?;
            browser
                .type_into(
                    &markers.password_field,
                    self.config.credentials.password.expose(),
                )
                .await?;
            browser.click_selector(&markers.login_submit).await?;
            Ok(())
        }
        .await;
        attempt.map_err(auth_failure)?;

        let current = browser.current_url().await.map_err(auth_failure)?;
        if current.contains(&markers.challenge_url_marker) {
            if !self.config.manual_captcha {
                return Err(PassError::Authentication {
                    reason: "challenge page encountered with manual solving disabled".to_string(),
                });
            }
            info!("Challenge page detected; waiting for it to be solved in the browser");
        }

        let authenticated: BrowserResult<()> = async {
            browser
                .wait_until(
                    WaitCondition::UrlContains(markers.authenticated_url_marker.clone()),
                    self.config.login_timeout,
                )
                .await?;
            browser
                .wait_until(
                    WaitCondition::ElementPresent(markers.authenticated_marker.clone()),
                    self.config.step_timeout,
                )
                .await?;
            Ok(())
        }
        .await;

        if let Err(e) = authenticated {
            // A visible credential error beats the generic timeout reason
            if let Ok(element) = browser.find(&markers.credential_error).await {
                let detail = browser.text(&element).await.unwrap_or_default();
                let reason = if detail.is_empty() {
                    "credentials rejected by the login form".to_string()
                } else {
                    format!("credentials rejected: {detail}")
                };
                return Err(PassError::Authentication { reason });
            }
            return Err(auth_failure(e));
        }

        info!("Login successful");
        Ok(())
    }

    /// Run the people search for the configured title.
    async fn search<B: BrowserSession + ?Sized>(&self, browser: &B) -> PassResult<()> {
        let markers = &self.config.markers;
        let timeout = self.config.step_timeout;
        info!(title = %self.config.query_title, "Searching for people");

        browser
            .wait_until(
                WaitCondition::ElementClickable(markers.search_open_button.clone()),
                timeout,
            )
            .await?;
        browser.click_selector(&markers.search_open_button).await?;

        browser
            .wait_until(
                WaitCondition::ElementPresent(markers.search_input.clone()),
                timeout,
            )
            .await?;
        // Trailing newline submits the search form
        browser
            .type_into(
                &markers.search_input,
                &format!("{}\n", self.config.query_title),
            )
            .await?;

        browser
            .wait_until(
                WaitCondition::ElementPresent(markers.results_container.clone()),
                timeout,
            )
            .await?;

        for filter in [&markers.people_filter, &markers.first_degree_filter] {
            browser
                .wait_until(WaitCondition::ElementClickable(filter.clone()), timeout)
                .await?;
            browser.click_selector(filter).await?;
        }

        browser
            .wait_until(
                WaitCondition::ElementPresent(markers.results_container.clone()),
                timeout,
            )
            .await?;

        Ok(())
    }

    /// Scroll until the document height stops growing.
    async fn scroll_to_load<B: BrowserSession + ?Sized>(&self, browser: &B) -> PassResult<()> {
        let mut last_height = self.document_height(browser).await?;
        loop {
            browser.execute_script(SCROLL_TO_BOTTOM_SCRIPT).await?;
            tokio::time::sleep(self.config.scroll_settle).await;

            let new_height = self.document_height(browser).await?;
            if new_height == last_height {
                break;
            }
            last_height = new_height;
        }
        Ok(())
    }

    async fn document_height<B: BrowserSession + ?Sized>(
        &self,
        browser: &B,
    ) -> PassResult<i64> {
        let value = browser.execute_script(SCROLL_HEIGHT_SCRIPT).await?;
        Ok(value.as_i64().unwrap_or(0))
    }

    /// Handle one candidate: duplicate check, send, record.
    ///
    /// Browser failures here are candidate-local: logged with index and
    /// URL, then reported as `Failed` so the pass moves on (no retry).
    /// A ledger write failure after a confirmed send is pass-fatal.
    async fn message_candidate<B: BrowserSession + ?Sized>(
        &self,
        browser: &B,
        index: usize,
        candidate: &CandidateProfile,
        button: &Element,
    ) -> PassResult<CandidateOutcome> {
        if self.ledger.is_duplicate(&candidate.url).await {
            info!(index, url = %candidate.url, "Skipping duplicate recipient");
            return Ok(CandidateOutcome::Duplicate);
        }

        info!(index, name = %candidate.name, url = %candidate.url, "Sending message");
        if let Err(e) = self.drive_send(browser, button).await {
            error!(
                index,
                url = %candidate.url,
                error = %e,
                "Candidate step failed; skipping to the next candidate"
            );
            return Ok(CandidateOutcome::Failed);
        }

        let record = SentMessage::new(
            &self.config.credentials.email,
            &candidate.url,
            &self.config.message_body,
        )
        .with_name(&candidate.name)
        .with_query_title(&self.config.query_title);

        if let Err(e) = self.ledger.append(&record).await {
            error!(
                index,
                url = %candidate.url,
                error = %e,
                "Send succeeded but the ledger append failed; record may be lost"
            );
            return Err(PassError::Ledger(e));
        }

        if let Err(e) = self.close_chat(browser).await {
            warn!(index, error = %e, "Failed to close chat pane");
        }

        tokio::time::sleep(self.config.delay_between_messages).await;
        Ok(CandidateOutcome::Sent)
    }

    /// Open the chat, type the message, submit, and await the visible
    /// success signal. Only after that signal does the caller append a
    /// ledger record.
    async fn drive_send<B: BrowserSession + ?Sized>(
        &self,
        browser: &B,
        button: &Element,
    ) -> BrowserResult<()> {
        let markers = &self.config.markers;
        let timeout = self.config.step_timeout;

        browser.click(button).await?;
        browser
            .wait_until(
                WaitCondition::ElementPresent(markers.chat_input.clone()),
                timeout,
            )
            .await?;

        let input = browser.find(&markers.chat_input).await?;
        browser.click(&input).await?;
        browser.type_text(&input, &self.config.message_body).await?;

        browser
            .wait_until(
                WaitCondition::ElementClickable(markers.send_button.clone()),
                timeout,
            )
            .await?;
        browser.click_selector(&markers.send_button).await?;

        browser
            .wait_until(
                WaitCondition::ElementPresent(markers.send_confirmation.clone()),
                timeout,
            )
            .await
    }

    async fn close_chat<B: BrowserSession + ?Sized>(&self, browser: &B) -> BrowserResult<()> {
        let markers = &self.config.markers;
        browser
            .wait_until(
                WaitCondition::ElementClickable(markers.chat_close_button.clone()),
                self.config.step_timeout,
            )
            .await?;
        browser.click_selector(&markers.chat_close_button).await
    }
}
