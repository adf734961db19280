//! Ledger records and recipient identity derivation.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use url::Url;

/// One row per outreach attempt that produced a visible success signal.
///
/// Records are append-only: created after a confirmed send, never mutated,
/// destroyed only in bulk via an explicit clear. The recipient's identity
/// for duplicate suppression is not the raw `profile_url` but the id
/// derived from it (see [`profile_id`]), so superficially different URLs
/// for the same person still collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentMessage {
    /// The sender's own account identifier, recorded per attempt
    pub sender_email: String,

    /// Recipient profile URL as captured at send time (may carry tracking
    /// parameters)
    pub profile_url: String,

    /// Recipient display name at time of contact ("Unknown" when the page
    /// gave none)
    pub name: String,

    /// The search string that produced this candidate
    pub query_title: String,

    /// When the message was sent; `None` for loaded rows whose persisted
    /// value did not parse
    pub sent_at: Option<DateTime<Local>>,

    /// Exact text sent
    pub message_body: String,
}

impl SentMessage {
    /// Create a record for a send that just succeeded, stamped now.
    pub fn new(
        sender_email: impl Into<String>,
        profile_url: impl Into<String>,
        message_body: impl Into<String>,
    ) -> Self {
        Self {
            sender_email: sender_email.into(),
            profile_url: profile_url.into(),
            name: "Unknown".to_string(),
            query_title: String::new(),
            sent_at: Some(Local::now()),
            message_body: message_body.into(),
        }
    }

    /// Set the recipient name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the search title that produced the candidate.
    pub fn with_query_title(mut self, title: impl Into<String>) -> Self {
        self.query_title = title.into();
        self
    }

    /// Override the send timestamp.
    pub fn with_sent_at(mut self, sent_at: DateTime<Local>) -> Self {
        self.sent_at = Some(sent_at);
        self
    }

    /// Calendar date of the send in the ledger's local time zone.
    pub fn sent_on(&self) -> Option<NaiveDate> {
        self.sent_at.map(|t| t.date_naive())
    }

    /// Derived recipient identity, if the URL yields one.
    pub fn profile_id(&self) -> Option<String> {
        profile_id(&self.profile_url)
    }
}

/// Derive the recipient identity from a profile URL.
///
/// The id is the path segment following the fixed `in/` prefix, with the
/// query string (tracking parameters) ignored. Returns `None` for
/// malformed or empty URLs and for paths outside the `in/` convention;
/// ambiguous inputs count as "not previously contacted" rather than
/// blocking outreach.
pub fn profile_id(profile_url: &str) -> Option<String> {
    let parsed = Url::parse(profile_url.trim()).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    match segments.next() {
        Some("in") => segments.next().map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_id_strips_query() {
        assert_eq!(
            profile_id("https://site.example/in/jane-doe-123?query=abc"),
            Some("jane-doe-123".to_string())
        );
    }

    #[test]
    fn test_profile_id_trailing_slash() {
        assert_eq!(
            profile_id("https://site.example/in/jane-doe-123/"),
            Some("jane-doe-123".to_string())
        );
    }

    #[test]
    fn test_profile_id_rejects_other_paths() {
        assert_eq!(profile_id("https://site.example/company/acme"), None);
        assert_eq!(profile_id("https://site.example/"), None);
    }

    #[test]
    fn test_profile_id_malformed() {
        assert_eq!(profile_id(""), None);
        assert_eq!(profile_id("not a url"), None);
    }

    #[test]
    fn test_sent_on_uses_local_date() {
        let record = SentMessage::new("me@example.com", "https://site.example/in/a", "hi");
        assert_eq!(record.sent_on(), Some(Local::now().date_naive()));
    }

    #[test]
    fn test_record_id_matches_free_function() {
        let record = SentMessage::new(
            "me@example.com",
            "https://site.example/in/jane-doe-123?trk=search",
            "hi",
        );
        assert_eq!(record.profile_id(), Some("jane-doe-123".to_string()));
    }
}
