//! Candidate profiles scraped from a search-results page.

use serde::{Deserialize, Serialize};

/// A prospective recipient discovered by scraping one results page.
///
/// Candidates are ephemeral: produced fresh per scrape, consumed by the
/// current pass, never cached across runs. Their order matches document
/// order, which the send loop relies on when pairing candidates with the
/// live page's message buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Display name ("Unknown" when the card gave none)
    pub name: String,

    /// Profile URL with the query string stripped
    pub url: String,

    /// Headline text (empty when absent)
    pub headline: String,

    /// Location text (empty when absent)
    pub location: String,
}

impl CandidateProfile {
    /// Create a candidate with the given URL and defaults elsewhere.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: "Unknown".to_string(),
            url: url.into(),
            headline: String::new(),
            location: String::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the headline.
    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = headline.into();
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}
