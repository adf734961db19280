//! Profile extraction from a search-results page.
//!
//! A pure transformation from one rendered, fully-scrolled markup snapshot
//! to an ordered list of [`CandidateProfile`]s. No network or browser
//! access happens here, which keeps the parser unit-testable against
//! saved fixtures.

use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::error::ExtractError;
use crate::types::candidate::CandidateProfile;

/// CSS selectors identifying a profile card and its parts.
///
/// Result-page class names churn; operators can override any of these
/// without touching the parser.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Container for one search result
    pub card: String,

    /// Profile link inside the card
    pub link: String,

    /// Accessible name text inside the link
    pub name: String,

    /// Headline block inside the card
    pub headline: String,

    /// Location block inside the card
    pub location: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "li.reusable-search__result-container".to_string(),
            link: "a.app-aware-link[href]".to_string(),
            name: "span[aria-hidden='true']".to_string(),
            headline: "div.entity-result__primary-subtitle".to_string(),
            location: "div.entity-result__secondary-subtitle".to_string(),
        }
    }
}

/// Parses candidate profiles out of raw search-results markup.
pub struct ProfileExtractor {
    card: Selector,
    link: Selector,
    name: Selector,
    headline: Selector,
    location: Selector,
}

impl Default for ProfileExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileExtractor {
    /// Create an extractor with the default selectors.
    pub fn new() -> Self {
        Self::with_selectors(&SelectorConfig::default())
            .expect("default selectors are valid")
    }

    /// Create an extractor with custom selectors.
    ///
    /// Fails on an unparseable selector; extraction itself never errors.
    pub fn with_selectors(config: &SelectorConfig) -> Result<Self, ExtractError> {
        let parse = |selector: &str| {
            Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
                selector: selector.to_string(),
                message: e.to_string(),
            })
        };
        Ok(Self {
            card: parse(&config.card)?,
            link: parse(&config.link)?,
            name: parse(&config.name)?,
            headline: parse(&config.headline)?,
            location: parse(&config.location)?,
        })
    }

    /// Extract candidates in document order.
    ///
    /// Document order is solicitation order: the send loop pairs this
    /// sequence positionally with the live page's message buttons. A card
    /// that yields no usable URL is skipped with a warning and the rest of
    /// the page still parses.
    pub fn extract(&self, html: &str) -> Vec<CandidateProfile> {
        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        for (index, card) in document.select(&self.card).enumerate() {
            let href = card
                .select(&self.link)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty());

            let Some(href) = href else {
                warn!(index, "Skipping profile card without a usable link");
                continue;
            };

            let name = card
                .select(&self.link)
                .next()
                .and_then(|link| {
                    link.select(&self.name)
                        .next()
                        .map(|el| collect_text(el))
                })
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());

            let headline = card
                .select(&self.headline)
                .next()
                .map(collect_text)
                .unwrap_or_default();

            let location = card
                .select(&self.location)
                .next()
                .map(collect_text)
                .unwrap_or_default();

            candidates.push(CandidateProfile {
                name,
                url: strip_query(href),
                headline,
                location,
            });
        }

        candidates
    }
}

fn collect_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Drop the query string (tracking parameters) from a profile href.
fn strip_query(href: &str) -> String {
    if let Ok(mut url) = Url::parse(href) {
        url.set_query(None);
        url.set_fragment(None);
        return url.to_string();
    }
    // Relative hrefs: cut at the query delimiter
    href.split('?').next().unwrap_or(href).to_string()
}
