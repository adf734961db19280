//! Dedup-Ledgered Outreach Automation
//!
//! Automates connection messages on a professional network: log in,
//! search people by job title, open each match's messaging pane, send a
//! templated message, and record every send in a durable ledger that
//! enforces duplicate suppression and a daily cap.
//!
//! # Design Philosophy
//!
//! - The ledger and the cap policy are the real system; everything else
//!   sequences an external browser.
//! - Browser control is a trait seam ([`BrowserSession`]), never a
//!   bundled driver.
//! - Candidate-local failures skip, never abort: a pass makes maximal
//!   forward progress.
//! - Read failures degrade (empty history), write failures shout.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outreach::{Credentials, CsvLedger, OutreachConfig, OutreachEngine};
//!
//! let ledger = Arc::new(CsvLedger::new("sent_messages.csv"));
//! let config = OutreachConfig::new(
//!     Credentials::new("me@example.com", password),
//!     "Engineering Manager",
//!     "Hi — I'd love to connect.",
//! );
//! let engine = OutreachEngine::new(ledger, config);
//!
//! // `browser` is any BrowserSession implementation
//! let outcome = engine.run_pass(&browser).await?;
//! ```
//!
//! # Modules
//!
//! - [`ledger`] - Durable outreach history (CSV-backed and in-memory)
//! - [`extract`] - Profile extraction from search-results markup
//! - [`policy`] - Daily cap gate
//! - [`browser`] - Browser session trait seam
//! - [`pass`] - The outreach pass engine
//! - [`schedule`] - Daily wall-clock trigger
//! - [`security`] - Credential handling
//! - [`testing`] - Scripted mocks for tests

pub mod browser;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod pass;
pub mod policy;
pub mod schedule;
pub mod security;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use browser::{BrowserSession, Element, WaitCondition};
pub use error::{
    BrowserError, ExtractError, LedgerError, PassError, ScheduleError,
};
pub use extract::{ProfileExtractor, SelectorConfig};
pub use ledger::{CsvLedger, Ledger, MemoryLedger};
pub use pass::{OutreachEngine, PassOutcome, PassStats};
pub use policy::{has_reached_cap, remaining_quota};
pub use schedule::{DailyScheduler, DailyTime, SchedulerState};
pub use security::{Credentials, SecretString};
pub use types::{
    candidate::CandidateProfile,
    config::{OutreachConfig, PageMarkers},
    record::{profile_id, SentMessage},
};
