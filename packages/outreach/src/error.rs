//! Typed errors for the outreach library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors from the outreach ledger.
///
/// Read-side failures never surface here: loading a missing or corrupt
/// ledger degrades to an empty history with a logged warning. Write-side
/// failures are fatal to the append that triggered them and must reach the
/// caller, since a lost record risks exceeding the daily cap.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Storage write failed; in-memory and on-disk views may now disagree
    #[error("persistence error: {0}")]
    Persistence(#[source] std::io::Error),

    /// Record could not be encoded for storage
    #[error("encode error: {0}")]
    Encode(#[from] csv::Error),
}

/// Errors constructing a profile extractor.
///
/// Extraction itself never fails; only configuration can.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A custom CSS selector did not parse
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Errors from the external browser session.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// A wait-until condition did not hold within its budget
    #[error("timed out waiting for {condition}")]
    Timeout { condition: String },

    /// No element matched the selector
    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    /// Navigation failed
    #[error("navigation failed: {url}")]
    Navigation { url: String },

    /// Script execution failed
    #[error("script error: {0}")]
    Script(String),

    /// Session-level failure (connection lost, driver crashed)
    #[error("session error: {0}")]
    Session(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BrowserError {
    /// Whether this error is a wait timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::Timeout { .. })
    }
}

/// Errors that abort a whole outreach pass.
///
/// Candidate-local failures (a chat that never opened, a send that timed
/// out) are counted into [`crate::pass::PassStats`] and never surface here.
#[derive(Debug, Error)]
pub enum PassError {
    /// Login did not reach an authenticated state, or an explicit
    /// credential-error element was detected
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// Ledger write failed after a confirmed send
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A browser failure before the send loop (search, results, scroll)
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
}

/// Errors from the daily schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Requested wall-clock time is not a valid HH:MM
    #[error("invalid daily time {hour:02}:{minute:02}")]
    InvalidTime { hour: u8, minute: u8 },

    /// The underlying scheduler failed
    #[error("scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Result type alias for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Result type alias for browser operations.
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// Result type alias for pass execution.
pub type PassResult<T> = std::result::Result<T, PassError>;
