//! Durable record of attempted outreach.
//!
//! The ledger answers two questions, "have I contacted this person?" and
//! "how many sends today?", and supports one mutation, append. It does
//! not self-enforce uniqueness: callers check [`Ledger::is_duplicate`]
//! before appending, and the ledger serializes writers so that the
//! read-then-write pair stays coherent.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::LedgerResult;
use crate::types::record::{profile_id, SentMessage};

mod csv;
mod memory;

pub use csv::CsvLedger;
pub use memory::MemoryLedger;

/// Append-only outreach history.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Read all persisted records.
    ///
    /// Missing storage yields an empty sequence, not an error; corrupt or
    /// partial storage logs a warning and yields an empty sequence rather
    /// than failing the caller.
    async fn load(&self) -> Vec<SentMessage>;

    /// Add one record, persisting before returning.
    ///
    /// A failed write leaves the in-memory and on-disk views possibly
    /// disagreeing; the caller must treat failure as "send happened,
    /// record may be lost" and surface it rather than retry the send.
    async fn append(&self, record: &SentMessage) -> LedgerResult<()>;

    /// Irreversibly remove every record. Administrative use only.
    async fn clear_all(&self) -> LedgerResult<()>;

    /// Whether this recipient was already contacted.
    ///
    /// URLs are compared by derived profile id, so tracking parameters
    /// never defeat the check. An unnormalizable URL is "not previously
    /// contacted", not an error.
    async fn is_duplicate(&self, profile_url: &str) -> bool {
        let Some(id) = profile_id(profile_url) else {
            return false;
        };
        self.load()
            .await
            .iter()
            .any(|r| r.profile_id().as_deref() == Some(id.as_str()))
    }

    /// Number of records sent on the given local calendar date.
    async fn count_for_date(&self, date: NaiveDate) -> usize {
        self.load()
            .await
            .iter()
            .filter(|r| r.sent_on() == Some(date))
            .count()
    }
}
