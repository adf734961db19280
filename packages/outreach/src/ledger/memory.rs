//! In-memory ledger for testing and development.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::types::record::SentMessage;

/// In-memory outreach history.
///
/// Useful for tests and development. Not suitable for production as
/// records are lost on restart.
#[derive(Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<SentMessage>>,
    fail_appends: AtomicBool,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger with existing records.
    pub fn with_records(self, records: impl IntoIterator<Item = SentMessage>) -> Self {
        self.records.write().unwrap().extend(records);
        self
    }

    /// Make every subsequent append fail with a persistence error.
    ///
    /// Lets tests exercise the "send happened, record may be lost" path.
    pub fn with_failing_appends(self) -> Self {
        self.fail_appends.store(true, Ordering::SeqCst);
        self
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn load(&self) -> Vec<SentMessage> {
        self.records.read().unwrap().clone()
    }

    async fn append(&self, record: &SentMessage) -> LedgerResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(LedgerError::Persistence(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated append failure",
            )));
        }
        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn clear_all(&self) -> LedgerResult<()> {
        self.records.write().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    #[tokio::test]
    async fn test_append_updates_duplicate_and_count() {
        let ledger = MemoryLedger::new();
        let today = Local::now().date_naive();
        let record = SentMessage::new(
            "me@example.com",
            "https://site.example/in/jane-doe-123?trk=x",
            "Hello",
        );

        assert!(!ledger.is_duplicate(&record.profile_url).await);
        let before = ledger.count_for_date(today).await;

        ledger.append(&record).await.unwrap();

        assert!(ledger.is_duplicate(&record.profile_url).await);
        assert_eq!(ledger.count_for_date(today).await, before + 1);
    }

    #[tokio::test]
    async fn test_unnormalizable_url_is_not_duplicate() {
        let ledger = MemoryLedger::new().with_records([SentMessage::new(
            "me@example.com",
            "https://site.example/in/jane",
            "Hello",
        )]);

        assert!(!ledger.is_duplicate("").await);
        assert!(!ledger.is_duplicate("not a url").await);
        assert!(!ledger.is_duplicate("https://site.example/company/acme").await);
    }

    #[tokio::test]
    async fn test_count_scoped_to_date() {
        let yesterday = Local::now() - Duration::days(1);
        let ledger = MemoryLedger::new().with_records([
            SentMessage::new("me@example.com", "https://site.example/in/a", "hi")
                .with_sent_at(yesterday),
            SentMessage::new("me@example.com", "https://site.example/in/b", "hi"),
        ]);

        assert_eq!(ledger.count_for_date(Local::now().date_naive()).await, 1);
        assert_eq!(ledger.count_for_date(yesterday.date_naive()).await, 1);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let ledger = MemoryLedger::new().with_records([SentMessage::new(
            "me@example.com",
            "https://site.example/in/a",
            "hi",
        )]);
        ledger.clear_all().await.unwrap();
        assert!(ledger.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_appends() {
        let ledger = MemoryLedger::new().with_failing_appends();
        let record = SentMessage::new("me@example.com", "https://site.example/in/a", "hi");

        let err = ledger.append(&record).await.unwrap_err();
        assert!(matches!(err, LedgerError::Persistence(_)));
        assert!(ledger.is_empty());
    }
}
