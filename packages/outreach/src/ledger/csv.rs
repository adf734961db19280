//! File-backed ledger over a fixed-column CSV table.
//!
//! Columns: `Email, ProfileURL, Name, Title, Date, Message`. Missing
//! columns on load are synthesized as empty; an unparseable `Date` cell
//! becomes a null timestamp rather than rejecting the row.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::types::record::SentMessage;

const COLUMNS: [&str; 6] = ["Email", "ProfileURL", "Name", "Title", "Date", "Message"];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ledger persisted as a CSV file.
///
/// Queries re-read the file so every check sees the latest persisted
/// state; appends go through a mutex, keeping the ledger single-writer
/// across the duplicate-check/append pair.
pub struct CsvLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLedger {
    /// Create a ledger backed by the given file path.
    ///
    /// The file is created on first append; a missing file reads as an
    /// empty history.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_rows(bytes: &[u8]) -> Result<Vec<SentMessage>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes);

        // Map each fixed column to its position in whatever header the
        // file actually has; absent columns synthesize as empty.
        let headers = reader.headers()?.clone();
        let positions: Vec<Option<usize>> = COLUMNS
            .iter()
            .map(|name| headers.iter().position(|h| h == *name))
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |col: usize| -> String {
                positions[col]
                    .and_then(|i| row.get(i))
                    .unwrap_or("")
                    .to_string()
            };

            records.push(SentMessage {
                sender_email: field(0),
                profile_url: field(1),
                name: field(2),
                query_title: field(3),
                sent_at: parse_date(&field(4)),
                message_body: field(5),
            });
        }
        Ok(records)
    }

    fn encode_row(record: &SentMessage) -> Result<Vec<u8>, csv::Error> {
        let mut buf = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buf);
            writer.write_record([
                record.sender_email.as_str(),
                record.profile_url.as_str(),
                record.name.as_str(),
                record.query_title.as_str(),
                &record
                    .sent_at
                    .map(|t| t.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                record.message_body.as_str(),
            ])?;
            writer.flush().map_err(csv::Error::from)?;
        }
        Ok(buf)
    }

    fn encode_header() -> Result<Vec<u8>, csv::Error> {
        let mut buf = Vec::new();
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buf);
            writer.write_record(COLUMNS)?;
            writer.flush().map_err(csv::Error::from)?;
        }
        Ok(buf)
    }
}

/// Parse a persisted timestamp, coercing invalid values to `None`.
fn parse_date(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        return Local.from_local_datetime(&naive).earliest();
    }
    if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
        return Some(fixed.with_timezone(&Local));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Local.from_local_datetime(&date.into()).earliest();
    }
    None
}

#[async_trait]
impl Ledger for CsvLedger {
    async fn load(&self) -> Vec<SentMessage> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read ledger; assuming empty history");
                return Vec::new();
            }
        };

        match Self::parse_rows(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ledger file is corrupt; assuming empty history");
                Vec::new()
            }
        }
    }

    async fn append(&self, record: &SentMessage) -> LedgerResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(LedgerError::Persistence)?;
            }
        }

        let needs_header = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(LedgerError::Persistence(e)),
        };

        let mut bytes = Vec::new();
        if needs_header {
            bytes.extend(Self::encode_header()?);
        }
        bytes.extend(Self::encode_row(record)?);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(LedgerError::Persistence)?;
        file.write_all(&bytes)
            .await
            .map_err(LedgerError::Persistence)?;
        file.flush().await.map_err(LedgerError::Persistence)?;

        Ok(())
    }

    async fn clear_all(&self) -> LedgerResult<()> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::Persistence(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_ledger() -> (tempfile::TempDir, CsvLedger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CsvLedger::new(dir.path().join("sent_messages.csv"));
        (dir, ledger)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let (_dir, ledger) = temp_ledger();
        assert!(ledger.load().await.is_empty());
        assert!(!ledger.is_duplicate("https://site.example/in/nobody").await);
    }

    #[tokio::test]
    async fn test_append_then_load_round_trip() {
        let (_dir, ledger) = temp_ledger();
        let record = SentMessage::new(
            "me@example.com",
            "https://site.example/in/jane-doe-123?trk=search",
            "Hello Jane",
        )
        .with_name("Jane Doe")
        .with_query_title("Staff Engineer");

        ledger.append(&record).await.unwrap();

        let loaded = ledger.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].sender_email, "me@example.com");
        assert_eq!(loaded[0].name, "Jane Doe");
        assert_eq!(loaded[0].query_title, "Staff Engineer");
        assert_eq!(loaded[0].message_body, "Hello Jane");
        assert_eq!(loaded[0].sent_on(), record.sent_on());
    }

    #[tokio::test]
    async fn test_duplicate_ignores_query_string() {
        let (_dir, ledger) = temp_ledger();
        let record = SentMessage::new(
            "me@example.com",
            "https://site.example/in/jane-doe-123?trk=search",
            "Hello",
        );
        ledger.append(&record).await.unwrap();

        assert!(
            ledger
                .is_duplicate("https://site.example/in/jane-doe-123?utm=other")
                .await
        );
        assert!(
            ledger
                .is_duplicate("https://site.example/in/jane-doe-123")
                .await
        );
        assert!(
            !ledger
                .is_duplicate("https://site.example/in/someone-else")
                .await
        );
    }

    #[tokio::test]
    async fn test_count_for_date() {
        let (_dir, ledger) = temp_ledger();
        let today = Local::now().date_naive();

        for i in 0..3 {
            let record = SentMessage::new(
                "me@example.com",
                format!("https://site.example/in/person-{i}"),
                "Hello",
            );
            ledger.append(&record).await.unwrap();
        }

        assert_eq!(ledger.count_for_date(today).await, 3);
        // Idempotent: reading twice gives the same answer
        assert_eq!(ledger.count_for_date(today).await, 3);

        let other_day = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        assert_eq!(ledger.count_for_date(other_day).await, 0);
    }

    #[tokio::test]
    async fn test_clear_all_empties_history() {
        let (_dir, ledger) = temp_ledger();
        let record = SentMessage::new("me@example.com", "https://site.example/in/a", "Hello");
        ledger.append(&record).await.unwrap();

        ledger.clear_all().await.unwrap();

        assert!(ledger.load().await.is_empty());
        assert_eq!(
            ledger.count_for_date(Local::now().date_naive()).await,
            0
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let (_dir, ledger) = temp_ledger();
        tokio::fs::write(
            ledger.path(),
            b"Email,ProfileURL,Name,Title,Date,Message\n\xff\xfe\xff,broken\n".as_slice(),
        )
        .await
        .unwrap();

        assert!(ledger.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_columns_synthesized() {
        let (_dir, ledger) = temp_ledger();
        tokio::fs::write(
            ledger.path(),
            b"ProfileURL,Date\nhttps://site.example/in/jane,2024-03-01 09:30:00\n",
        )
        .await
        .unwrap();

        let loaded = ledger.load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].profile_url, "https://site.example/in/jane");
        assert_eq!(loaded[0].sender_email, "");
        assert_eq!(loaded[0].name, "");
        assert_eq!(
            loaded[0].sent_on(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }

    #[tokio::test]
    async fn test_invalid_date_coerced_to_null() {
        let (_dir, ledger) = temp_ledger();
        tokio::fs::write(
            ledger.path(),
            b"Email,ProfileURL,Name,Title,Date,Message\nme@x.com,https://site.example/in/jane,Jane,CTO,not-a-date,hi\n",
        )
        .await
        .unwrap();

        let loaded = ledger.load().await;
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].sent_at.is_none());
        // Null-dated rows never count toward any day's cap
        assert_eq!(
            ledger.count_for_date(Local::now().date_naive()).await,
            0
        );
        // But they still suppress duplicates
        assert!(ledger.is_duplicate("https://site.example/in/jane").await);
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-03-01 09:30:00").is_some());
        assert!(parse_date("2024-03-01").is_some());
        assert!(parse_date("2024-03-01T09:30:00+02:00").is_some());
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday").is_none());
    }
}
