//! Daily cap policy, composed from the ledger.

use chrono::NaiveDate;

use crate::ledger::Ledger;

/// Whether today's sends already hit the configured maximum.
pub async fn has_reached_cap<L: Ledger + ?Sized>(ledger: &L, date: NaiveDate, max: usize) -> bool {
    ledger.count_for_date(date).await >= max
}

/// How many sends remain before the cap for the given date.
///
/// The send loop truncates its candidate list to this before iterating,
/// so a pass can never overshoot the cap even when the page offers more
/// matches.
pub async fn remaining_quota<L: Ledger + ?Sized>(
    ledger: &L,
    date: NaiveDate,
    max: usize,
) -> usize {
    max.saturating_sub(ledger.count_for_date(date).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::types::record::SentMessage;
    use chrono::Local;

    fn today_records(n: usize) -> Vec<SentMessage> {
        (0..n)
            .map(|i| {
                SentMessage::new(
                    "me@example.com",
                    format!("https://site.example/in/person-{i}"),
                    "hello",
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_cap_boundary() {
        let today = Local::now().date_naive();
        let ledger = MemoryLedger::new().with_records(today_records(9));

        assert!(!has_reached_cap(&ledger, today, 10).await);

        ledger
            .append(&SentMessage::new(
                "me@example.com",
                "https://site.example/in/tenth",
                "hello",
            ))
            .await
            .unwrap();

        assert!(has_reached_cap(&ledger, today, 10).await);
    }

    #[tokio::test]
    async fn test_remaining_quota_saturates() {
        let today = Local::now().date_naive();
        let ledger = MemoryLedger::new().with_records(today_records(12));

        assert_eq!(remaining_quota(&ledger, today, 10).await, 0);
        assert_eq!(remaining_quota(&ledger, today, 20).await, 8);
    }

    #[tokio::test]
    async fn test_empty_ledger_full_quota() {
        let today = Local::now().date_naive();
        let ledger = MemoryLedger::new();

        assert!(!has_reached_cap(&ledger, today, 1).await);
        assert_eq!(remaining_quota(&ledger, today, 10).await, 10);
    }
}
