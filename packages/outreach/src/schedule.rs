//! Daily wall-clock trigger for outreach passes.
//!
//! Built on `tokio-cron-scheduler`. The scheduler only fires the job; the
//! job itself goes through the engine's pass mutex, so a firing that
//! overlaps a manually triggered pass queues instead of racing it.

use std::future::Future;

use chrono::{DateTime, Local};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use uuid::Uuid;

use crate::error::ScheduleError;

/// A daily HH:MM firing time, local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTime {
    hour: u8,
    minute: u8,
}

impl DailyTime {
    /// Create a firing time, validating the wall-clock range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTime { hour, minute });
        }
        Ok(Self { hour, minute })
    }

    /// Six-field cron expression for this time, every day.
    fn cron(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }
}

impl std::fmt::Display for DailyTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Observable scheduler state.
///
/// Always passed in and out explicitly; scheduling state never lives in
/// process-wide fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerState {
    /// Whether future firings will happen
    pub enabled: bool,

    /// Next firing time, when enabled
    pub next_fire_time: Option<DateTime<Local>>,
}

/// Fires one job daily at a fixed local time.
pub struct DailyScheduler {
    inner: JobScheduler,
    job_id: Uuid,
    time: DailyTime,
    enabled: bool,
}

impl DailyScheduler {
    /// Start firing `job` daily at `time`.
    ///
    /// The job factory is invoked at every firing; overlap protection is
    /// the job's concern (the pass engine serializes itself).
    pub async fn start<F, Fut>(time: DailyTime, job: F) -> Result<Self, ScheduleError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let scheduler = JobScheduler::new().await?;

        let cron = time.cron();
        let daily_job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
            let job = job.clone();
            Box::pin(async move {
                job().await;
            })
        })?;

        let job_id = scheduler.add(daily_job).await?;
        scheduler.start().await?;

        info!(time = %time, "Daily outreach schedule started");
        Ok(Self {
            inner: scheduler,
            job_id,
            time,
            enabled: true,
        })
    }

    /// The configured firing time.
    pub fn time(&self) -> DailyTime {
        self.time
    }

    /// Current state: enabled flag and next firing time.
    pub async fn state(&self) -> SchedulerState {
        if !self.enabled {
            return SchedulerState {
                enabled: false,
                next_fire_time: None,
            };
        }

        let next_fire_time = self
            .inner
            .clone()
            .next_tick_for_job(self.job_id)
            .await
            .ok()
            .flatten()
            .map(|utc| utc.with_timezone(&Local));

        SchedulerState {
            enabled: true,
            next_fire_time,
        }
    }

    /// Stop future firings.
    ///
    /// An in-flight pass is unaffected; only upcoming firings are
    /// cancelled.
    pub async fn shutdown(&mut self) -> Result<(), ScheduleError> {
        self.inner.shutdown().await?;
        self.enabled = false;
        info!(time = %self.time, "Daily outreach schedule stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_daily_time_validation() {
        assert!(DailyTime::new(9, 0).is_ok());
        assert!(DailyTime::new(23, 59).is_ok());
        assert!(DailyTime::new(24, 0).is_err());
        assert!(DailyTime::new(9, 60).is_err());
    }

    #[test]
    fn test_cron_expression() {
        let time = DailyTime::new(9, 30).unwrap();
        assert_eq!(time.cron(), "0 30 9 * * *");
        assert_eq!(time.to_string(), "09:30");
    }

    #[tokio::test]
    async fn test_scheduler_reports_future_fire_time() {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();

        let scheduler = DailyScheduler::start(DailyTime::new(12, 0).unwrap(), move || {
            let fired = fired_clone.clone();
            async move {
                fired.fetch_add(1, Ordering::SeqCst);
            }
        })
        .await
        .unwrap();

        let state = scheduler.state().await;
        assert!(state.enabled);
        if let Some(next) = state.next_fire_time {
            assert!(next > Local::now());
        }
    }

    #[tokio::test]
    async fn test_shutdown_disables_future_firings() {
        let mut scheduler = DailyScheduler::start(DailyTime::new(12, 0).unwrap(), || async {})
            .await
            .unwrap();

        scheduler.shutdown().await.unwrap();

        let state = scheduler.state().await;
        assert!(!state.enabled);
        assert!(state.next_fire_time.is_none());
    }
}
