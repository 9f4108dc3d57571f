use chrono::{DateTime, Utc};
use log::{error, info, warn};
use shared::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use super::notifier::AlertTrigger;
use crate::host::usecase::{AlertOutcome, HostUseCase};
use crate::metrics::Metrics;

#[derive(Debug, Clone, Default)]
struct LastRun {
    finished_at: Option<DateTime<Utc>>,
    alerted_hosts: Option<usize>,
    error: Option<String>,
}

/// Background task that periodically alerts on silent or at-risk hosts.
#[derive(Clone)]
pub struct AlertScheduler {
    usecase: Arc<HostUseCase>,
    metrics: Arc<Metrics>,
    interval: Duration,
    last_run: Arc<Mutex<LastRun>>,
    running: Arc<AtomicBool>,
}

impl AlertScheduler {
    pub fn new(usecase: Arc<HostUseCase>, metrics: Arc<Metrics>, interval: Duration) -> Self {
        Self {
            usecase,
            metrics,
            interval,
            last_run: Arc::new(Mutex::new(LastRun::default())),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the background loop; a second call is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Alert scheduler is already running");
            return;
        }

        info!("Starting alert scheduler (every {:?})", self.interval);
        let scheduler = self.clone();
        tokio::spawn(async move {
            scheduler.run_loop().await;
        });
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Stopping alert scheduler...");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run_loop(&self) {
        // First check happens one interval after startup
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !self.is_running() {
                break;
            }
            // Errors are recorded in the status; the loop keeps going
            let _ = self.run_once().await;
        }
        info!("Alert scheduler loop stopped");
    }

    /// Run a single scheduled check immediately.
    pub async fn run_once(&self) -> Result<AlertOutcome> {
        let result = self
            .usecase
            .run_alert_check(AlertTrigger::Scheduled, Utc::now())
            .await;

        let mut last_run = self.last_run.lock().unwrap_or_else(|e| e.into_inner());
        last_run.finished_at = Some(Utc::now());
        match &result {
            Ok(outcome) => {
                self.metrics.record_scheduler_run("success");
                last_run.alerted_hosts = Some(outcome.alerted_hosts);
                last_run.error = None;
            }
            Err(e) => {
                self.metrics.record_scheduler_run("error");
                error!("Scheduled alert check failed: {}", e);
                last_run.error = Some(e.to_string());
            }
        }
        result
    }

    pub fn status(&self) -> SchedulerStatus {
        let last_run = self.last_run.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let interval = chrono::Duration::from_std(self.interval).ok();
        SchedulerStatus {
            is_running: self.is_running(),
            interval_seconds: self.interval.as_secs(),
            last_run: last_run.finished_at,
            last_alerted_hosts: last_run.alerted_hosts,
            last_error: last_run.error,
            next_run: match (self.is_running(), last_run.finished_at, interval) {
                (true, Some(finished), Some(step)) => Some(finished + step),
                _ => None,
            },
        }
    }
}

/// Status information for the alert scheduler
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub interval_seconds: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_alerted_hosts: Option<usize>,
    pub last_error: Option<String>,
    pub next_run: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::{harness, InMemoryHostRepository, RecordingNotifier};
    use chrono::Duration as ChronoDuration;
    use shared::models::host::Host;

    fn at_risk_host() -> Host {
        Host {
            id: 1,
            hostname: "ws-risk".to_string(),
            ip_address: "10.0.0.1".to_string(),
            firewall_status: false,
            profiles_status: Default::default(),
            last_seen: Utc::now() - ChronoDuration::minutes(1),
            is_alerting: false,
        }
    }

    fn scheduler(notifier: RecordingNotifier) -> (AlertScheduler, Arc<RecordingNotifier>) {
        let h = harness(InMemoryHostRepository::with_hosts(vec![at_risk_host()]), notifier);
        (
            AlertScheduler::new(h.usecase, h.metrics, Duration::from_secs(60)),
            h.notifier,
        )
    }

    #[tokio::test]
    async fn test_run_once_records_status() {
        let (scheduler, notifier) = scheduler(RecordingNotifier::default());

        let outcome = scheduler.run_once().await.unwrap();
        assert_eq!(outcome.alerted_hosts, 1);
        assert_eq!(notifier.reports().len(), 1);

        let status = scheduler.status();
        assert!(!status.is_running);
        assert_eq!(status.interval_seconds, 60);
        assert_eq!(status.last_alerted_hosts, Some(1));
        assert!(status.last_run.is_some());
        assert!(status.last_error.is_none());
        assert!(status.next_run.is_none());
        assert_eq!(scheduler.metrics.scheduler_runs.with_label_values(&["success"]).get(), 1);
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stoppable() {
        let (scheduler, _) = scheduler(RecordingNotifier::default());

        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_runs_after_first_interval() {
        let (scheduler, notifier) = scheduler(RecordingNotifier::default());
        scheduler.start();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(notifier.reports().is_empty());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(notifier.reports().len(), 1);
        assert!(scheduler.status().next_run.is_some());

        scheduler.stop();
    }
}
