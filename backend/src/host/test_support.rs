//! In-memory doubles for the host repository and the alert notifier.

use shared::models::host::Host;
use shared::{Result, SharedError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::alerts::notifier::{AlertNotifier, AlertReport};
use crate::config::AlertConfig;
use crate::host::repository::{AlertedHost, HostRepository, NewHost};
use crate::host::usecase::HostUseCase;
use crate::metrics::Metrics;

#[derive(Default)]
pub struct InMemoryHostRepository {
    hosts: Mutex<Vec<Host>>,
}

impl InMemoryHostRepository {
    pub fn with_hosts(hosts: Vec<Host>) -> Self {
        Self {
            hosts: Mutex::new(hosts),
        }
    }

    pub fn snapshot(&self) -> Vec<Host> {
        self.hosts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HostRepository for InMemoryHostRepository {
    async fn find_by_hostname(&self, hostname: &str) -> Result<Option<Host>> {
        Ok(self.hosts.lock().unwrap().iter().find(|h| h.hostname == hostname).cloned())
    }

    async fn insert(&self, host: NewHost) -> Result<Host> {
        let mut hosts = self.hosts.lock().unwrap();
        let id = hosts.iter().map(|h| h.id).max().unwrap_or(0) + 1;
        let created = Host {
            id,
            hostname: host.hostname,
            ip_address: host.ip_address,
            firewall_status: host.firewall_status,
            profiles_status: host.profiles_status,
            last_seen: host.last_seen,
            is_alerting: false,
        };
        hosts.push(created.clone());
        Ok(created)
    }

    async fn update(&self, host: &Host) -> Result<Host> {
        let mut hosts = self.hosts.lock().unwrap();
        let slot = hosts
            .iter_mut()
            .find(|h| h.id == host.id)
            .ok_or_else(|| SharedError::NotFound(format!("Host {} not found", host.id)))?;
        *slot = host.clone();
        Ok(host.clone())
    }

    async fn list_all(&self) -> Result<Vec<Host>> {
        let mut hosts = self.snapshot();
        hosts.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        Ok(hosts)
    }

    async fn mark_alerting(&self, alerted: &[AlertedHost]) -> Result<usize> {
        let mut marked = 0;
        for host in self.hosts.lock().unwrap().iter_mut() {
            if alerted.contains(&AlertedHost::from(&*host)) {
                host.is_alerting = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Records every report instead of sending it; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<AlertReport>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub fn reports(&self) -> Vec<AlertReport> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AlertNotifier for RecordingNotifier {
    async fn send(&self, report: &AlertReport) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SharedError::Notification("SMTP relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }
}

pub fn alert_config() -> AlertConfig {
    AlertConfig {
        timeout_minutes: 5,
        check_interval_seconds: 60,
        recipient_email: "admin@example.com".to_string(),
        sender_email: "alerts@example.com".to_string(),
    }
}

pub struct Harness {
    pub repo: Arc<InMemoryHostRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub metrics: Arc<Metrics>,
    pub usecase: Arc<HostUseCase>,
}

pub fn harness(repo: InMemoryHostRepository, notifier: RecordingNotifier) -> Harness {
    let repo = Arc::new(repo);
    let notifier = Arc::new(notifier);
    let metrics = Arc::new(Metrics::new().unwrap());
    let usecase = Arc::new(HostUseCase::new(
        repo.clone(),
        notifier.clone(),
        alert_config(),
        metrics.clone(),
    ));
    Harness {
        repo,
        notifier,
        metrics,
        usecase,
    }
}
