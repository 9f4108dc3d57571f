use chrono::{DateTime, Utc};
use shared::dto::host::{HeartbeatPayload, HostDto, SettingsDto};
use shared::models::host::{Host, HostStatus};
use shared::Result;
use std::sync::Arc;
use validator::Validate;

use crate::alerts::notifier::{AlertEntry, AlertNotifier, AlertReport, AlertTrigger};
use crate::config::AlertConfig;
use crate::host::repository::{AlertedHost, HostRepository, NewHost};
use crate::metrics::Metrics;

/// Outcome of one alert check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertOutcome {
    pub alerted_hosts: usize,
    pub sent: bool,
}

impl AlertOutcome {
    fn nothing_to_send() -> Self {
        Self {
            alerted_hosts: 0,
            sent: false,
        }
    }
}

pub struct HostUseCase {
    repo: Arc<dyn HostRepository>,
    notifier: Arc<dyn AlertNotifier>,
    alerts: AlertConfig,
    metrics: Arc<Metrics>,
}

impl HostUseCase {
    pub fn new(
        repo: Arc<dyn HostRepository>,
        notifier: Arc<dyn AlertNotifier>,
        alerts: AlertConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            repo,
            notifier,
            alerts,
            metrics,
        }
    }

    pub async fn record_heartbeat(&self, payload: HeartbeatPayload, now: DateTime<Utc>) -> Result<HostDto> {
        payload.validate()?;

        let host = match self.repo.find_by_hostname(&payload.hostname).await? {
            Some(existing) => {
                let updated = Host {
                    ip_address: payload.ip_address,
                    firewall_status: payload.firewall_status,
                    profiles_status: payload.profiles_status,
                    last_seen: now,
                    // A healthy report re-arms alerting for the next incident
                    is_alerting: existing.is_alerting && !payload.firewall_status,
                    ..existing
                };
                self.repo.update(&updated).await?
            }
            None => {
                log::info!("New host registered: {} ({})", payload.hostname, payload.ip_address);
                self.repo
                    .insert(NewHost {
                        hostname: payload.hostname,
                        ip_address: payload.ip_address,
                        firewall_status: payload.firewall_status,
                        profiles_status: payload.profiles_status,
                        last_seen: now,
                    })
                    .await?
            }
        };

        self.metrics.record_heartbeat(host.firewall_status);
        if !host.firewall_status {
            log::warn!("Host {} reported its firewall as disabled", host.hostname);
        }
        Ok(HostDto::from(&host))
    }

    pub async fn list_hosts(&self) -> Result<Vec<HostDto>> {
        let hosts = self.repo.list_all().await?;
        self.metrics.monitored_hosts.set(hosts.len() as i64);
        Ok(hosts.iter().map(HostDto::from).collect())
    }

    pub fn settings(&self) -> SettingsDto {
        SettingsDto {
            alert_timeout_minutes: self.alerts.timeout_minutes,
            alert_recipient_email: self.alerts.recipient_email.clone(),
        }
    }

    /// Hosts that warrant an alert for the given trigger, with their status.
    ///
    /// Scheduled checks skip hosts that were already alerted; manual triggers
    /// report every problematic host.
    pub fn select_problematic(
        &self,
        hosts: &[Host],
        trigger: AlertTrigger,
        now: DateTime<Utc>,
    ) -> Vec<(AlertedHost, AlertEntry)> {
        let timeout = self.alerts.timeout();
        hosts
            .iter()
            .filter(|host| trigger == AlertTrigger::Manual || !host.is_alerting)
            .filter_map(|host| {
                let status = host.status(now, timeout);
                status.is_problem().then(|| (AlertedHost::from(host), AlertEntry::new(host, status)))
            })
            .collect()
    }

    pub async fn run_alert_check(&self, trigger: AlertTrigger, now: DateTime<Utc>) -> Result<AlertOutcome> {
        let hosts = self.repo.list_all().await?;
        self.metrics.monitored_hosts.set(hosts.len() as i64);

        let selected = self.select_problematic(&hosts, trigger, now);
        if selected.is_empty() {
            log::debug!("Alert check ({}): no problematic hosts", trigger.as_str());
            return Ok(AlertOutcome::nothing_to_send());
        }

        let (alerted, entries): (Vec<AlertedHost>, Vec<AlertEntry>) = selected.into_iter().unzip();
        let at_risk = entries.iter().filter(|e| e.status == HostStatus::AtRisk).count();
        let report = AlertReport::new(entries, trigger);

        match self.notifier.send(&report).await {
            Ok(()) => {
                let marked = self.repo.mark_alerting(&alerted).await?;
                if marked < alerted.len() {
                    log::debug!(
                        "{} host(s) reported while the alert was sent; left unflagged",
                        alerted.len() - marked
                    );
                }
                self.metrics.record_alert(trigger.as_str(), true);
                log::info!(
                    "Alert ({}) sent for {} host(s): {} at risk, {} silent",
                    trigger.as_str(),
                    alerted.len(),
                    at_risk,
                    alerted.len() - at_risk
                );
                Ok(AlertOutcome {
                    alerted_hosts: alerted.len(),
                    sent: true,
                })
            }
            Err(e) => {
                // Hosts stay un-alerted so the next check retries them
                self.metrics.record_alert(trigger.as_str(), false);
                log::error!("Failed to send {} alert: {}", trigger.as_str(), e);
                Ok(AlertOutcome {
                    alerted_hosts: alerted.len(),
                    sent: false,
                })
            }
        }
    }

    pub async fn ping(&self) -> Result<()> {
        self.repo.ping().await
    }
}
