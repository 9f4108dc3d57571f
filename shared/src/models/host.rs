use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Firewall profile name mapped to whether it is enabled.
pub type ProfilesStatus = BTreeMap<String, bool>;

/// A monitored machine, as last reported by its agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Host {
    pub id: i64,
    pub hostname: String,
    pub ip_address: String,
    /// `true` when the agent reported the firewall as healthy.
    pub firewall_status: bool,
    pub profiles_status: ProfilesStatus,
    pub last_seen: DateTime<Utc>,
    /// Set once an alert went out for the current problem, cleared on recovery.
    pub is_alerting: bool,
}

/// Health of a host as shown on the dashboard and in alert e-mails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HostStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "at_risk")]
    AtRisk,
    #[serde(rename = "silent")]
    Silent,
}

impl HostStatus {
    /// At risk wins over silent: the last thing the agent said was "unsafe".
    pub fn evaluate(
        firewall_status: bool,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
        silence_timeout: Duration,
    ) -> Self {
        if !firewall_status {
            HostStatus::AtRisk
        } else if now - last_seen > silence_timeout {
            HostStatus::Silent
        } else {
            HostStatus::Ok
        }
    }

    pub fn is_problem(&self) -> bool {
        !matches!(self, HostStatus::Ok)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HostStatus::Ok => "OK",
            HostStatus::AtRisk => "AT RISK",
            HostStatus::Silent => "SILENT",
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Host {
    pub fn status(&self, now: DateTime<Utc>, silence_timeout: Duration) -> HostStatus {
        HostStatus::evaluate(self.firewall_status, self.last_seen, now, silence_timeout)
    }
}
