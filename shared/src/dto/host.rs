use crate::models::host::{Host, HostStatus, ProfilesStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::net::IpAddr;
use validator::{Validate, ValidationError};

/// Accepts IPv4 and IPv6 literals only.
pub fn validate_ip_address(value: &str) -> Result<(), ValidationError> {
    if value.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    let mut error = ValidationError::new("ip");
    error.message = Some(Cow::from("IP address must be a valid IPv4 or IPv6 address"));
    Err(error)
}

/// Report an agent sends on every check.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct HeartbeatPayload {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Hostname is required and must be at most 255 characters"
    ))]
    pub hostname: String,
    #[validate(custom = "validate_ip_address")]
    pub ip_address: String,
    pub firewall_status: bool,
    pub profiles_status: ProfilesStatus,
}

/// Data Transfer Object for Host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostDto {
    pub id: i64,
    pub hostname: String,
    pub ip_address: String,
    pub firewall_status: bool,
    pub profiles_status: ProfilesStatus,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub is_alerting: bool,
}

impl HostDto {
    pub fn status(&self, now: DateTime<Utc>, silence_timeout: chrono::Duration) -> HostStatus {
        HostStatus::evaluate(self.firewall_status, self.last_seen, now, silence_timeout)
    }
}

impl From<&Host> for HostDto {
    fn from(host: &Host) -> Self {
        Self {
            id: host.id,
            hostname: host.hostname.clone(),
            ip_address: host.ip_address.clone(),
            firewall_status: host.firewall_status,
            profiles_status: host.profiles_status.clone(),
            last_seen: host.last_seen,
            is_alerting: host.is_alerting,
        }
    }
}

/// Alerting settings exposed to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsDto {
    pub alert_timeout_minutes: i64,
    pub alert_recipient_email: String,
}

/// Result of a manual alert trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertTriggerResponse {
    pub alerted_hosts: usize,
    pub sent: bool,
}
