//! Formatting helpers for the dashboard, kept free of browser APIs.

use chrono::{DateTime, Duration, Utc};
use shared::dto::host::HostDto;
use shared::models::host::{HostStatus, ProfilesStatus};

pub fn status_badge_class(status: HostStatus) -> &'static str {
    match status {
        HostStatus::Ok => "badge badge-ok",
        HostStatus::AtRisk => "badge badge-at-risk",
        HostStatus::Silent => "badge badge-silent",
    }
}

/// Coarse "time since" label for the last heartbeat.
pub fn format_last_seen(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(last_seen);
    if elapsed < Duration::minutes(1) {
        "just now".to_string()
    } else if elapsed < Duration::hours(1) {
        format!("{} min ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{} h ago", elapsed.num_hours())
    } else {
        format!("{} d ago", elapsed.num_days())
    }
}

const DEFAULT_TIMEOUT_MINUTES: i64 = 5;

/// Silence timeout from the backend settings; missing or unrepresentable
/// values use the default.
pub fn silence_timeout(minutes: Option<i64>) -> Duration {
    minutes
        .filter(|m| *m > 0)
        .and_then(Duration::try_minutes)
        .unwrap_or_else(|| Duration::minutes(DEFAULT_TIMEOUT_MINUTES))
}

/// Names of the firewall profiles reported as disabled.
pub fn disabled_profiles(profiles: &ProfilesStatus) -> Vec<&str> {
    profiles
        .iter()
        .filter(|(_, enabled)| !**enabled)
        .map(|(name, _)| name.as_str())
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub ok: usize,
    pub at_risk: usize,
    pub silent: usize,
}

impl StatusCounts {
    pub fn from_hosts(hosts: &[HostDto], now: DateTime<Utc>, timeout: Duration) -> Self {
        hosts.iter().fold(Self::default(), |mut counts, host| {
            match host.status(now, timeout) {
                HostStatus::Ok => counts.ok += 1,
                HostStatus::AtRisk => counts.at_risk += 1,
                HostStatus::Silent => counts.silent += 1,
            }
            counts
        })
    }

    pub fn problems(&self) -> usize {
        self.at_risk + self.silent
    }
}
