pub mod models {
    pub mod host;
}

pub mod dto {
    pub mod host;
}

pub mod base_url;
pub mod error;

// Re-export commonly used items
pub use error::{SharedError, Result};

pub use base_url::{
    bootstrap, resolve, BaseUrlPolicy, BaseUrlSlot, FallbackDiagnostic, PageLocation,
    Resolution, ResolutionSource, ResolvedBaseUrl, ResolverInputs, RuntimeConfig,
};

pub use models::host::{Host, HostStatus, ProfilesStatus};

pub use dto::host::{AlertTriggerResponse, HeartbeatPayload, HostDto, SettingsDto};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use test_case::test_case;
    use validator::Validate;

    fn host(firewall_status: bool, minutes_ago: i64) -> Host {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Host {
            id: 1,
            hostname: "ws-finance-01".to_string(),
            ip_address: "10.0.4.21".to_string(),
            firewall_status,
            profiles_status: [("Domain".to_string(), true), ("Public".to_string(), firewall_status)]
                .into_iter()
                .collect(),
            last_seen: now - Duration::minutes(minutes_ago),
            is_alerting: false,
        }
    }

    #[test_case(true, 1, HostStatus::Ok ; "fresh and healthy")]
    #[test_case(true, 5, HostStatus::Ok ; "exactly at the timeout")]
    #[test_case(true, 6, HostStatus::Silent ; "past the timeout")]
    #[test_case(false, 1, HostStatus::AtRisk ; "reported risk")]
    #[test_case(false, 30, HostStatus::AtRisk ; "risk wins over silence")]
    fn test_host_status(firewall_status: bool, minutes_ago: i64, expected: HostStatus) {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let host = host(firewall_status, minutes_ago);
        assert_eq!(host.status(now, Duration::minutes(5)), expected);
        assert_eq!(expected.is_problem(), expected != HostStatus::Ok);
    }

    #[test]
    fn test_host_dto_from_host() {
        let host = host(true, 0);
        let dto = HostDto::from(&host);

        assert_eq!(dto.hostname, host.hostname);
        assert_eq!(dto.profiles_status, host.profiles_status);
        assert_eq!(dto.last_seen, host.last_seen);
    }

    #[test]
    fn test_heartbeat_payload_validation() {
        let payload: HeartbeatPayload = serde_json::from_str(
            r#"{"hostname":"ws-01","ip_address":"192.168.1.10","firewall_status":true,"profiles_status":{"Domain":true}}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());

        let bad_ip = HeartbeatPayload {
            ip_address: "not-an-ip".to_string(),
            ..payload.clone()
        };
        let errors = bad_ip.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("ip_address"));

        let ipv6 = HeartbeatPayload {
            ip_address: "fe80::1".to_string(),
            ..payload.clone()
        };
        assert!(ipv6.validate().is_ok());

        let no_name = HeartbeatPayload {
            hostname: String::new(),
            ..payload
        };
        let err: SharedError = no_name.validate().unwrap_err().into();
        assert!(matches!(err, SharedError::Validation(_)));
    }

    #[test_case("10.0.0.1", true ; "ipv4")]
    #[test_case("::1", true ; "ipv6 loopback")]
    #[test_case("2001:db8::8a2e:370:7334", true ; "ipv6")]
    #[test_case("256.0.0.1", false ; "octet out of range")]
    #[test_case("10.0.0", false ; "truncated")]
    #[test_case("ws-01.lan", false ; "hostname")]
    #[test_case("", false ; "empty")]
    fn test_validate_ip_address(value: &str, valid: bool) {
        assert_eq!(dto::host::validate_ip_address(value).is_ok(), valid);
    }

    #[test]
    fn test_heartbeat_requires_profiles() {
        let result = serde_json::from_str::<HeartbeatPayload>(
            r#"{"hostname":"ws-01","ip_address":"::1","firewall_status":false}"#,
        );
        assert!(result.is_err());

        let payload: HeartbeatPayload = serde_json::from_str(
            r#"{"hostname":"ws-01","ip_address":"::1","firewall_status":false,"profiles_status":{}}"#,
        )
        .unwrap();
        assert!(payload.profiles_status.is_empty());
    }

    #[test]
    fn test_host_status_serialization() {
        assert_eq!(serde_json::to_string(&HostStatus::AtRisk).unwrap(), "\"at_risk\"");
        assert_eq!(HostStatus::Silent.to_string(), "SILENT");
    }
}
