use actix_web::{http::StatusCode, test, web, App};
use chrono::{Duration, Utc};
use serde_json::json;
use shared::dto::host::{AlertTriggerResponse, HostDto, SettingsDto};
use shared::models::host::Host;

use crate::auth::API_KEY_HEADER;
use crate::host::controller::configure_routes;
use crate::host::test_support::{harness, Harness, InMemoryHostRepository, RecordingNotifier};

const KEY: &str = "agent-key";

fn heartbeat_body(hostname: &str, firewall_status: bool) -> serde_json::Value {
    json!({
        "hostname": hostname,
        "ip_address": "10.1.2.3",
        "firewall_status": firewall_status,
        "profiles_status": {"Domain": true, "Private": true, "Public": firewall_status}
    })
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($h.usecase.clone()))
                .configure(|cfg| configure_routes(cfg, KEY)),
        )
        .await
    };
}

fn silent_host() -> Host {
    Host {
        id: 1,
        hostname: "ws-silent".to_string(),
        ip_address: "10.0.0.9".to_string(),
        firewall_status: true,
        profiles_status: Default::default(),
        last_seen: Utc::now() - Duration::hours(1),
        is_alerting: false,
    }
}

#[actix_web::test]
async fn test_heartbeat_with_key_is_recorded() {
    let h: Harness = harness(InMemoryHostRepository::default(), RecordingNotifier::default());
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/heartbeat")
        .insert_header((API_KEY_HEADER, KEY))
        .set_json(heartbeat_body("ws-01", true))
        .to_request();
    let host: HostDto = test::call_and_read_body_json(&app, req).await;

    assert_eq!(host.hostname, "ws-01");
    assert_eq!(host.profiles_status.len(), 3);
    assert_eq!(h.repo.snapshot().len(), 1);
}

#[actix_web::test]
async fn test_heartbeat_without_key_is_forbidden() {
    let h = harness(InMemoryHostRepository::default(), RecordingNotifier::default());
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/heartbeat")
        .set_json(heartbeat_body("ws-01", true))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();

    assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
    assert!(h.repo.snapshot().is_empty());
}

#[actix_web::test]
async fn test_heartbeat_validation_error() {
    let h = harness(InMemoryHostRepository::default(), RecordingNotifier::default());
    let app = app!(h);

    let mut body = heartbeat_body("ws-01", true);
    body["ip_address"] = json!("300.1.1.1");
    let req = test::TestRequest::post()
        .uri("/api/heartbeat")
        .insert_header((API_KEY_HEADER, KEY))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_list_hosts_is_public() {
    let repo = InMemoryHostRepository::with_hosts(vec![silent_host()]);
    let h = harness(repo, RecordingNotifier::default());
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/hosts").to_request();
    let hosts: Vec<HostDto> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].hostname, "ws-silent");
}

#[actix_web::test]
async fn test_settings_endpoint() {
    let h = harness(InMemoryHostRepository::default(), RecordingNotifier::default());
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/settings").to_request();
    let settings: SettingsDto = test::call_and_read_body_json(&app, req).await;

    assert_eq!(settings.alert_timeout_minutes, 5);
    assert_eq!(settings.alert_recipient_email, "admin@example.com");
}

#[actix_web::test]
async fn test_manual_trigger_sends_alert() {
    let repo = InMemoryHostRepository::with_hosts(vec![silent_host()]);
    let h = harness(repo, RecordingNotifier::default());
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/alerts/trigger")
        .insert_header((API_KEY_HEADER, KEY))
        .to_request();
    let response: AlertTriggerResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(response.alerted_hosts, 1);
    assert!(response.sent);
    assert_eq!(h.notifier.reports().len(), 1);
}

#[actix_web::test]
async fn test_manual_trigger_requires_key() {
    let h = harness(InMemoryHostRepository::default(), RecordingNotifier::default());
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/alerts/trigger")
        .insert_header((API_KEY_HEADER, "wrong"))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();

    assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);
}
