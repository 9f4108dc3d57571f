use crate::api::api_url;
use crate::api::utils::{error_message, keyed_post};
use gloo_net::http::Request;
use shared::dto::host::{AlertTriggerResponse, HostDto, SettingsDto};

pub async fn fetch_hosts() -> Result<Vec<HostDto>, String> {
    let response = Request::get(&api_url("/api/hosts"))
        .send()
        .await
        .map_err(|e| format!("Failed to fetch hosts: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json::<Vec<HostDto>>()
        .await
        .map_err(|e| format!("Failed to parse hosts: {}", e))
}

pub async fn fetch_settings() -> Result<SettingsDto, String> {
    let response = Request::get(&api_url("/api/settings"))
        .send()
        .await
        .map_err(|e| format!("Failed to fetch settings: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json::<SettingsDto>()
        .await
        .map_err(|e| format!("Failed to parse settings: {}", e))
}

/// Ask the backend to e-mail an alert for every problematic host now.
pub async fn trigger_alert() -> Result<AlertTriggerResponse, String> {
    let response = keyed_post(&api_url("/api/alerts/trigger"))
        .send()
        .await
        .map_err(|e| format!("Failed to trigger alert: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json::<AlertTriggerResponse>()
        .await
        .map_err(|e| format!("Failed to parse alert response: {}", e))
}
