use crate::api::api_url;
use crate::api::utils::error_message;
use gloo_net::http::Request;
use serde::{Deserialize, Serialize};

/// Build information reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendVersion {
    pub version: String,
    pub name: String,
    pub build_date: Option<String>,
    pub git_commit: Option<String>,
    pub environment: String,
}

pub async fn fetch_backend_version() -> Result<BackendVersion, String> {
    let response = Request::get(&api_url("/api/version"))
        .send()
        .await
        .map_err(|e| format!("Failed to fetch version info: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }

    response
        .json::<BackendVersion>()
        .await
        .map_err(|e| format!("Failed to parse version info: {}", e))
}
