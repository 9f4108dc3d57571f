use gloo_net::http::Request;
use gloo_storage::{LocalStorage, Storage};

/// Local storage key holding the operator's API key.
pub const API_KEY_STORAGE_KEY: &str = "firewallwatch_api_key";

/// Header the backend checks on write endpoints.
pub const API_KEY_HEADER: &str = "X-API-KEY";

pub fn stored_api_key() -> Option<String> {
    LocalStorage::get::<String>(API_KEY_STORAGE_KEY)
        .ok()
        .filter(|key| !key.is_empty())
}

pub fn store_api_key(key: &str) {
    if key.is_empty() {
        LocalStorage::delete(API_KEY_STORAGE_KEY);
    } else if let Err(e) = LocalStorage::set(API_KEY_STORAGE_KEY, key) {
        log::error!("Failed to store API key: {}", e);
    }
}

/// Creates a request carrying the stored API key, if any
pub fn keyed_request(method: &str, url: &str) -> gloo_net::http::RequestBuilder {
    let req = match method.to_uppercase().as_str() {
        "POST" => Request::post(url),
        _ => Request::get(url),
    };

    match stored_api_key() {
        Some(key) => req.header(API_KEY_HEADER, &key),
        None => req,
    }
}

/// Creates a POST request with the API key
pub fn keyed_post(url: &str) -> gloo_net::http::RequestBuilder {
    keyed_request("POST", url)
}

/// Turns a non-2xx response into a readable message.
pub async fn error_message(response: gloo_net::http::Response) -> String {
    let status = response.status();
    match response.json::<serde_json::Value>().await {
        Ok(body) => body
            .get("message")
            .or_else(|| body.get("detail"))
            .and_then(|m| m.as_str())
            .map(|m| format!("HTTP {}: {}", status, m))
            .unwrap_or_else(|| format!("HTTP {}", status)),
        Err(_) => format!("HTTP {}", status),
    }
}
