use std::sync::OnceLock;

use dashboard_core::{ClientConfig, ProbeFailure};
use gloo_net::http::Request;
use shared_types::{ComputeRequest, ComputeResponse, SystemInfo};

/// Get the API origin based on current environment
/// - In development (localhost): use http://localhost:8080
/// - In production: use the page's own origin (API serves static files)
fn get_api_origin() -> String {
    let location = web_sys::window().map(|w| w.location());
    let hostname = location
        .as_ref()
        .and_then(|l| l.hostname().ok())
        .unwrap_or_default();

    if is_dev_host(&hostname) {
        "http://localhost:8080".to_string()
    } else {
        location
            .and_then(|l| l.origin().ok())
            .unwrap_or_else(|| "http://localhost".to_string())
    }
}

fn is_dev_host(hostname: &str) -> bool {
    hostname == "localhost" || hostname == "127.0.0.1"
}

/// Lazy-static equivalent for WASM - computed at first use
static API_ORIGIN_CACHE: OnceLock<String> = OnceLock::new();

/// Get the cached API origin
pub fn api_origin() -> &'static str {
    API_ORIGIN_CACHE.get_or_init(get_api_origin).as_str()
}

/// Socket URL matching the page scheme (`https` pages get `wss`)
pub fn socket_url(config: &ClientConfig) -> String {
    config.socket_url(api_origin())
}

/// `POST /api/ml/compute`. A non-2xx reply yields the body verbatim.
pub async fn submit_compute(
    config: &ClientConfig,
    request: &ComputeRequest,
) -> Result<ComputeResponse, String> {
    let url = config.api_url(api_origin(), "compute");

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| format!("Failed to serialize request: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;

    if !response.ok() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP error: {}", response.status()));
        return Err(body);
    }

    response
        .json::<ComputeResponse>()
        .await
        .map_err(|e| format!("Failed to parse JSON: {e}"))
}

/// `GET /api/ml/status`, plain text
pub async fn fetch_status(config: &ClientConfig) -> Result<String, ProbeFailure> {
    let url = config.api_url(api_origin(), "status");

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| ProbeFailure::Request(e.to_string()))?;

    if !response.ok() {
        return Err(ProbeFailure::Status(response.status()));
    }

    response
        .text()
        .await
        .map_err(|e| ProbeFailure::Request(e.to_string()))
}

/// `GET /api/ml/info`
pub async fn fetch_system_info(config: &ClientConfig) -> Result<SystemInfo, ProbeFailure> {
    let url = config.api_url(api_origin(), "info");

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| ProbeFailure::Request(e.to_string()))?;

    if !response.ok() {
        return Err(ProbeFailure::Status(response.status()));
    }

    response
        .json::<SystemInfo>()
        .await
        .map_err(|e| ProbeFailure::Request(format!("Failed to parse JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_loopback_hosts_use_dev_server() {
        assert!(is_dev_host("localhost"));
        assert!(is_dev_host("127.0.0.1"));
        assert!(!is_dev_host("dash.example.com"));
        assert!(!is_dev_host(""));
    }
}
