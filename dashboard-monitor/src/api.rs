use std::time::Duration;

use dashboard_core::{ClientConfig, ProbeFailure};
use shared_types::{ComputeRequest, ComputeResponse, SystemInfo};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-2xx reply; displays the response body as the server sent it
    #[error("{body}")]
    Status { status: u16, body: String },
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    origin: String,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(origin: impl Into<String>, config: ClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            origin: origin.into(),
            config,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        self.config.api_url(&self.origin, endpoint)
    }

    pub async fn submit_compute(&self, request: &ComputeRequest) -> Result<ComputeResponse, ApiError> {
        let response = self
            .client
            .post(self.url("compute"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP error: {}", status.as_u16()));
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<ComputeResponse>().await?)
    }

    pub async fn fetch_status(&self) -> Result<String, ProbeFailure> {
        let response = self
            .client
            .get(self.url("status"))
            .send()
            .await
            .map_err(|e| ProbeFailure::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProbeFailure::Status(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ProbeFailure::Request(e.to_string()))
    }

    pub async fn fetch_system_info(&self) -> Result<SystemInfo, ProbeFailure> {
        let response = self
            .client
            .get(self.url("info"))
            .send()
            .await
            .map_err(|e| ProbeFailure::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProbeFailure::Status(response.status().as_u16()));
        }

        response
            .json::<SystemInfo>()
            .await
            .map_err(|e| ProbeFailure::Request(format!("Failed to parse JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_body_verbatim() {
        let err = ApiError::Status {
            status: 400,
            body: "Invalid input data".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid input data");
    }

    #[test]
    fn endpoints_hang_off_api_prefix() {
        let api = ApiClient::new("http://127.0.0.1:8080/", ClientConfig::default()).unwrap();
        assert_eq!(api.url("compute"), "http://127.0.0.1:8080/api/ml/compute");
    }
}
