//! HTTP backend talking to the ccentral daemon.
//!
//! ## Endpoints
//!
//! - `GET /api/1/services` - registered service names
//! - `GET /api/1/services/{service}` - schema, config, clients and info
//! - `PUT /api/1/services/{service}/keys/{key}` - raw value as request body
//! - `GET /check` - liveness check
//!
//! ## Example
//!
//! ```rust,no_run
//! use ccentral_tui::{Backend, HttpBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::builder()
//!         .endpoint("http://localhost:3000")
//!         .build()?;
//!
//!     for service in backend.list_services().await? {
//!         let descriptor = backend.fetch_service(&service).await?;
//!         println!("{}: {} instances", service, descriptor.clients.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use urlencoding::encode;

use super::api::{ErrorBody, ServiceDescriptor, ServiceList};
use super::{ApiError, Backend};

/// Default daemon address (the daemon listens on port 3000 by default).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";

/// Backend reaching the ccentral REST API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpBackend {
    /// Create a new builder for configuring the backend.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::default()
    }

    /// Returns the base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn services_url(&self) -> String {
        format!("{}/api/1/services", self.endpoint)
    }

    fn service_url(&self, service: &str) -> String {
        format!("{}/api/1/services/{}", self.endpoint, encode(service))
    }

    fn key_url(&self, service: &str, key: &str) -> String {
        format!(
            "{}/api/1/services/{}/keys/{}",
            self.endpoint,
            encode(service),
            encode(key)
        )
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_services(&self) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(self.services_url()).send().await?;
        let list: ServiceList = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(list.services)
    }

    async fn fetch_service(&self, service: &str) -> Result<ServiceDescriptor, ApiError> {
        let response = self.client.get(self.service_url(service)).send().await?;
        let descriptor = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(descriptor)
    }

    async fn save_key(&self, service: &str, key: &str, value: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.key_url(service, key))
            .body(value.to_string())
            .send()
            .await?;
        // The acknowledgment body carries nothing the dashboard uses
        check_status(response).await?;
        Ok(())
    }

    async fn check(&self) -> Result<(), ApiError> {
        let response = self.client.get(format!("{}/check", self.endpoint)).send().await?;
        check_status(response).await?;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpBackend.
#[derive(Debug, Default)]
pub struct HttpBackendBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendBuilder {
    /// Set the daemon base URL (e.g., "http://localhost:3000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the backend.
    pub fn build(self) -> Result<HttpBackend, ApiError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpBackend {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}

/// Turn non-success responses into [`ApiError::Status`], preferring the
/// daemon's `{"error": "..."}` message over the raw body.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
