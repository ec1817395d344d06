//! Backend abstraction for reaching the ccentral service registry.
//!
//! This module provides a trait-based abstraction over where service data
//! comes from: the ccentral daemon over HTTP, or a local JSON file for
//! offline use and demos.

mod api;
mod error;
mod file;
mod http;

pub use api::{ConfigItem, InstanceRecord, SchemaItem, ServiceDescriptor, ServiceList};
pub use error::ApiError;
pub use file::{FileBackend, ServiceStore};
pub use http::{HttpBackend, HttpBackendBuilder, DEFAULT_ENDPOINT};

use std::fmt::Debug;

use async_trait::async_trait;

/// Trait for reading and updating service configuration.
///
/// Implementations map onto the three REST calls the dashboard needs plus a
/// liveness check. All methods are async and may be called concurrently
/// from background tasks.
///
/// # Example
///
/// ```
/// use ccentral_tui::{Backend, FileBackend};
///
/// # tokio_test::block_on(async {
/// let backend = FileBackend::mock();
/// let services = backend.list_services().await.unwrap();
/// assert_eq!(services, vec!["example".to_string()]);
/// # });
/// ```
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// List registered service names (`GET /api/1/services`).
    async fn list_services(&self) -> Result<Vec<String>, ApiError>;

    /// Fetch schema, configuration and instances of one service
    /// (`GET /api/1/services/{service}`).
    async fn fetch_service(&self, service: &str) -> Result<ServiceDescriptor, ApiError>;

    /// Store a new raw value for a configuration key
    /// (`PUT /api/1/services/{service}/keys/{key}`).
    async fn save_key(&self, service: &str, key: &str, value: &str) -> Result<(), ApiError>;

    /// Check that the backend is reachable.
    async fn check(&self) -> Result<(), ApiError>;

    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
