//! File-based backend.
//!
//! Serves services from a local JSON document instead of a live daemon.
//! Useful for demos, offline inspection of captured state, and tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{ApiError, Backend, ConfigItem, SchemaItem, ServiceDescriptor};
use crate::data::unix_now;

/// On-disk layout: `{"services": {"name": <service descriptor>}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStore {
    #[serde(default)]
    pub services: BTreeMap<String, ServiceDescriptor>,
}

/// A backend that serves service descriptors from memory.
///
/// The store is loaded once. Saves update the in-memory copy the same way
/// the daemon updates etcd (value plus version bump) so that edits show up
/// on the next refresh; the file on disk is never rewritten.
#[derive(Debug)]
pub struct FileBackend {
    store: RwLock<ServiceStore>,
    description: String,
}

impl FileBackend {
    /// Load a service store from the given JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let store: ServiceStore = serde_json::from_str(&content)?;
        Ok(Self::with_description(store, format!("file: {}", path.display())))
    }

    /// Create a backend serving the given store.
    pub fn from_store(store: ServiceStore) -> Self {
        Self::with_description(store, "memory".to_string())
    }

    /// The daemon's mock data set: one `example` service with a single
    /// string field.
    pub fn mock() -> Self {
        let mut service = ServiceDescriptor::default();
        service.schema.insert(
            "example".to_string(),
            SchemaItem::new(
                "default",
                "string",
                "Configuration (String)",
                "Description for this configuration",
            ),
        );
        service
            .config
            .insert("example".to_string(), ConfigItem::new("Current value", 0));

        let mut store = ServiceStore::default();
        store.services.insert("example".to_string(), service);
        Self::with_description(store, "mock".to_string())
    }

    fn with_description(store: ServiceStore, description: String) -> Self {
        Self {
            store: RwLock::new(store),
            description,
        }
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn list_services(&self) -> Result<Vec<String>, ApiError> {
        Ok(self.store.read().await.services.keys().cloned().collect())
    }

    async fn fetch_service(&self, service: &str) -> Result<ServiceDescriptor, ApiError> {
        self.store
            .read()
            .await
            .services
            .get(service)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(service.to_string()))
    }

    async fn save_key(&self, service: &str, key: &str, value: &str) -> Result<(), ApiError> {
        let mut store = self.store.write().await;
        let descriptor = store
            .services
            .get_mut(service)
            .ok_or_else(|| ApiError::NotFound(service.to_string()))?;

        let now = unix_now() as i64;
        descriptor
            .config
            .insert(key.to_string(), ConfigItem::new(value, now));
        increment_version(&mut descriptor.config, now);
        Ok(())
    }

    async fn check(&self) -> Result<(), ApiError> {
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Bump the `v` config entry. A missing or non-numeric version counts as 1.
fn increment_version(config: &mut BTreeMap<String, ConfigItem>, now: i64) -> String {
    let current = config
        .get("v")
        .and_then(|v| v.value.parse::<i64>().ok())
        .unwrap_or(1);
    let next = (current + 1).to_string();
    config.insert("v".to_string(), ConfigItem::new(next.clone(), now));
    next
}
