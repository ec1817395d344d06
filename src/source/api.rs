//! Wire types for the ccentral REST API.
//!
//! These types match the JSON produced by the ccentral daemon. They are the
//! common data format between the backend and the view model builder.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw telemetry reported by one client instance.
///
/// Keys are namespaced by prefix (`c_` counters, `k_` info values) plus the
/// reserved `ts`, `v` and `started` keys. Values are kept as raw JSON and
/// classified later by [`crate::data::KeyKind`].
pub type InstanceRecord = BTreeMap<String, serde_json::Value>;

/// Response of `GET /api/1/services`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceList {
    #[serde(default)]
    pub services: Vec<String>,
}

/// A single configurable field declared by a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl SchemaItem {
    pub fn new(default: &str, kind: &str, title: &str, description: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            kind: Some(kind.to_string()),
            description: Some(description.to_string()),
            default: Some(default.to_string()),
        }
    }
}

/// The current value of a configuration key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub value: String,
    /// Epoch seconds of the last change.
    #[serde(default)]
    pub changed: i64,
}

impl ConfigItem {
    pub fn new(value: impl Into<String>, changed: i64) -> Self {
        Self {
            value: value.into(),
            changed,
        }
    }
}

/// Response of `GET /api/1/services/{service}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Shared service information reported by the clients. Opaque to the
    /// dashboard apart from being displayed.
    #[serde(default)]
    pub info: serde_json::Value,
    #[serde(default)]
    pub schema: BTreeMap<String, SchemaItem>,
    #[serde(default)]
    pub config: BTreeMap<String, ConfigItem>,
    /// Connected instances keyed by instance id.
    #[serde(default)]
    pub clients: BTreeMap<String, InstanceRecord>,
}

/// Error body returned by the daemon on failures: `{"error": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_service() {
        let json = r#"{
            "info": {"owner": "ops"},
            "schema": {
                "timeout": {
                    "default": "30",
                    "type": "integer",
                    "title": "Timeout",
                    "description": "Request timeout in seconds"
                }
            },
            "config": {
                "timeout": {"value": "45", "changed": 1500000000},
                "v": {"value": "7", "changed": 1500000000}
            },
            "clients": {
                "host-1": {"v": "7", "ts": 1500000100.5, "c_hits": ["1", "4"], "k_region": "eu"}
            }
        }"#;

        let service: ServiceDescriptor = serde_json::from_str(json).unwrap();

        let timeout = service.schema.get("timeout").unwrap();
        assert_eq!(timeout.kind.as_deref(), Some("integer"));
        assert_eq!(timeout.default.as_deref(), Some("30"));

        assert_eq!(service.config.get("timeout").unwrap().value, "45");
        assert_eq!(service.config.get("v").unwrap().value, "7");

        let client = service.clients.get("host-1").unwrap();
        assert_eq!(client.get("k_region").unwrap(), "eu");
        assert!(client.get("c_hits").unwrap().is_array());
        assert_eq!(service.info["owner"], "ops");
    }

    #[test]
    fn test_deserialize_sparse_service() {
        // New services may have a schema but no config or clients yet
        let service: ServiceDescriptor =
            serde_json::from_str(r#"{"schema": {"a": {"default": "x"}}}"#).unwrap();
        assert!(service.config.is_empty());
        assert!(service.clients.is_empty());
        assert!(service.info.is_null());
        assert!(service.schema.get("a").unwrap().title.is_none());
    }

    #[test]
    fn test_config_item_without_changed() {
        let item: ConfigItem = serde_json::from_str(r#"{"value": "on"}"#).unwrap();
        assert_eq!(item, ConfigItem::new("on", 0));
    }

    #[test]
    fn test_service_list() {
        let list: ServiceList = serde_json::from_str(r#"{"services": ["a", "b"]}"#).unwrap();
        assert_eq!(list.services, vec!["a", "b"]);
    }
}
