//! Field merging and edit tracking.
//!
//! Schema defaults and live configuration values are combined into one
//! [`FieldDefinition`] per key. Once a backend value has been applied to a
//! field, later refreshes leave it alone so that an edit in progress is not
//! clobbered; only a save confirmation moves `value_orig` forward again.

use std::collections::BTreeMap;

use serde::Serialize;

use super::value::VERSION_KEY;
use crate::source::{ConfigItem, SchemaItem};

/// One configurable field of a service, with edit tracking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub default: Option<String>,
    /// Live value, including unsaved edits.
    pub value: Option<String>,
    /// Last value received from the backend or confirmed saved.
    pub value_orig: Option<String>,
    /// A backend configuration value has already been applied.
    pub config_set: bool,
}

impl FieldDefinition {
    /// A field as declared by the schema, holding its default.
    pub fn from_schema(item: &SchemaItem) -> Self {
        Self {
            title: item.title.clone(),
            kind: item.kind.clone(),
            description: item.description.clone(),
            default: item.default.clone(),
            value: item.default.clone(),
            value_orig: item.default.clone(),
            config_set: false,
        }
    }

    /// A field only known from configuration (no schema entry).
    pub fn from_config(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            value_orig: Some(value.to_string()),
            config_set: true,
            ..Self::default()
        }
    }

    /// The synthetic service version entry.
    pub fn version() -> Self {
        Self {
            title: Some("Version".to_string()),
            kind: Some("string".to_string()),
            description: Some(
                "Automatically incremented on each configuration change".to_string(),
            ),
            ..Self::default()
        }
    }

    /// The live value differs from the last saved/received one.
    pub fn is_dirty(&self) -> bool {
        self.value != self.value_orig
    }

    /// Apply a backend configuration value.
    fn apply_config(&mut self, value: &str) {
        self.value = Some(value.to_string());
        self.value_orig = Some(value.to_string());
        self.config_set = true;
    }
}

/// All fields of the selected service, keyed by field key.
///
/// Always contains the read-only `v` (service version) entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ServiceData {
    fields: BTreeMap<String, FieldDefinition>,
}

impl Default for ServiceData {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceData {
    /// Create service data holding only the synthetic version entry.
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(VERSION_KEY.to_string(), FieldDefinition::version());
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldDefinition)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Current service version, if the backend has reported one.
    pub fn version(&self) -> Option<&str> {
        self.fields.get(VERSION_KEY).and_then(|f| f.value.as_deref())
    }

    /// Whether a field may be edited from the dashboard.
    pub fn is_read_only(key: &str) -> bool {
        key == VERSION_KEY
    }

    /// Replace the live value of a field with a local, unsaved edit.
    ///
    /// Returns false for unknown or read-only fields.
    pub fn edit(&mut self, key: &str, value: String) -> bool {
        if Self::is_read_only(key) {
            return false;
        }
        match self.fields.get_mut(key) {
            Some(field) => {
                field.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// Drop a local edit, restoring the last saved/received value.
    pub fn revert(&mut self, key: &str) {
        if let Some(field) = self.fields.get_mut(key) {
            field.value = field.value_orig.clone();
        }
    }

    /// Record a save acknowledgment: `value_orig` catches up with the live
    /// `value`, including edits typed while the save was in flight.
    /// `config_set` is left untouched.
    pub fn mark_saved(&mut self, key: &str) -> bool {
        match self.fields.get_mut(key) {
            Some(field) => {
                field.value_orig = field.value.clone();
                true
            }
            None => false,
        }
    }

    /// Keys whose live value has not been saved yet.
    pub fn dirty_keys(&self) -> Vec<&str> {
        self.fields.iter().filter(|(_, f)| f.is_dirty()).map(|(k, _)| k.as_str()).collect()
    }
}

/// Merge a freshly fetched schema and configuration into `data`.
///
/// - Schema keys not yet known are added holding their default.
/// - Configuration values are applied once per field (`config_set`); after
///   that the field is only moved forward by [`ServiceData::mark_saved`].
/// - Configuration keys without a schema entry are created on first sight
///   with `config_set` already true, so they follow the same rule.
///
/// Fields are never removed.
pub fn merge_fields(
    data: &mut ServiceData,
    schema: &BTreeMap<String, SchemaItem>,
    config: &BTreeMap<String, ConfigItem>,
) {
    for (key, item) in schema {
        data.fields
            .entry(key.clone())
            .or_insert_with(|| FieldDefinition::from_schema(item));
    }

    for (key, item) in config {
        match data.fields.get_mut(key) {
            Some(field) => {
                if !field.config_set {
                    field.apply_config(&item.value);
                }
            }
            None => {
                data.fields
                    .insert(key.clone(), FieldDefinition::from_config(&item.value));
            }
        }
    }
}
