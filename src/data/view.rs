//! View state of the selected service.
//!
//! A [`ViewState`] is what the UI renders. It is created empty when a
//! service is selected and updated in place by every refresh through
//! [`ViewState::apply`].

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use super::fields::{merge_fields, FieldDefinition, ServiceData};
use super::format::render;
use super::instances::{annotate_instances, InstanceHeaders, InstanceTag, InstanceTags, TagKind};
use super::totals::InstanceTotals;
use super::value::{classify_record, Instance};
use crate::source::ServiceDescriptor;

/// Derived view of one service.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// The selected service, `None` while idle.
    pub service: Option<String>,
    /// Merged fields; `None` until the first refresh completes.
    pub service_data: Option<ServiceData>,
    /// Classified instance telemetry from the latest refresh.
    pub instances: BTreeMap<String, Instance>,
    /// Column set accumulated since the service was selected.
    pub headers: InstanceHeaders,
    pub tags: InstanceTags,
    pub totals: InstanceTotals,
    /// Opaque service info from the latest refresh.
    pub info: serde_json::Value,
    /// A refresh is outstanding.
    pub loading: bool,
    pub last_updated: Option<Instant>,
}

impl ViewState {
    /// Empty state for a newly selected service.
    pub fn for_service(service: &str) -> Self {
        Self {
            service: Some(service.to_string()),
            ..Self::default()
        }
    }

    /// Apply one fetched service descriptor.
    ///
    /// Fields are merged (unsaved edits survive), headers accumulate, while
    /// instances, tags and totals are rebuilt from this descriptor alone.
    pub fn apply(&mut self, descriptor: ServiceDescriptor, now: f64) {
        let data = self.service_data.get_or_insert_with(ServiceData::new);
        merge_fields(data, &descriptor.schema, &descriptor.config);
        let version = data.version().map(str::to_string);

        self.info = descriptor.info;
        self.instances = descriptor
            .clients
            .iter()
            .map(|(id, record)| (id.clone(), classify_record(record)))
            .collect();

        self.totals.clear();
        self.tags = annotate_instances(
            &self.instances,
            version.as_deref(),
            now,
            &mut self.headers,
            &mut self.totals,
        );
        self.last_updated = Some(Instant::now());
    }

    /// Rendered cells for one instance, in header order.
    pub fn instance_cells(&self, id: &str, now: f64) -> Vec<String> {
        let instance = self.instances.get(id);
        self.headers
            .keys()
            .map(|key| render(key, instance.and_then(|i| i.get(key)), now))
            .collect()
    }

    /// Tags of one instance (empty if unknown).
    pub fn tags_for(&self, id: &str) -> &[InstanceTag] {
        self.tags.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Worst tag of an instance, used for row colouring.
    pub fn worst_tag(&self, id: &str) -> TagKind {
        self.tags_for(id)
            .iter()
            .map(|t| t.kind)
            .max()
            .unwrap_or(TagKind::Success)
    }

    /// Count instances by their worst tag: (success, warning, danger).
    pub fn tag_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for id in self.instances.keys() {
            match self.worst_tag(id) {
                TagKind::Success => counts.0 += 1,
                TagKind::Warning => counts.1 += 1,
                TagKind::Danger => counts.2 += 1,
            }
        }
        counts
    }

    /// Service info as displayable key/value pairs.
    pub fn info_pairs(&self) -> Vec<(String, String)> {
        match &self.info {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| {
                    let shown = match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), shown)
                })
                .collect(),
            serde_json::Value::Null => Vec::new(),
            other => vec![("info".to_string(), other.to_string())],
        }
    }

    /// Build the JSON export of this view.
    pub fn export(&self, now: f64) -> ViewExport<'_> {
        let instances = self
            .instances
            .keys()
            .map(|id| {
                let values = self
                    .headers
                    .values()
                    .cloned()
                    .zip(self.instance_cells(id, now))
                    .collect();
                let export = InstanceExport {
                    tags: self.tags_for(id),
                    values,
                };
                (id.as_str(), export)
            })
            .collect();

        ViewExport {
            service: self.service.as_deref(),
            fields: self.service_data.as_ref().map(|d| d.iter().collect()).unwrap_or_default(),
            instances,
            headers: &self.headers,
            totals: &self.totals,
            info: &self.info,
        }
    }
}

/// Serializable snapshot of a [`ViewState`].
#[derive(Debug, Serialize)]
pub struct ViewExport<'a> {
    pub service: Option<&'a str>,
    pub fields: BTreeMap<&'a String, &'a FieldDefinition>,
    pub instances: BTreeMap<&'a str, InstanceExport<'a>>,
    pub headers: &'a InstanceHeaders,
    pub totals: &'a InstanceTotals,
    pub info: &'a serde_json::Value,
}

/// One exported instance: tags plus rendered values by column label.
#[derive(Debug, Serialize)]
pub struct InstanceExport<'a> {
    pub tags: &'a [InstanceTag],
    pub values: BTreeMap<String, String>,
}
