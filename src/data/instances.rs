//! Instance health tags and table headers.
//!
//! Each refresh walks every key of every instance once. Status keys (`ts`,
//! `v`) produce tags, every other key becomes a table column, and counter
//! keys are also fed into the per-minute totals.

use std::collections::BTreeMap;

use serde::Serialize;

use super::totals::InstanceTotals;
use super::value::{display_label, version_matches, Instance, KeyKind};

/// Seconds after which an instance's last-seen timestamp is stale.
pub const EXPIRY_SECS: f64 = 60.0;

/// Severity of an instance tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Success,
    Warning,
    Danger,
}

impl TagKind {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            TagKind::Success => "OK",
            TagKind::Warning => "WARN",
            TagKind::Danger => "DANGER",
        }
    }
}

/// A status annotation attached to one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceTag {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: TagKind,
}

impl InstanceTag {
    pub fn new(text: impl Into<String>, kind: TagKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn ok() -> Self {
        Self::new("Ok", TagKind::Success)
    }

    pub fn expired() -> Self {
        Self::new("Expired timestamp", TagKind::Warning)
    }

    pub fn old_version(version: &str) -> Self {
        Self::new(format!("Old version ( v.{} )", version), TagKind::Danger)
    }
}

/// Raw key -> column label, accumulated over every instance seen since the
/// service was selected.
pub type InstanceHeaders = BTreeMap<String, String>;

/// Instance id -> tags from the latest refresh.
pub type InstanceTags = BTreeMap<String, Vec<InstanceTag>>;

/// Annotate a single instance.
///
/// Tags follow key order; `Ok` is added only when nothing else was.
pub fn annotate_instance(
    instance: &Instance,
    expected_version: Option<&str>,
    now: f64,
    headers: &mut InstanceHeaders,
    totals: &mut InstanceTotals,
) -> Vec<InstanceTag> {
    let mut tags = Vec::new();

    for (key, value) in instance {
        let kind = KeyKind::classify(key);
        match kind {
            KeyKind::Timestamp => {
                // Non-numeric timestamps cannot be judged and stay untagged
                if value.as_f64().is_some_and(|ts| ts < now - EXPIRY_SECS) {
                    tags.push(InstanceTag::expired());
                }
            }
            KeyKind::Version => {
                let reported = value.as_scalar().unwrap_or_default();
                let current = expected_version.is_some_and(|v| version_matches(value, v));
                if !current {
                    tags.push(InstanceTag::old_version(reported));
                }
            }
            _ => {
                headers
                    .entry(key.clone())
                    .or_insert_with(|| display_label(key).to_string());
            }
        }

        if kind == KeyKind::Counter {
            totals.record(key, value);
        }
    }

    if tags.is_empty() {
        tags.push(InstanceTag::ok());
    }
    tags
}

/// Annotate every instance, returning fresh tags keyed by instance id.
pub fn annotate_instances(
    instances: &BTreeMap<String, Instance>,
    expected_version: Option<&str>,
    now: f64,
    headers: &mut InstanceHeaders,
    totals: &mut InstanceTotals,
) -> InstanceTags {
    instances
        .iter()
        .map(|(id, instance)| {
            let tags = annotate_instance(instance, expected_version, now, headers, totals);
            (id.clone(), tags)
        })
        .collect()
}
