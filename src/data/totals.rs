//! Per-minute counter totals across instances.

use std::collections::BTreeMap;

use serde::Serialize;

use super::value::{display_label, parse_leading_int, FieldValue};

/// Suffix appended to aggregated counter labels.
pub const RATE_SUFFIX: &str = " 1/min";

/// Sum of the latest sample of every counter key across all instances.
///
/// Rebuilt from scratch on every refresh. Missing, empty or non-numeric
/// samples contribute zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstanceTotals {
    totals: BTreeMap<String, i64>,
}

impl InstanceTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label a counter key is aggregated under ("c_hits" -> "hits 1/min").
    pub fn label_for(key: &str) -> String {
        format!("{}{}", display_label(key), RATE_SUFFIX)
    }

    /// Add the latest sample of one counter series.
    ///
    /// The label is registered even when the sample contributes nothing, so
    /// every reported counter shows up in the totals. Sums saturate.
    pub fn record(&mut self, key: &str, value: &FieldValue) {
        let sample = value.last_sample().map(parse_leading_int).unwrap_or(0);
        let total = self.totals.entry(Self::label_for(key)).or_insert(0);
        *total = total.saturating_add(sample);
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.totals.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.totals.iter()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn clear(&mut self) {
        self.totals.clear();
    }
}
