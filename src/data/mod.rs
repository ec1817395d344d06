//! Data models and processing for service configuration and telemetry.
//!
//! This module turns the raw [`ServiceDescriptor`](crate::source::ServiceDescriptor)
//! returned by a backend into the structures the UI renders.
//!
//! ## Submodules
//!
//! - [`value`]: Key classification and typed instance values
//! - [`fields`]: Schema/config merging with edit tracking ([`ServiceData`])
//! - [`instances`]: Health tags and table headers per instance
//! - [`totals`]: Per-minute counter totals across instances
//! - [`format`]: Display rendering of instance values
//! - [`view`]: The per-service [`ViewState`] tying it all together
//!
//! ## Data Flow
//!
//! ```text
//! ServiceDescriptor (raw JSON)
//!        │
//!        ▼
//! ViewState::apply()
//!        │
//!        ├──▶ merge_fields()        (schema + config -> ServiceData)
//!        ├──▶ classify_record()     (clients -> Instance)
//!        └──▶ annotate_instances()  (tags, headers, totals)
//! ```

pub mod fields;
pub mod format;
pub mod instances;
pub mod totals;
pub mod value;
pub mod view;

use std::time::{SystemTime, UNIX_EPOCH};

pub use fields::{merge_fields, FieldDefinition, ServiceData};
pub use format::{format_age, render};
pub use instances::{
    annotate_instance, annotate_instances, InstanceHeaders, InstanceTag, InstanceTags, TagKind,
};
pub use totals::InstanceTotals;
pub use value::{classify_record, FieldValue, Instance, KeyKind};
pub use view::{ViewExport, ViewState};

/// Current wall-clock time in epoch seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
