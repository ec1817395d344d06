//! Display rendering of instance values.

use super::value::{FieldValue, KeyKind};

const MINUTES_PER_DAY: f64 = 1440.0;

/// Render an instance value for display.
///
/// - Counters show their latest sample, or `N/A` without samples.
/// - `started` shows the process age ("Just now", "12 min", "3 days").
/// - Everything else is shown unchanged; a missing value renders empty.
pub fn render(key: &str, value: Option<&FieldValue>, now: f64) -> String {
    match KeyKind::classify(key) {
        KeyKind::Counter => value
            .and_then(FieldValue::last_sample)
            .map(str::to_string)
            .unwrap_or_else(|| "N/A".to_string()),
        KeyKind::Started => match value {
            Some(v) => match v.as_f64() {
                Some(started) => format_age(now - started),
                None => plain(v),
            },
            None => String::new(),
        },
        _ => value.map(plain).unwrap_or_default(),
    }
}

/// Format an elapsed time in seconds as a coarse age.
pub fn format_age(elapsed_secs: f64) -> String {
    let minutes = elapsed_secs / 60.0;
    if minutes < 1.0 {
        "Just now".to_string()
    } else if minutes > MINUTES_PER_DAY {
        format!("{} days", (minutes / MINUTES_PER_DAY).round())
    } else {
        format!("{} min", minutes.round())
    }
}

fn plain(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(s) | FieldValue::Number(s) => s.clone(),
        FieldValue::CounterSeries(samples) => samples.join(", "),
    }
}
