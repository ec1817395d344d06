//! Key classification and typed instance values.
//!
//! Instances report loosely typed JSON. The key prefix decides how a value
//! is interpreted, so values are classified once on arrival into a
//! [`FieldValue`] and everything downstream dispatches on the variant.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::source::InstanceRecord;

/// Prefix of counter time series keys.
pub const COUNTER_PREFIX: &str = "c_";
/// Prefix of informational scalar keys.
pub const INFO_PREFIX: &str = "k_";
/// Last-seen timestamp key (epoch seconds).
pub const TIMESTAMP_KEY: &str = "ts";
/// Reported client version key.
pub const VERSION_KEY: &str = "v";
/// Process start timestamp key (epoch seconds).
pub const STARTED_KEY: &str = "started";

/// What an instance key means, decided by its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// `c_*`: ordered sequence of per-minute samples.
    Counter,
    /// `k_*`: informational scalar.
    Info,
    /// `ts`: last-seen timestamp.
    Timestamp,
    /// `v`: reported client version.
    Version,
    /// `started`: process start timestamp.
    Started,
    /// Anything else, shown as-is.
    Other,
}

impl KeyKind {
    pub fn classify(key: &str) -> Self {
        if key.starts_with(COUNTER_PREFIX) {
            KeyKind::Counter
        } else if key.starts_with(INFO_PREFIX) {
            KeyKind::Info
        } else {
            match key {
                TIMESTAMP_KEY => KeyKind::Timestamp,
                VERSION_KEY => KeyKind::Version,
                STARTED_KEY => KeyKind::Started,
                _ => KeyKind::Other,
            }
        }
    }

    /// Status-only keys never become table columns.
    pub fn is_status(self) -> bool {
        matches!(self, KeyKind::Timestamp | KeyKind::Version)
    }
}

/// Display label for an instance key: strips a leading `c_` or `k_`.
pub fn display_label(key: &str) -> &str {
    key.strip_prefix(COUNTER_PREFIX)
        .or_else(|| key.strip_prefix(INFO_PREFIX))
        .unwrap_or(key)
}

/// A single instance-reported value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text, booleans, null and nested JSON, stringified.
    Scalar(String),
    /// A JSON number, kept as its JSON text.
    Number(String),
    CounterSeries(Vec<String>),
}

impl FieldValue {
    /// Classify a raw JSON value by the key it was reported under.
    ///
    /// Counter keys become a series; a counter reported as anything other
    /// than an array is an empty series. Every other key becomes a number or
    /// a scalar.
    pub fn from_json(key: &str, value: &Value) -> Self {
        match (KeyKind::classify(key), value) {
            (KeyKind::Counter, Value::Array(samples)) => {
                FieldValue::CounterSeries(samples.iter().map(stringify).collect())
            }
            (KeyKind::Counter, _) => FieldValue::CounterSeries(Vec::new()),
            (_, Value::Number(n)) => FieldValue::Number(n.to_string()),
            (_, other) => FieldValue::Scalar(stringify(other)),
        }
    }

    /// Last sample of a counter series, if any.
    pub fn last_sample(&self) -> Option<&str> {
        match self {
            FieldValue::CounterSeries(samples) => samples.last().map(String::as_str),
            FieldValue::Scalar(_) | FieldValue::Number(_) => None,
        }
    }

    /// Text of a scalar or number.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) | FieldValue::Number(s) => Some(s),
            FieldValue::CounterSeries(_) => None,
        }
    }

    /// Numeric reading of a scalar; `None` for series and non-numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(|s| s.trim().parse::<f64>().ok())
    }
}

/// Typed view of one instance: raw key -> classified value.
pub type Instance = BTreeMap<String, FieldValue>;

/// Classify every value of a raw instance record.
pub fn classify_record(record: &InstanceRecord) -> Instance {
    record
        .iter()
        .map(|(key, value)| (key.clone(), FieldValue::from_json(key, value)))
        .collect()
}

/// Stringify a JSON value for display.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse the leading integer of a sample ("12", "12.7", "12abc" -> 12).
///
/// Anything without a leading integer parses as 0. Digit runs beyond the
/// range of `i64` saturate.
pub fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .fold(0i64, |acc, digit| {
            // Accumulate on the sign's side so i64::MIN stays reachable
            let acc = acc.saturating_mul(10);
            if negative {
                acc.saturating_sub(digit)
            } else {
                acc.saturating_add(digit)
            }
        })
}

/// Whether an instance's reported version matches the service version.
///
/// The service version is always text. Reported text must match it
/// exactly ("7.0" is not "7"); a reported number matches any text that
/// reads as the same number (7 matches "7", "7.0" and " 7 ").
pub fn version_matches(reported: &FieldValue, current: &str) -> bool {
    match reported {
        FieldValue::Scalar(s) => s == current,
        FieldValue::Number(n) => {
            if n == current {
                return true;
            }
            let current = current.trim();
            // Blank text reads as zero
            let expected = if current.is_empty() {
                Some(0.0)
            } else {
                current.parse::<f64>().ok()
            };
            matches!((n.parse::<f64>().ok(), expected), (Some(x), Some(y)) if x == y)
        }
        FieldValue::CounterSeries(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(KeyKind::classify("c_hits"), KeyKind::Counter);
        assert_eq!(KeyKind::classify("k_region"), KeyKind::Info);
        assert_eq!(KeyKind::classify("ts"), KeyKind::Timestamp);
        assert_eq!(KeyKind::classify("v"), KeyKind::Version);
        assert_eq!(KeyKind::classify("started"), KeyKind::Started);
        assert_eq!(KeyKind::classify("hostname"), KeyKind::Other);
        // Only exact matches are reserved
        assert_eq!(KeyKind::classify("version"), KeyKind::Other);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("c_hits"), "hits");
        assert_eq!(display_label("k_region"), "region");
        assert_eq!(display_label("started"), "started");
        assert_eq!(display_label("c_"), "");
    }

    #[test]
    fn test_counter_from_json() {
        let v = FieldValue::from_json("c_hits", &json!(["1", 4, 2.5]));
        assert_eq!(
            v,
            FieldValue::CounterSeries(vec!["1".into(), "4".into(), "2.5".into()])
        );
        assert_eq!(v.last_sample(), Some("2.5"));

        // Not an array: empty series
        let v = FieldValue::from_json("c_hits", &json!(12));
        assert_eq!(v, FieldValue::CounterSeries(vec![]));
        assert_eq!(v.last_sample(), None);
    }

    #[test]
    fn test_scalar_from_json() {
        assert_eq!(
            FieldValue::from_json("k_region", &json!("eu")),
            FieldValue::Scalar("eu".into())
        );
        assert_eq!(
            FieldValue::from_json("ts", &json!(1500000000.5)).as_f64(),
            Some(1500000000.5)
        );
        assert_eq!(FieldValue::from_json("v", &json!(null)).as_scalar(), Some(""));
        assert_eq!(FieldValue::from_json("ok", &json!(true)).as_scalar(), Some("true"));
        assert_eq!(FieldValue::from_json("v", &json!("abc")).as_f64(), None);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("4"), 4);
        assert_eq!(parse_leading_int(" 12.9"), 12);
        assert_eq!(parse_leading_int("7abc"), 7);
        assert_eq!(parse_leading_int("-3"), -3);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("-"), 0);
    }

    #[test]
    fn test_parse_leading_int_saturates() {
        assert_eq!(parse_leading_int("9223372036854775807"), i64::MAX);
        assert_eq!(parse_leading_int("123456789012345678901234567890"), i64::MAX);
        assert_eq!(parse_leading_int("-9223372036854775808"), i64::MIN);
        assert_eq!(parse_leading_int("-99999999999999999999x"), i64::MIN);
    }

    #[test]
    fn test_version_matches_text() {
        let text = |s: &str| FieldValue::Scalar(s.to_string());
        assert!(version_matches(&text("7"), "7"));
        assert!(!version_matches(&text("7.0"), "7"));
        assert!(!version_matches(&text(" 7"), "7"));
        assert!(!version_matches(&text("abc"), "abd"));
    }

    #[test]
    fn test_version_matches_number() {
        let number = |v: Value| FieldValue::from_json("v", &v);
        assert_eq!(number(json!(7)), FieldValue::Number("7".into()));
        assert!(version_matches(&number(json!(7)), "7"));
        assert!(version_matches(&number(json!(7)), "7.0"));
        assert!(version_matches(&number(json!(7.0)), " 7 "));
        assert!(version_matches(&number(json!(0)), ""));
        assert!(!version_matches(&number(json!(7)), "8"));
        assert!(!version_matches(&number(json!(7)), "seven"));
    }
}
