//! Field readers for loosely-typed API payloads
//!
//! Each reader takes the candidate keys in priority order and skips `null`
//! values, so `{"sentimentScore": null, "sentiment_score": 0.4}` reads 0.4.
//! A value of the wrong type reads as absent.

use serde_json::{Map, Value};

pub(crate) fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Numbers, or strings that parse as numbers (`"191.20"`)
pub(crate) fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match field(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

pub(crate) fn string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match field(obj, keys)? {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn boolean(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    field(obj, keys)?.as_bool()
}

pub(crate) fn count(obj: &Map<String, Value>, keys: &[&str]) -> u32 {
    field(obj, keys)
        .and_then(Value::as_u64)
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}
