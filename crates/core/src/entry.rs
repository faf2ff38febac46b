//! Upstream entry wrapper and canonical serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TrackedId;

/// Current SeaDex representation of a tracked item, kept as an opaque JSON
/// document so that unknown upstream fields still take part in change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(Value);

impl Entry {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Serialized form stored as a snapshot payload. Semantically identical
    /// documents produce byte-identical output.
    #[must_use]
    pub fn canonical_payload(&self) -> String {
        canonical_json(&self.0)
    }
}

/// Serialize `value` as compact JSON with object keys sorted at every depth.
///
/// Does not rely on the map ordering `serde_json` happens to be compiled with.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        },
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Display metadata captured alongside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetadata {
    pub title: String,
    pub cover_image_url: Option<String>,
}

impl DisplayMetadata {
    /// Fallback used whenever the metadata lookup fails.
    #[must_use]
    pub fn placeholder(id: TrackedId) -> Self {
        Self { title: id.placeholder_title(), cover_image_url: None }
    }
}
