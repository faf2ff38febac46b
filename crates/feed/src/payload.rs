//! Rendering view of a stored SeaDex entry.
//!
//! Parsing is lenient: every field is optional, unknown fields are ignored,
//! and a field of the wrong type (including an explicit `null`) falls back to
//! its default instead of failing the whole payload. Only text that is not a
//! JSON object is rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub updated: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub comparison: Option<Comparison>,
    /// `None` when the key is absent, `Some(Value::Null)` for an explicit null.
    #[serde(default, deserialize_with = "present")]
    pub incomplete: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub expand: Option<Expand>,
}

/// SeaDex stores comparison links either as one comma-delimited string or as
/// a list; both resolve to the same URL list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Comparison {
    List(Vec<String>),
    Delimited(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expand {
    #[serde(default, deserialize_with = "lenient_list")]
    pub trs: Vec<Release>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default, deserialize_with = "lenient")]
    pub release_group: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub files: Vec<ReleaseFile>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_best: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub dual_audio: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub tracker: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseFile {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Bytes. Integer or float; anything else counts as unknown.
    #[serde(default, deserialize_with = "lenient")]
    pub length: Option<f64>,
}

/// Any JSON value; one that does not fit `T` becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A list whose unreadable elements are skipped; a non-list is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().filter_map(|item| serde_json::from_value(item).ok()).collect())
}

/// Keeps an explicit `null` distinguishable from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Truthiness of a loosely typed JSON flag: null, false, zero and empty
/// values are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

impl EntryPayload {
    /// # Errors
    /// Returns the serde error when `payload` is not a JSON object.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_str(payload)?;
        serde_json::from_value(Value::Object(object))
    }

    /// Negation of `incomplete`. A missing key counts as not complete; an
    /// explicit `null` is falsy and so counts as complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.incomplete.as_ref().is_some_and(|flag| !truthy(flag))
    }

    #[must_use]
    pub fn comparison_urls(&self) -> Vec<String> {
        self.comparison.as_ref().map(Comparison::urls).unwrap_or_default()
    }

    #[must_use]
    pub fn releases(&self) -> &[Release] {
        self.expand.as_ref().map_or(&[], |e| e.trs.as_slice())
    }
}

impl Comparison {
    /// Trimmed, non-empty URLs in their original order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Delimited(s) => s.split(',').collect(),
        };
        raw.into_iter().map(str::trim).filter(|u| !u.is_empty()).map(str::to_owned).collect()
    }
}

impl Release {
    /// Sum of the known file lengths in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> f64 {
        self.files.iter().filter_map(|f| f.length).filter(|len| len.is_finite()).sum()
    }

    #[must_use]
    pub fn total_size_gib(&self) -> f64 {
        self.total_bytes() / BYTES_PER_GIB
    }
}
