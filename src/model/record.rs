use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CardError, CardResult};

/// Flat field-name to value mapping for one person.
///
/// Values are kept as JSON so numeric and boolean fields survive; [`DataRecord::text`] applies
/// the text coercion used by every binding.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord(BTreeMap<String, serde_json::Value>);

impl DataRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json_str(json: &str) -> CardResult<Self> {
        serde_json::from_str(json).map_err(|e| CardError::serde(format!("invalid record: {e}")))
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`DataRecord::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value of a field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Field value coerced to text.
    ///
    /// Strings are returned as-is, numbers in their shortest decimal form and booleans as
    /// `True`/`False`. `null`, arrays and objects count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(true) => Some("True".to_string()),
            serde_json::Value::Bool(false) => Some("False".to_string()),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for DataRecord
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
