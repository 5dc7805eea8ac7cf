//! Binding target schema fields to indexed paths into source data.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::PathError;
use crate::path::{analyze_array_crossings, ArrayCrossing, IndexedPath};

/// A user's choice of where a target field reads from, including the index
/// picked at each array crossed on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub target: String,
    pub source_path: String,
    #[serde(default)]
    pub index_selections: BTreeMap<String, usize>,
}

impl FieldMapping {
    pub fn new(target: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source_path: source_path.into(),
            index_selections: BTreeMap::new(),
        }
    }

    pub fn select(mut self, prefix: impl Into<String>, index: usize) -> Self {
        self.index_selections.insert(prefix.into(), index);
        self
    }

    pub fn indexed_path(&self) -> IndexedPath {
        IndexedPath {
            base: self.source_path.clone(),
            selections: self.index_selections.clone(),
        }
    }

    /// Crossings of `source_path` against `sample`, for offering index choices.
    pub fn crossings(&self, sample: &JsonValue) -> Vec<ArrayCrossing> {
        analyze_array_crossings(&self.source_path, sample)
    }

    /// Selects index 0 at every crossing the sample reveals that has no
    /// selection yet.
    pub fn with_default_selections(mut self, sample: &JsonValue) -> Self {
        for crossing in self.crossings(sample) {
            self.index_selections.entry(crossing.full_path).or_insert(0);
        }
        self
    }
}

/// Builds one record with a key per mapping. Paths that resolve to nothing
/// produce `null`.
pub fn apply_field_mappings(
    mappings: &[FieldMapping],
    source: &JsonValue,
) -> Result<Map<String, JsonValue>, PathError> {
    let mut record = Map::with_capacity(mappings.len());
    for mapping in mappings {
        let value = mapping
            .indexed_path()
            .resolve(source)?
            .cloned()
            .unwrap_or(JsonValue::Null);
        record.insert(mapping.target.clone(), value);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn applies_selected_indices() {
        let source = json!({"orders": [{"id": 7, "lines": [{"sku": "a"}, {"sku": "b"}]}]});
        let mappings = vec![
            FieldMapping::new("order", "orders.id").select("orders", 0),
            FieldMapping::new("sku", "orders.lines.sku")
                .select("orders", 0)
                .select("orders.lines", 1),
            FieldMapping::new("missing", "orders.nope").select("orders", 0),
        ];

        let record = apply_field_mappings(&mappings, &source).unwrap();
        assert_eq!(JsonValue::Object(record), json!({"order": 7, "sku": "b", "missing": null}));
    }

    #[test]
    fn default_selections_follow_crossings() {
        let sample = json!({"a": {"b": [{"c": [1, 2]}]}});
        let mapping = FieldMapping::new("c", "a.b.c").with_default_selections(&sample);
        assert_eq!(mapping.indexed_path().render(), "a.b[0].c[0]");
    }

    #[test]
    fn index_on_scalar_is_an_error() {
        let source = json!({"a": {"b": 1}});
        let mapping = FieldMapping::new("x", "a.b").select("a.b", 0);
        assert_eq!(
            apply_field_mappings(&[mapping], &source).unwrap_err(),
            PathError::NotAnArray {
                prefix: "a.b".to_string()
            }
        );
    }
}
